//! Screen lifecycle
//!
//! A [`ScreenController`] owns one map surface and every background task
//! started for it. Tasks never touch the surface: they post
//! [`ScreenEvent`]s that [`ScreenController::pump`] applies on the UI
//! thread, and a destroyed controller applies nothing.

use super::config::{FirstFixAction, ScreenConfig, WEATHER_MARKER_ID};
use super::services::ScreenServices;
use crate::{
    core::{
        geo::{GeoPosition, Point},
        map::MapSurface,
    },
    layers::{
        location::MyLocationOverlay,
        marker::MapMarker,
        style::Anchor,
    },
    location::Fix,
    permission::{PermissionKind, PermissionOutcome},
    rendering::context::RenderContext,
    runtime::{Lifetime, RepaintHook},
    weather::{flow::fetch_reading, WeatherReading},
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Built, not configured
    Inactive,
    /// Surface configured, waiting for a non-empty layout
    Configuring,
    Active,
    Paused,
    Destroyed,
}

/// Results posted by background tasks
#[derive(Debug, Clone)]
pub enum ScreenEvent {
    Permission(PermissionOutcome),
    Fix { fix: Fix, first: bool },
    Weather { at: GeoPosition, reading: WeatherReading },
    Notice(String),
}

/// Sending half handed to background tasks
#[derive(Clone)]
struct EventSink {
    sender: Sender<ScreenEvent>,
    repaint: Option<RepaintHook>,
}

impl EventSink {
    fn post(&self, event: ScreenEvent) {
        // The receiver lives as long as the controller
        if self.sender.send(event).is_ok() {
            if let Some(repaint) = &self.repaint {
                repaint();
            }
        }
    }
}

pub struct ScreenController {
    config: ScreenConfig,
    services: ScreenServices,
    state: ScreenState,
    surface: MapSurface,
    lifetime: Lifetime,
    sink: EventSink,
    events: Receiver<ScreenEvent>,
    permission: Option<PermissionOutcome>,
    location_started: bool,
    first_fix_seen: bool,
    weather: Option<WeatherReading>,
    notices: Vec<String>,
}

impl ScreenController {
    pub fn new(config: ScreenConfig, services: ScreenServices) -> Self {
        let (sender, events) = unbounded();
        let sink = EventSink {
            sender,
            repaint: services.repaint.clone(),
        };
        Self {
            surface: MapSurface::new(config.center, config.zoom),
            lifetime: Lifetime::new(services.runtime.clone()),
            config,
            services,
            state: ScreenState::Inactive,
            sink,
            events,
            permission: None,
            location_started: false,
            first_fix_seen: false,
            weather: None,
            notices: Vec::new(),
        }
    }

    fn transition(&mut self, expected: &[ScreenState], to: ScreenState) -> Result<()> {
        if !expected.contains(&self.state) {
            return Err(MapError::Lifecycle {
                from: self.state,
                to,
            });
        }
        log::debug!(
            "{} screen: {:?} -> {:?}",
            self.config.title(),
            self.state,
            to
        );
        self.state = to;
        Ok(())
    }

    /// Configures tiles, start view, static overlays and the (disabled)
    /// location overlay
    pub fn activate(&mut self) -> Result<()> {
        self.transition(&[ScreenState::Inactive], ScreenState::Configuring)?;

        if let Some(tiles) = &self.services.tiles {
            let layer = tiles.layer(self.services.runtime.clone(), self.services.repaint.clone());
            self.surface.set_tile_layer(layer);
        }
        self.surface.set_view(self.config.center, self.config.zoom);
        (self.config.overlays)(self.surface.overlays_mut())?;

        let mut location = MyLocationOverlay::new().with_accuracy_circle(self.config.draw_accuracy);
        if let Some(icon) = self.config.person_icon {
            location = location.with_person_icon(icon);
        }
        self.surface.overlays_mut().add(Box::new(location))?;
        Ok(())
    }

    /// Reports the surface size. The first non-empty size makes the screen
    /// active and asks for location permission; later calls only resize.
    pub fn on_layout(&mut self, size: Point) -> Result<()> {
        match self.state {
            ScreenState::Configuring => {
                self.surface.set_size(size);
                if self.surface.viewport.has_layout() {
                    self.transition(&[ScreenState::Configuring], ScreenState::Active)?;
                    self.request_location_permission();
                }
                Ok(())
            }
            ScreenState::Active | ScreenState::Paused => {
                self.surface.set_size(size);
                Ok(())
            }
            from => Err(MapError::Lifecycle {
                from,
                to: ScreenState::Active,
            }),
        }
    }

    pub fn pause(&mut self) -> Result<()> {
        self.transition(&[ScreenState::Active], ScreenState::Paused)?;
        self.surface.pause();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.transition(&[ScreenState::Paused], ScreenState::Active)?;
        self.surface.resume();
        Ok(())
    }

    /// Cancels every task, drops the location subscription and releases the
    /// surface. Safe to call from any state; returns `false` if the screen
    /// was already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.state == ScreenState::Destroyed {
            return false;
        }
        self.lifetime.end();
        self.surface.detach();
        // Results that raced the teardown are dropped unseen
        while self.events.try_recv().is_ok() {}
        log::debug!("{} screen destroyed", self.config.title());
        self.state = ScreenState::Destroyed;
        true
    }

    fn request_location_permission(&mut self) {
        let permissions = self.services.permissions.clone();
        let sink = self.sink.clone();
        self.lifetime.spawn(async move {
            let outcome = permissions.request(&PermissionKind::LOCATION).await;
            sink.post(ScreenEvent::Permission(outcome));
        });
    }

    fn start_location_updates(&mut self) {
        if self.location_started {
            return;
        }
        self.location_started = true;

        let mut subscription = self.services.location.subscribe(self.lifetime.runtime());
        let sink = self.sink.clone();
        self.lifetime.spawn(async move {
            let Some(fix) = subscription.first_fix().await else {
                log::debug!("location provider stopped before a first fix");
                return;
            };
            sink.post(ScreenEvent::Fix { fix, first: true });
            while let Some(fix) = subscription.next_fix().await {
                sink.post(ScreenEvent::Fix { fix, first: false });
            }
        });
    }

    fn start_weather_lookup(&mut self, at: GeoPosition) {
        let weather = self.services.weather.clone();
        let places = self.services.places.clone();
        let sink = self.sink.clone();
        self.lifetime.spawn(async move {
            match fetch_reading(weather.as_ref(), places.as_ref(), at).await {
                Ok(reading) => sink.post(ScreenEvent::Weather { at, reading }),
                Err(err) => {
                    log::warn!("weather lookup at {at} failed: {err}");
                    sink.post(ScreenEvent::Notice(err.failure_notice().to_string()));
                }
            }
        });
    }

    /// Applies results posted by background tasks. Returns how many were
    /// applied; always zero once destroyed.
    pub fn pump(&mut self) -> usize {
        if self.state == ScreenState::Destroyed {
            return 0;
        }
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::Permission(outcome) => {
                self.permission = Some(outcome);
                if !outcome.allows_location() {
                    log::info!("location permission denied; no location overlay");
                    return;
                }
                let follow = self.config.follow_location;
                if let Some(location) = self.surface.location_overlay_mut() {
                    location.enable_my_location();
                    if follow {
                        location.enable_follow_location();
                    }
                }
                self.start_location_updates();
            }
            ScreenEvent::Fix { fix, first } => {
                self.surface.apply_fix(fix);
                if first && !self.first_fix_seen {
                    self.first_fix_seen = true;
                    match self.config.first_fix {
                        FirstFixAction::None => {}
                        FirstFixAction::Recenter => self.surface.center_on(fix.position),
                        FirstFixAction::QueryWeather => self.start_weather_lookup(fix.position),
                    }
                }
            }
            ScreenEvent::Weather { at, reading } => {
                let label = reading.label();
                log::info!("weather at {at}: {label}");
                if let Some(marker) = self
                    .surface
                    .overlays_mut()
                    .get_as_mut::<MapMarker>(WEATHER_MARKER_ID)
                {
                    marker.set_position(at);
                    marker.set_title(label);
                    marker.set_anchor(Anchor::CENTER_BOTTOM);
                }
                self.surface.center_on(at);
                self.weather = Some(reading);
            }
            ScreenEvent::Notice(text) => self.notices.push(text),
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        !self.is_destroyed() && self.surface.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        !self.is_destroyed() && self.surface.zoom_out()
    }

    /// Scroll or pinch zoom around a screen point
    pub fn zoom_around(&mut self, anchor: Point, delta: f64) {
        if !self.is_destroyed() {
            self.surface.zoom_around(anchor, delta);
        }
    }

    pub fn pan(&mut self, delta: Point) {
        if !self.is_destroyed() {
            self.surface.pan_by(delta);
        }
    }

    /// Title of the overlay under a tap, if any
    pub fn tap(&self, at: Point) -> Option<String> {
        self.surface.overlay_title_at(&at)
    }

    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        self.surface.render(context)
    }

    /// Notices posted since the last call
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == ScreenState::Destroyed
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn permission(&self) -> Option<PermissionOutcome> {
        self.permission
    }

    pub fn is_location_enabled(&self) -> bool {
        self.surface
            .location_overlay()
            .map(|location| location.is_enabled())
            .unwrap_or(false)
    }

    pub fn weather_reading(&self) -> Option<&WeatherReading> {
        self.weather.as_ref()
    }

    /// Background tasks still running for this screen
    pub fn active_tasks(&self) -> usize {
        self.lifetime.active_tasks()
    }
}

impl Drop for ScreenController {
    fn drop(&mut self) {
        self.destroy();
    }
}
