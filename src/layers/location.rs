use crate::{
    core::{
        geo::{GeoBounds, GeoPosition},
        viewport::Viewport,
    },
    layers::base::{Overlay, OverlayKind, OverlayProperties},
    layers::style::MarkerIcon,
    location::Fix,
    rendering::context::{DrawCommand, RenderContext},
    Result,
};

/// Id under which every screen registers its location overlay
pub const MY_LOCATION_OVERLAY_ID: &str = "my-location";

/// The "you are here" dot.
///
/// Draws nothing until location is enabled and a fix has arrived. With
/// follow enabled the owning surface recenters on every fix.
#[derive(Debug, Clone)]
pub struct MyLocationOverlay {
    properties: OverlayProperties,
    enabled: bool,
    follow: bool,
    last_fix: Option<Fix>,
    draw_accuracy: bool,
    person_icon: Option<MarkerIcon>,
}

impl MyLocationOverlay {
    pub fn new() -> Self {
        Self {
            properties: OverlayProperties::new(MY_LOCATION_OVERLAY_ID, OverlayKind::MyLocation),
            enabled: false,
            follow: false,
            last_fix: None,
            draw_accuracy: false,
            person_icon: None,
        }
    }

    /// Replace the plain dot with an icon
    pub fn with_person_icon(mut self, icon: MarkerIcon) -> Self {
        self.person_icon = Some(icon);
        self
    }

    pub fn with_accuracy_circle(mut self, draw: bool) -> Self {
        self.draw_accuracy = draw;
        self
    }

    pub fn enable_my_location(&mut self) {
        self.enabled = true;
    }

    pub fn disable_my_location(&mut self) {
        self.enabled = false;
        self.follow = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable_follow_location(&mut self) {
        self.follow = true;
    }

    pub fn disable_follow_location(&mut self) {
        self.follow = false;
    }

    pub fn is_following(&self) -> bool {
        self.enabled && self.follow
    }

    /// Records a fix; ignored while location is disabled
    pub fn update_fix(&mut self, fix: Fix) -> bool {
        if !self.enabled {
            return false;
        }
        self.last_fix = Some(fix);
        true
    }

    pub fn my_location(&self) -> Option<GeoPosition> {
        self.last_fix.map(|fix| fix.position)
    }
}

impl Default for MyLocationOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay for MyLocationOverlay {
    crate::impl_overlay_properties!(properties);

    fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let Some(fix) = self.last_fix.filter(|_| self.enabled) else {
            return Ok(());
        };

        let center = viewport.position_to_screen(&fix.position);
        let accuracy_radius = match (self.draw_accuracy, fix.accuracy_m) {
            (true, Some(meters)) => Some(meters_to_pixels(meters, fix.position.lat, viewport.zoom)),
            _ => None,
        };

        context.push(DrawCommand::LocationDot {
            center,
            accuracy_radius,
            icon: self.person_icon,
        });
        Ok(())
    }

    fn bounds(&self) -> Option<GeoBounds> {
        self.my_location().map(GeoBounds::around)
    }
}

/// Ground distance to screen pixels at a latitude (Web Mercator scale)
fn meters_to_pixels(meters: f64, lat: f64, zoom: f64) -> f32 {
    let meters_per_pixel =
        40_075_016.686 * lat.to_radians().cos() / Viewport::world_size(zoom);
    (meters / meters_per_pixel) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    fn fix() -> Fix {
        Fix {
            position: GeoPosition::new(10.5, 122.8),
            accuracy_m: Some(20.0),
        }
    }

    #[test]
    fn test_fixes_ignored_until_enabled() {
        let mut overlay = MyLocationOverlay::new();
        assert!(!overlay.update_fix(fix()));
        assert!(overlay.my_location().is_none());

        overlay.enable_my_location();
        assert!(overlay.update_fix(fix()));
        assert_eq!(overlay.my_location(), Some(GeoPosition::new(10.5, 122.8)));
    }

    #[test]
    fn test_follow_requires_enabled() {
        let mut overlay = MyLocationOverlay::new();
        overlay.enable_follow_location();
        assert!(!overlay.is_following());
        overlay.enable_my_location();
        assert!(overlay.is_following());
        overlay.disable_my_location();
        assert!(!overlay.is_following());
    }

    #[test]
    fn test_accuracy_circle_only_when_requested() {
        let viewport = Viewport::new(GeoPosition::new(10.5, 122.8), 18.0, Point::new(400.0, 400.0));

        let mut plain = MyLocationOverlay::new();
        plain.enable_my_location();
        plain.update_fix(fix());
        let mut context = RenderContext::new(400.0, 400.0);
        plain.render(&mut context, &viewport).unwrap();
        assert!(matches!(
            context.commands()[0],
            DrawCommand::LocationDot { accuracy_radius: None, icon: None, .. }
        ));

        let mut custom = MyLocationOverlay::new()
            .with_person_icon(MarkerIcon::Crosshair)
            .with_accuracy_circle(true);
        custom.enable_my_location();
        custom.update_fix(fix());
        let mut context = RenderContext::new(400.0, 400.0);
        custom.render(&mut context, &viewport).unwrap();
        match context.commands()[0] {
            DrawCommand::LocationDot { accuracy_radius: Some(radius), icon, .. } => {
                // ~0.59 m per pixel at zoom 18 near 10.5°N
                assert!(radius > 30.0 && radius < 40.0, "radius was {radius}");
                assert_eq!(icon, Some(MarkerIcon::Crosshair));
            }
            ref other => panic!("unexpected command {other:?}"),
        }
    }
}
