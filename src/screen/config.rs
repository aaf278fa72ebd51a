//! The five screens, as data
//!
//! Every screen is the same controller configured differently: a start
//! view, a set of static overlays, how the location dot looks and what
//! happens on the first fix.

use crate::{
    core::geo::GeoPosition,
    layers::{
        manager::OverlayList,
        marker::MapMarker,
        route::{Route, RouteStyle},
        style::{Anchor, MarkerIcon},
    },
    Result,
};
use std::fmt;

/// Id of the marker the weather screen labels with its reading
pub const WEATHER_MARKER_ID: &str = "weather";
/// Id of the custom marker at the custom-marker screen's start point
pub const CUSTOM_MARKER_ID: &str = "custom-marker";
/// Id of the plotted route
pub const ROUTE_ID: &str = "route";

const TIMES_SQUARE: GeoPosition = GeoPosition::new(40.748817, -73.985428);
const SILAY_START: GeoPosition = GeoPosition::new(10.53724, 122.83202);
const BACOLOD_START: GeoPosition = GeoPosition::new(10.668328, 122.958444);

/// Static markers of the points screen
pub const POINTS: [GeoPosition; 6] = [
    GeoPosition::new(10.668328, 122.958444),
    GeoPosition::new(10.674155, 122.961091),
    GeoPosition::new(10.675039, 122.961242),
    GeoPosition::new(10.675847, 122.961027),
    GeoPosition::new(10.683639, 122.957072),
    GeoPosition::new(10.683985, 122.956504),
];

/// Closed loop drawn by the plot screen; the last point repeats the first
pub const PLOT_LOOP: [GeoPosition; 9] = [
    GeoPosition::new(10.679661456360577, 122.96088446926933),
    GeoPosition::new(10.680528171358237, 122.96263178591225),
    GeoPosition::new(10.678683980411808, 122.96473349189357),
    GeoPosition::new(10.677468595948623, 122.96316727417242),
    GeoPosition::new(10.677434749405863, 122.96284656472892),
    GeoPosition::new(10.677507066175139, 122.96217089109979),
    GeoPosition::new(10.67777500620726, 122.96120092033692),
    GeoPosition::new(10.678230880119218, 122.96054658923967),
    GeoPosition::new(10.679661456360577, 122.96088446926933),
];

/// Navigation targets, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Map,
    Marker,
    Points,
    Plot,
    Weather,
}

impl Destination {
    pub const ALL: [Destination; 5] = [
        Destination::Map,
        Destination::Marker,
        Destination::Points,
        Destination::Plot,
        Destination::Weather,
    ];

    /// Tab label
    pub fn label(&self) -> &'static str {
        match self {
            Destination::Map => "Map",
            Destination::Marker => "Marker",
            Destination::Points => "Points",
            Destination::Plot => "Plot",
            Destination::Weather => "Weather",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a screen does once, on its first location fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstFixAction {
    #[default]
    None,
    /// Center the map on the fix
    Recenter,
    /// Look up the weather at the fix and label the weather marker
    QueryWeather,
}

/// Adds a screen's static overlays
pub type OverlayBuilder = fn(&mut OverlayList) -> Result<()>;

#[derive(Debug, Clone, Copy)]
pub struct ScreenConfig {
    pub destination: Destination,
    pub center: GeoPosition,
    pub zoom: f64,
    pub overlays: OverlayBuilder,
    /// Icon replacing the plain location dot
    pub person_icon: Option<MarkerIcon>,
    pub draw_accuracy: bool,
    pub follow_location: bool,
    pub first_fix: FirstFixAction,
}

impl ScreenConfig {
    pub fn for_destination(destination: Destination) -> Self {
        match destination {
            Destination::Map => Self::map(),
            Destination::Marker => Self::custom_marker(),
            Destination::Points => Self::points(),
            Destination::Plot => Self::plot(),
            Destination::Weather => Self::weather(),
        }
    }

    pub fn map() -> Self {
        Self {
            destination: Destination::Map,
            center: TIMES_SQUARE,
            zoom: 18.0,
            overlays: no_overlays,
            person_icon: None,
            draw_accuracy: false,
            follow_location: true,
            first_fix: FirstFixAction::None,
        }
    }

    pub fn custom_marker() -> Self {
        Self {
            destination: Destination::Marker,
            center: SILAY_START,
            zoom: 18.0,
            overlays: custom_marker_overlays,
            person_icon: Some(MarkerIcon::Crosshair),
            draw_accuracy: true,
            first_fix: FirstFixAction::Recenter,
            ..Self::map()
        }
    }

    pub fn points() -> Self {
        Self {
            destination: Destination::Points,
            center: BACOLOD_START,
            zoom: 16.0,
            overlays: point_overlays,
            ..Self::map()
        }
    }

    pub fn plot() -> Self {
        Self {
            destination: Destination::Plot,
            overlays: plot_overlays,
            ..Self::points()
        }
    }

    pub fn weather() -> Self {
        Self {
            destination: Destination::Weather,
            center: SILAY_START,
            zoom: 18.0,
            overlays: weather_overlays,
            first_fix: FirstFixAction::QueryWeather,
            ..Self::map()
        }
    }

    pub fn title(&self) -> &'static str {
        self.destination.label()
    }
}

fn no_overlays(_overlays: &mut OverlayList) -> Result<()> {
    Ok(())
}

fn point_title(position: &GeoPosition) -> String {
    format!("Point: {}, {}", position.lat, position.lng)
}

fn custom_marker_overlays(overlays: &mut OverlayList) -> Result<()> {
    overlays.add(Box::new(
        MapMarker::new(CUSTOM_MARKER_ID, SILAY_START)
            .with_title("New York City")
            .with_icon(MarkerIcon::Crosshair)
            .with_anchor(Anchor::CENTER_BOTTOM),
    ))
}

fn point_overlays(overlays: &mut OverlayList) -> Result<()> {
    for (index, position) in POINTS.iter().enumerate() {
        overlays.add(Box::new(
            MapMarker::new(format!("point-{index}"), *position).with_title(point_title(position)),
        ))?;
    }
    Ok(())
}

fn plot_overlays(overlays: &mut OverlayList) -> Result<()> {
    for (index, position) in PLOT_LOOP.iter().enumerate() {
        overlays.add(Box::new(
            MapMarker::new(format!("plot-{index}"), *position)
                .with_title(point_title(position))
                .with_icon(MarkerIcon::Pin),
        ))?;
    }
    let route = Route::new(ROUTE_ID, PLOT_LOOP.to_vec())?.with_style(RouteStyle::default());
    overlays.add(Box::new(route))
}

fn weather_overlays(overlays: &mut OverlayList) -> Result<()> {
    overlays.add(Box::new(
        MapMarker::unset(WEATHER_MARKER_ID).with_anchor(Anchor::CENTER_BOTTOM),
    ))
}
