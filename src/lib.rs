//! # mapdemo
//!
//! A small tabbed map application built on OpenStreetMap tiles.
//!
//! Five screens share one parameterised [`screen::ScreenController`]: a plain
//! map, a custom marker with a live-location dot, static point markers, a
//! plotted closed route, and a weather overlay that looks up the current
//! temperature for the first location fix and labels it with a
//! reverse-geocoded place name.
//!
//! The headless core (geometry, overlays, tiles, permissions, location,
//! weather, screen lifecycle) has no UI dependency. The `egui` feature adds
//! the widget, dialogs and tab bar used by the `mapdemo-app` binary.

pub mod core;
pub mod layers;
pub mod location;
pub mod permission;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod screen;
pub mod shell;
pub mod tiles;
pub mod weather;

#[cfg(feature = "egui")]
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::AppConfig,
    geo::{GeoBounds, GeoPosition, Point, TileCoord},
    map::MapSurface,
    viewport::Viewport,
};

pub use layers::{
    base::Overlay, location::MyLocationOverlay, manager::OverlayList, marker::MapMarker,
    route::Route,
};

pub use screen::{
    config::{Destination, ScreenConfig},
    controller::{ScreenController, ScreenState},
    services::ScreenServices,
};

pub use shell::NavigationShell;

pub use weather::{model::WeatherReading, WeatherError};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Overlay error: {0}")]
    Overlay(String),

    #[error("Invalid screen transition from {from:?} to {to:?}")]
    Lifecycle {
        from: screen::controller::ScreenState,
        to: screen::controller::ScreenState,
    },

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// Error type alias for convenience
pub type Error = MapError;
