//! Prelude module for common mapdemo types and traits
//!
//! Re-exports the most commonly used types for `use mapdemo::prelude::*;`

pub use crate::core::{
    config::{AppConfig, LocationConfig, PermissionPolicy, TileConfig},
    geo::{GeoBounds, GeoPosition, Point, TileCoord},
    map::MapSurface,
    viewport::Viewport,
};

pub use crate::layers::{
    base::{Overlay, OverlayKind},
    location::MyLocationOverlay,
    manager::OverlayList,
    marker::MapMarker,
    route::{Route, RouteStyle},
    style::{Anchor, Color, MarkerIcon},
};

pub use crate::location::{Fix, LocationProvider, LocationSubscription};

pub use crate::permission::{
    PermissionGate, PermissionKind, PermissionOutcome, PermissionState, PolicyPermissionGate,
    PromptPermissionGate,
};

pub use crate::rendering::context::{DrawCommand, RenderContext};

pub use crate::runtime::{Lifetime, RepaintHook, TaskHandle};

pub use crate::screen::{
    config::{Destination, FirstFixAction, ScreenConfig},
    controller::{ScreenController, ScreenEvent, ScreenState},
    services::{ScreenServices, TileServices},
};

pub use crate::shell::NavigationShell;

pub use crate::tiles::{TileCache, TileLayer, TileLoader, TileSource, UrlTemplateSource};

pub use crate::weather::{
    CurrentWeather, LookupStage, PlaceLookup, WeatherError, WeatherLookup, WeatherReading,
};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
