//! Engine-wide magic numbers, kept in one place.

/// Default square tile size in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Lowest zoom the surface allows.
pub const MIN_ZOOM: f64 = 0.0;

/// Highest zoom served by the standard OpenStreetMap layer.
pub const MAX_ZOOM: f64 = 19.0;

/// Programmatic +/- zoom step for the zoom buttons.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Scroll distance (points) that changes the zoom by one level.
pub const SCROLL_PIXELS_PER_ZOOM_LEVEL: f64 = 120.0;

/// Marker icon size in pixels.
pub const MARKER_ICON_SIZE: (f32, f32) = (25.0, 41.0);

/// Crosshair icon size; the custom-marker screen scales its icon to this.
pub const CROSSHAIR_ICON_SIZE: (f32, f32) = (48.0, 48.0);

/// Screen margin kept when culling overlays, so icons drawn away from their
/// anchor do not vanish at the edges. Covers the largest icon.
pub const OVERLAY_CULL_MARGIN: f64 = 48.0;

/// Radius of the "my location" dot.
pub const LOCATION_DOT_RADIUS: f32 = 8.0;

/// Screen distance (pixels) within which a tap selects a marker.
pub const MARKER_HIT_RADIUS: f64 = 24.0;

/// Screen distance (pixels) from a route's line within which a tap selects it.
pub const ROUTE_HIT_TOLERANCE: f64 = 12.0;

/// Stroke width of plotted routes.
pub const DEFAULT_ROUTE_WIDTH: f32 = 10.0;

/// How long a transient notice stays on screen.
pub const NOTICE_DURATION_MS: u64 = 2000;

/// Attribution required by the OpenStreetMap tile usage policy.
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";
