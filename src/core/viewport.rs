use crate::core::constants::{DEFAULT_ZOOM_DELTA, MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{GeoBounds, GeoPosition, Point, TileCoord};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: GeoPosition,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

/// A tile that intersects the viewport, with its placement in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    /// Tile to fetch (x wrapped around the antimeridian)
    pub coord: TileCoord,
    pub min: Point,
    pub max: Point,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: GeoPosition, zoom: f64, size: Point) -> Self {
        let mut viewport = Self {
            center: GeoPosition::default(),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        };
        viewport.set_center(center);
        viewport
    }

    /// Sets the center, clamping latitude and wrapping longitude
    pub fn set_center(&mut self, center: GeoPosition) {
        self.center = GeoPosition::new(
            GeoPosition::clamp_lat(center.lat),
            GeoPosition::wrap_lng(center.lng),
        );
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits, kept within `MIN_ZOOM..=MAX_ZOOM`
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.max_zoom = max_zoom.clamp(self.min_zoom, MAX_ZOOM);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Steps the zoom in by one level. Returns whether the zoom changed.
    pub fn zoom_in(&mut self) -> bool {
        self.step_zoom(DEFAULT_ZOOM_DELTA)
    }

    /// Steps the zoom out by one level. Returns whether the zoom changed.
    pub fn zoom_out(&mut self) -> bool {
        self.step_zoom(-DEFAULT_ZOOM_DELTA)
    }

    fn step_zoom(&mut self, delta: f64) -> bool {
        let before = self.zoom;
        self.set_zoom(self.zoom + delta);
        (self.zoom - before).abs() > f64::EPSILON
    }

    /// True once the surface has been laid out with a non-empty size
    pub fn has_layout(&self) -> bool {
        self.size.x > 0.0 && self.size.y > 0.0
    }

    /// Width of the whole world in pixels at `zoom`
    pub fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * 2_f64.powf(zoom)
    }

    /// Projects a position to world pixel coordinates (Web Mercator, EPSG:3857)
    pub fn project(position: &GeoPosition, zoom: f64) -> Point {
        let world = Self::world_size(zoom);
        let lat_rad = GeoPosition::clamp_lat(position.lat).to_radians();

        let x = (position.lng + 180.0) / 360.0 * world;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world;

        Point::new(x, y)
    }

    /// Inverse of [`Viewport::project`]
    pub fn unproject(pixel: &Point, zoom: f64) -> GeoPosition {
        let world = Self::world_size(zoom);
        let lng = pixel.x / world * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * pixel.y / world)).sinh().atan().to_degrees();

        GeoPosition::new(lat, lng)
    }

    /// Converts a position to screen pixels relative to the viewport's top-left
    pub fn position_to_screen(&self, position: &GeoPosition) -> Point {
        let center = Self::project(&self.center, self.zoom);
        let target = Self::project(position, self.zoom);
        target
            .subtract(&center)
            .add(&Point::new(self.size.x / 2.0, self.size.y / 2.0))
    }

    /// Converts screen pixels relative to the viewport's top-left to a position
    pub fn screen_to_position(&self, screen: &Point) -> GeoPosition {
        let center = Self::project(&self.center, self.zoom);
        let offset = screen.subtract(&Point::new(self.size.x / 2.0, self.size.y / 2.0));
        Self::unproject(&center.add(&offset), self.zoom)
    }

    /// Moves the map content by a drag delta in screen pixels
    pub fn pan_by(&mut self, delta: Point) {
        let center = Self::project(&self.center, self.zoom);
        let moved = center.subtract(&delta);
        self.set_center(Self::unproject(&moved, self.zoom));
    }

    /// Changes zoom while keeping the position under `anchor` fixed on screen
    pub fn zoom_around(&mut self, anchor: Point, zoom: f64) {
        let pinned = self.screen_to_position(&anchor);
        self.set_zoom(zoom);
        let drift = self.position_to_screen(&pinned).subtract(&anchor);
        self.pan_by(drift.multiply(-1.0));
    }

    /// Geographic bounds currently on screen
    pub fn bounds(&self) -> GeoBounds {
        self.padded_bounds(0.0)
    }

    /// Visible area grown by `padding` screen pixels on every side
    pub fn padded_bounds(&self, padding: f64) -> GeoBounds {
        let north_west = self.screen_to_position(&Point::new(-padding, -padding));
        let south_east =
            self.screen_to_position(&Point::new(self.size.x + padding, self.size.y + padding));
        GeoBounds::new(
            GeoPosition::new(south_east.lat, north_west.lng),
            GeoPosition::new(north_west.lat, south_east.lng),
        )
    }

    /// Tiles needed to cover the viewport, fetched at the nearest integer zoom
    pub fn visible_tiles(&self, max_tile_zoom: u8) -> Vec<VisibleTile> {
        if !self.has_layout() {
            return Vec::new();
        }

        let tile_zoom = self.zoom.round().clamp(0.0, (max_tile_zoom as f64).min(MAX_ZOOM));
        let z = tile_zoom as u8;
        let scale = 2_f64.powf(self.zoom - tile_zoom);
        let tiles_per_axis = 1i64 << z;

        let center = Self::project(&self.center, tile_zoom);
        let half = Point::new(self.size.x / 2.0 / scale, self.size.y / 2.0 / scale);
        let top_left = center.subtract(&half);
        let bottom_right = center.add(&half);

        let x_start = (top_left.x / TILE_SIZE).floor() as i64;
        let x_end = (bottom_right.x / TILE_SIZE).ceil() as i64 - 1;
        let y_start = ((top_left.y / TILE_SIZE).floor() as i64).max(0);
        let y_end = ((bottom_right.y / TILE_SIZE).ceil() as i64 - 1).min(tiles_per_axis - 1);

        let mut tiles = Vec::new();
        for y in y_start..=y_end {
            for x in x_start..=x_end {
                let min = Point::new(
                    (x as f64 * TILE_SIZE - top_left.x) * scale,
                    (y as f64 * TILE_SIZE - top_left.y) * scale,
                );
                let extent = TILE_SIZE * scale;
                tiles.push(VisibleTile {
                    coord: TileCoord::new(x.rem_euclid(tiles_per_axis) as u32, y as u32, z),
                    min,
                    max: Point::new(min.x + extent, min.y + extent),
                });
            }
        }
        tiles
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(GeoPosition::default(), 2.0, Point::default())
    }
}
