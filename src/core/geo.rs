use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator latitude limit
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// A WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPosition {
    /// Creates a new position
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }
}

impl Default for GeoPosition {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl std::fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

impl From<GeoPosition> for geo_types::Coord<f64> {
    fn from(position: GeoPosition) -> Self {
        geo_types::coord! { x: position.lng, y: position.lat }
    }
}

/// Represents a point in screen or world pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A south-west / north-east bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPosition,
    pub north_east: GeoPosition,
}

impl GeoBounds {
    pub fn new(south_west: GeoPosition, north_east: GeoPosition) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Bounds of a single position
    pub fn around(position: GeoPosition) -> Self {
        Self::new(position, position)
    }

    /// Smallest bounds that contain every position, `None` for an empty slice
    pub fn from_positions(positions: &[GeoPosition]) -> Option<Self> {
        let (first, rest) = positions.split_first()?;
        let mut bounds = Self::around(*first);
        for position in rest {
            bounds.extend(position);
        }
        Some(bounds)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &GeoPosition) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Checks if the bounds intersect with another bounds
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        !(other.north_east.lat < self.south_west.lat
            || other.south_west.lat > self.north_east.lat
            || other.north_east.lng < self.south_west.lng
            || other.south_west.lng > self.north_east.lng)
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &GeoPosition) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> GeoPosition {
        GeoPosition::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Represents a tile coordinate in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Tile containing `position` at `zoom`
    pub fn from_position(position: &GeoPosition, zoom: u8) -> Self {
        let lat_rad = GeoPosition::clamp_lat(position.lat).to_radians();
        let n = 2_f64.powi(zoom as i32);
        let max_index = n - 1.0;

        let x = ((position.lng + 180.0) / 360.0 * n).floor().clamp(0.0, max_index) as u32;
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
            .floor()
            .clamp(0.0, max_index) as u32;

        Self::new(x, y, zoom)
    }

    /// Converts tile coordinate to its north-west corner
    pub fn to_position(&self) -> GeoPosition {
        let n = 2_f64.powi(self.z as i32);
        let lng = self.x as f64 / n * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan();

        GeoPosition::new(lat_rad.to_degrees(), lng)
    }

    /// Number of tiles along one axis at this zoom level
    pub fn tiles_per_axis(&self) -> u32 {
        1u32 << self.z
    }

    /// Checks if the tile is valid for its zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = self.tiles_per_axis();
        self.x < max_coord && self.y < max_coord
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let coord = GeoPosition::new(10.668328, 122.958444);
        assert_eq!(coord.lat, 10.668328);
        assert_eq!(coord.lng, 122.958444);
        assert!(coord.is_valid());
        assert!(!GeoPosition::new(91.0, 0.0).is_valid());
        assert!(!GeoPosition::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_position_display_matches_marker_titles() {
        let coord = GeoPosition::new(10.674155, 122.961091);
        assert_eq!(coord.to_string(), "10.674155, 122.961091");
    }

    #[test]
    fn test_tile_coord_conversion() {
        let position = GeoPosition::new(10.53724, 122.83202);
        let tile = TileCoord::from_position(&position, 10);
        assert!(tile.is_valid());

        let corner = tile.to_position();
        assert!((corner.lat - position.lat).abs() < 1.0);
        assert!((corner.lng - position.lng).abs() < 1.0);
        assert!(tile.bounds_contains(&position));
    }

    #[test]
    fn test_tile_coord_clamps_at_edges() {
        let tile = TileCoord::from_position(&GeoPosition::new(-89.9, 180.0), 2);
        assert_eq!(tile, TileCoord::new(3, 3, 2));
    }

    #[test]
    fn test_bounds_from_positions() {
        let bounds = GeoBounds::from_positions(&[
            GeoPosition::new(40.0, -75.0),
            GeoPosition::new(41.0, -73.0),
            GeoPosition::new(40.5, -74.0),
        ])
        .unwrap();

        assert!(bounds.contains(&GeoPosition::new(40.5, -74.0)));
        assert!(!bounds.contains(&GeoPosition::new(42.0, -74.0)));
        assert_eq!(bounds.center(), GeoPosition::new(40.5, -74.0));
        assert!(GeoBounds::from_positions(&[]).is_none());
    }

    impl TileCoord {
        fn bounds_contains(&self, position: &GeoPosition) -> bool {
            let nw = self.to_position();
            let se = TileCoord::new(self.x + 1, self.y + 1, self.z).to_position();
            GeoBounds::new(GeoPosition::new(se.lat, nw.lng), GeoPosition::new(nw.lat, se.lng))
                .contains(position)
        }
    }
}
