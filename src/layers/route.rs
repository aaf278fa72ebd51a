use crate::{
    core::{
        constants::{DEFAULT_ROUTE_WIDTH, ROUTE_HIT_TOLERANCE},
        geo::{GeoBounds, GeoPosition, Point},
        viewport::Viewport,
    },
    layers::base::{Overlay, OverlayKind, OverlayProperties},
    layers::style::Color,
    rendering::context::{DrawCommand, RenderContext},
    MapError, Result,
};
use geo::HaversineLength;
use geo_types::LineString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            width: DEFAULT_ROUTE_WIDTH,
        }
    }
}

/// An ordered polyline through a fixed set of positions.
///
/// A route whose last point repeats its first draws as a closed outline.
#[derive(Debug, Clone)]
pub struct Route {
    properties: OverlayProperties,
    points: Vec<GeoPosition>,
    style: RouteStyle,
}

impl Route {
    /// Builds a route; at least two valid positions are required
    pub fn new(id: impl Into<String>, points: Vec<GeoPosition>) -> Result<Self> {
        if points.len() < 2 {
            return Err(MapError::Overlay(format!(
                "a route needs at least two points, got {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().find(|point| !point.is_valid()) {
            return Err(MapError::InvalidCoordinates(bad.to_string()));
        }

        Ok(Self {
            properties: OverlayProperties::new(id, OverlayKind::Route),
            points,
            style: RouteStyle::default(),
        })
    }

    pub fn with_style(mut self, style: RouteStyle) -> Self {
        self.style = style;
        self
    }

    pub fn points(&self) -> &[GeoPosition] {
        &self.points
    }

    pub fn style(&self) -> RouteStyle {
        self.style
    }

    /// True when the last point returns to the first
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    /// Great-circle length of the route in metres
    pub fn length_meters(&self) -> f64 {
        self.line_string().haversine_length()
    }

    /// Tap title, e.g. `Route: 4.45 km`
    pub fn summary(&self) -> String {
        format!("Route: {:.2} km", self.length_meters() / 1000.0)
    }

    fn line_string(&self) -> LineString<f64> {
        self.points.iter().copied().map(geo_types::Coord::from).collect()
    }
}

impl Overlay for Route {
    crate::impl_overlay_properties!(properties);

    fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let points = self
            .points
            .iter()
            .map(|position| viewport.position_to_screen(position))
            .collect();

        context.push(DrawCommand::Polyline {
            points,
            color: self.style.color,
            width: self.style.width,
        });
        Ok(())
    }

    fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_positions(&self.points)
    }

    fn hit_test(&self, screen: &Point, viewport: &Viewport) -> Option<String> {
        let points: Vec<Point> = self
            .points
            .iter()
            .map(|position| viewport.position_to_screen(position))
            .collect();
        let tolerance = ROUTE_HIT_TOLERANCE.max(self.style.width as f64 / 2.0);
        points
            .windows(2)
            .any(|segment| distance_to_segment(screen, &segment[0], &segment[1]) <= tolerance)
            .then(|| self.summary())
    }
}

fn distance_to_segment(point: &Point, start: &Point, end: &Point) -> f64 {
    let along = end.subtract(start);
    let length_squared = along.x * along.x + along.y * along.y;
    if length_squared == 0.0 {
        return point.distance_to(start);
    }
    let offset = point.subtract(start);
    let t = ((offset.x * along.x + offset.y * along.y) / length_squared).clamp(0.0, 1.0);
    point.distance_to(&start.add(&along.multiply(t)))
}
