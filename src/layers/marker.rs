use crate::{
    core::{
        constants::{CROSSHAIR_ICON_SIZE, MARKER_HIT_RADIUS, MARKER_ICON_SIZE},
        geo::{GeoBounds, GeoPosition, Point},
        viewport::Viewport,
    },
    layers::base::{Overlay, OverlayKind, OverlayProperties},
    layers::style::{Anchor, MarkerIcon},
    rendering::context::{DrawCommand, RenderContext},
    Result,
};

/// A titled icon pinned to a position.
///
/// A marker without a position is allowed (the weather marker starts that
/// way) and draws nothing until one is set.
#[derive(Debug, Clone)]
pub struct MapMarker {
    properties: OverlayProperties,
    position: Option<GeoPosition>,
    title: String,
    icon: MarkerIcon,
    anchor: Anchor,
}

impl MapMarker {
    pub fn new(id: impl Into<String>, position: GeoPosition) -> Self {
        Self {
            position: Some(position),
            ..Self::unset(id)
        }
    }

    /// A marker with no position yet
    pub fn unset(id: impl Into<String>) -> Self {
        Self {
            properties: OverlayProperties::new(id, OverlayKind::Marker),
            position: None,
            title: String::new(),
            icon: MarkerIcon::Default,
            anchor: Anchor::CENTER_BOTTOM,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_icon(mut self, icon: MarkerIcon) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn position(&self) -> Option<GeoPosition> {
        self.position
    }

    pub fn set_position(&mut self, position: GeoPosition) {
        self.position = Some(position);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn icon(&self) -> MarkerIcon {
        self.icon
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    /// Icon size in pixels
    pub fn icon_size(&self) -> (f32, f32) {
        match self.icon {
            MarkerIcon::Crosshair => CROSSHAIR_ICON_SIZE,
            MarkerIcon::Default | MarkerIcon::Pin => MARKER_ICON_SIZE,
        }
    }

    /// Center of the drawn icon on screen, accounting for the anchor
    fn icon_center(&self, screen: &Point) -> Point {
        let (width, height) = self.icon_size();
        Point::new(
            screen.x + (0.5 - self.anchor.x as f64) * width as f64,
            screen.y + (0.5 - self.anchor.y as f64) * height as f64,
        )
    }
}

impl Overlay for MapMarker {
    crate::impl_overlay_properties!(properties);

    fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let Some(position) = self.position else {
            return Ok(());
        };

        context.push(DrawCommand::Marker {
            id: self.properties.id.clone(),
            position: viewport.position_to_screen(&position),
            icon: self.icon,
            anchor: self.anchor,
            title: self.title.clone(),
        });
        Ok(())
    }

    fn bounds(&self) -> Option<GeoBounds> {
        self.position.map(GeoBounds::around)
    }

    fn hit_test(&self, screen: &Point, viewport: &Viewport) -> Option<String> {
        let position = self.position?;
        let center = self.icon_center(&viewport.position_to_screen(&position));
        (center.distance_to(screen) <= MARKER_HIT_RADIUS && !self.title.is_empty())
            .then(|| self.title.clone())
    }
}
