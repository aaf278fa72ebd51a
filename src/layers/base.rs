use crate::core::geo::{GeoBounds, Point};
use crate::core::viewport::Viewport;
use crate::rendering::context::RenderContext;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Marker,
    Route,
    MyLocation,
}

impl OverlayKind {
    /// Default stacking: routes under markers, the location dot on top
    pub fn default_z_index(&self) -> i32 {
        match self {
            OverlayKind::Route => -10,
            OverlayKind::Marker => 0,
            OverlayKind::MyLocation => 10,
        }
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayKind::Marker => write!(f, "marker"),
            OverlayKind::Route => write!(f, "route"),
            OverlayKind::MyLocation => write!(f, "my-location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayProperties {
    pub id: String,
    pub kind: OverlayKind,
    pub z_index: i32,
    pub visible: bool,
}

impl OverlayProperties {
    pub fn new(id: impl Into<String>, kind: OverlayKind) -> Self {
        Self {
            id: id.into(),
            kind,
            z_index: kind.default_z_index(),
            visible: true,
        }
    }
}

/// A drawable layer composited on top of the map tiles
pub trait Overlay: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> OverlayKind;

    fn z_index(&self) -> i32;

    fn set_z_index(&mut self, z_index: i32);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Queue draw commands for this overlay
    fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()>;

    /// Geographic extent, `None` when the overlay has nothing to draw
    fn bounds(&self) -> Option<GeoBounds>;

    /// Title to show when the overlay is tapped at `screen`
    fn hit_test(&self, _screen: &Point, _viewport: &Viewport) -> Option<String> {
        None
    }

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
