use crate::{
    core::{constants::OVERLAY_CULL_MARGIN, geo::Point, viewport::Viewport},
    layers::base::Overlay,
    prelude::HashMap,
    rendering::context::RenderContext,
    MapError, Result,
};

/// The overlay stack of one map surface, kept in z-order.
///
/// Overlays with equal z-index draw in insertion order.
pub struct OverlayList {
    /// All overlays indexed by ID
    overlays: HashMap<String, Box<dyn Overlay>>,
    /// Ordered list of overlay IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
}

impl OverlayList {
    pub fn new() -> Self {
        Self {
            overlays: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds an overlay; ids must be unique within the list
    pub fn add(&mut self, overlay: Box<dyn Overlay>) -> Result<()> {
        let id = overlay.id().to_string();
        if self.overlays.contains_key(&id) {
            return Err(MapError::Overlay(format!("duplicate overlay id '{id}'")));
        }
        let z_index = overlay.z_index();

        self.overlays.insert(id.clone(), overlay);

        // Insert after every overlay with a z-index not above ours
        let insert_pos = self
            .render_order
            .iter()
            .position(|other| {
                self.overlays
                    .get(other)
                    .map(|o| o.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, id);
        Ok(())
    }

    /// Removes an overlay
    pub fn remove(&mut self, id: &str) -> Option<Box<dyn Overlay>> {
        self.render_order.retain(|other| other != id);
        self.overlays.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Overlay> {
        self.overlays.get(id).map(|o| o.as_ref())
    }

    /// Typed access to an overlay
    pub fn get_as<T: 'static>(&self, id: &str) -> Option<&T> {
        self.overlays.get(id)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to an overlay
    pub fn get_as_mut<T: 'static>(&mut self, id: &str) -> Option<&mut T> {
        self.overlays.get_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// Overlays in render order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Overlay> {
        self.render_order
            .iter()
            .filter_map(|id| self.overlays.get(id).map(|o| o.as_ref()))
    }

    /// Renders visible overlays in order
    pub fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let viewport_bounds = viewport.padded_bounds(OVERLAY_CULL_MARGIN);

        for overlay in self.iter() {
            let on_screen = overlay
                .bounds()
                .map(|bounds| bounds.intersects(&viewport_bounds))
                .unwrap_or(false);
            if overlay.is_visible() && on_screen {
                overlay.render(context, viewport)?;
            }
        }
        Ok(())
    }

    /// Title of the topmost visible overlay under `screen`
    pub fn hit_test(&self, screen: &Point, viewport: &Viewport) -> Option<String> {
        let ordered: Vec<&dyn Overlay> = self.iter().collect();
        ordered
            .into_iter()
            .rev()
            .filter(|overlay| overlay.is_visible())
            .find_map(|overlay| overlay.hit_test(screen, viewport))
    }

    pub fn clear(&mut self) {
        self.overlays.clear();
        self.render_order.clear();
    }

    /// Gets the number of overlays
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

impl Default for OverlayList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::GeoPosition;
    use crate::layers::{marker::MapMarker, route::Route};
    use crate::rendering::context::DrawCommand;

    fn viewport() -> Viewport {
        Viewport::new(GeoPosition::new(10.0, 122.0), 15.0, Point::new(800.0, 800.0))
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut list = OverlayList::new();
        list.add(Box::new(MapMarker::new("a", GeoPosition::new(10.0, 122.0)))).unwrap();
        assert!(list.add(Box::new(MapMarker::new("a", GeoPosition::new(10.0, 122.0)))).is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_routes_render_below_markers() {
        let mut list = OverlayList::new();
        list.add(Box::new(MapMarker::new("m", GeoPosition::new(10.0, 122.0)))).unwrap();
        list.add(Box::new(
            Route::new(
                "r",
                vec![GeoPosition::new(10.0, 122.0), GeoPosition::new(10.001, 122.001)],
            )
            .unwrap(),
        ))
        .unwrap();

        let mut context = RenderContext::new(800.0, 800.0);
        list.render(&mut context, &viewport()).unwrap();

        assert!(matches!(context.commands()[0], DrawCommand::Polyline { .. }));
        assert!(matches!(context.commands()[1], DrawCommand::Marker { .. }));
    }

    #[test]
    fn test_offscreen_and_hidden_overlays_skipped() {
        let mut list = OverlayList::new();
        list.add(Box::new(MapMarker::new("far", GeoPosition::new(-40.0, 10.0)))).unwrap();
        let mut hidden = MapMarker::new("hidden", GeoPosition::new(10.0, 122.0));
        hidden.set_visible(false);
        list.add(Box::new(hidden)).unwrap();

        let mut context = RenderContext::new(800.0, 800.0);
        list.render(&mut context, &viewport()).unwrap();
        assert!(context.commands().is_empty());
    }

    #[test]
    fn test_icons_reaching_into_view_are_kept() {
        let viewport = viewport();
        let mut list = OverlayList::new();
        let just_below = viewport.screen_to_position(&Point::new(400.0, 805.0));
        let far_below = viewport.screen_to_position(&Point::new(400.0, 1000.0));
        list.add(Box::new(MapMarker::new("edge", just_below))).unwrap();
        list.add(Box::new(MapMarker::new("gone", far_below))).unwrap();

        let mut context = RenderContext::new(800.0, 800.0);
        list.render(&mut context, &viewport).unwrap();

        let ids: Vec<_> = context
            .markers()
            .filter_map(|command| match command {
                DrawCommand::Marker { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["edge"]);
    }

    #[test]
    fn test_typed_access_and_hit_test() {
        let mut list = OverlayList::new();
        list.add(Box::new(MapMarker::unset("weather"))).unwrap();

        let marker = list.get_as_mut::<MapMarker>("weather").unwrap();
        marker.set_position(GeoPosition::new(10.0, 122.0));
        marker.set_title("Here");
        assert!(list.get_as::<Route>("weather").is_none());

        let viewport = viewport();
        assert_eq!(list.hit_test(&Point::new(400.0, 380.0), &viewport), Some("Here".to_string()));

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.hit_test(&Point::new(400.0, 380.0), &viewport), None);
    }
}
