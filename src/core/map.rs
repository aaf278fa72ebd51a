use crate::{
    core::{
        geo::{GeoPosition, Point},
        viewport::Viewport,
    },
    layers::{
        location::{MyLocationOverlay, MY_LOCATION_OVERLAY_ID},
        manager::OverlayList,
    },
    location::Fix,
    rendering::context::RenderContext,
    tiles::TileLayer,
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Running,
    /// Tile fetching stopped; the surface still draws what it has
    Paused,
    /// Resources released; nothing draws any more
    Detached,
}

/// The map widget's model: viewport, base tiles and overlays.
///
/// Input arrives in screen pixels relative to the surface's top-left corner.
pub struct MapSurface {
    pub viewport: Viewport,
    overlays: OverlayList,
    tiles: Option<TileLayer>,
    state: SurfaceState,
    release_count: u32,
}

impl MapSurface {
    /// A surface not laid out yet (zero size)
    pub fn new(center: GeoPosition, zoom: f64) -> Self {
        Self {
            viewport: Viewport::new(center, zoom, Point::default()),
            overlays: OverlayList::new(),
            tiles: None,
            state: SurfaceState::Running,
            release_count: 0,
        }
    }

    pub fn set_tile_layer(&mut self, layer: TileLayer) {
        let max_zoom = layer.loader().source().max_zoom() as f64;
        self.viewport.set_zoom_limits(self.viewport.min_zoom, max_zoom);
        self.tiles = Some(layer);
    }

    pub fn tile_layer(&self) -> Option<&TileLayer> {
        self.tiles.as_ref()
    }

    pub fn attribution(&self) -> Option<&str> {
        self.tiles
            .as_ref()
            .map(|tiles| tiles.attribution())
            .filter(|text| !text.is_empty())
    }

    pub fn set_view(&mut self, center: GeoPosition, zoom: f64) {
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
    }

    pub fn center_on(&mut self, center: GeoPosition) {
        self.viewport.set_center(center);
    }

    pub fn set_size(&mut self, size: Point) {
        self.viewport.set_size(size);
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out()
    }

    /// Zooms by `delta` levels keeping `anchor` fixed on screen
    pub fn zoom_around(&mut self, anchor: Point, delta: f64) {
        let zoom = self.viewport.zoom + delta;
        self.viewport.zoom_around(anchor, zoom);
    }

    /// Drags the map. A user pan stops following the location dot.
    pub fn pan_by(&mut self, delta: Point) {
        self.viewport.pan_by(delta);
        if let Some(location) = self.location_overlay_mut() {
            location.disable_follow_location();
        }
    }

    pub fn overlays(&self) -> &OverlayList {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayList {
        &mut self.overlays
    }

    pub fn location_overlay(&self) -> Option<&MyLocationOverlay> {
        self.overlays.get_as::<MyLocationOverlay>(MY_LOCATION_OVERLAY_ID)
    }

    pub fn location_overlay_mut(&mut self) -> Option<&mut MyLocationOverlay> {
        self.overlays
            .get_as_mut::<MyLocationOverlay>(MY_LOCATION_OVERLAY_ID)
    }

    /// Feeds a fix to the location overlay, recentering when it follows.
    /// Returns whether the overlay accepted the fix.
    pub fn apply_fix(&mut self, fix: Fix) -> bool {
        let Some(location) = self.location_overlay_mut() else {
            return false;
        };
        if !location.update_fix(fix) {
            return false;
        }
        if location.is_following() {
            self.viewport.set_center(fix.position);
        }
        true
    }

    /// Title of the topmost marker or route under `screen`
    pub fn overlay_title_at(&self, screen: &Point) -> Option<String> {
        self.overlays.hit_test(screen, &self.viewport)
    }

    /// Fills `context` with this frame's draw commands
    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        context.begin_frame();
        if self.state == SurfaceState::Detached || !self.viewport.has_layout() {
            return Ok(());
        }

        if let Some(tiles) = self.tiles.as_mut() {
            tiles.render(context, &self.viewport);
        }
        self.overlays.render(context, &self.viewport)
    }

    /// Stops tile fetching
    pub fn pause(&mut self) {
        if self.state != SurfaceState::Running {
            return;
        }
        if let Some(tiles) = self.tiles.as_mut() {
            tiles.loader_mut().pause();
        }
        self.state = SurfaceState::Paused;
    }

    pub fn resume(&mut self) {
        if self.state != SurfaceState::Paused {
            return;
        }
        if let Some(tiles) = self.tiles.as_mut() {
            tiles.loader_mut().resume();
        }
        self.state = SurfaceState::Running;
    }

    /// Releases tiles and overlays. Only the first call has an effect;
    /// returns whether this call released anything.
    pub fn detach(&mut self) -> bool {
        if self.state == SurfaceState::Detached {
            return false;
        }
        if let Some(mut tiles) = self.tiles.take() {
            tiles.loader_mut().shutdown();
        }
        self.overlays.clear();
        self.state = SurfaceState::Detached;
        self.release_count += 1;
        log::debug!("map surface detached");
        true
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_detached(&self) -> bool {
        self.state == SurfaceState::Detached
    }

    /// How many times resources were released (0 or 1)
    pub fn release_count(&self) -> u32 {
        self.release_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::MapMarker;
    use crate::rendering::context::DrawCommand;

    fn surface_with_location() -> MapSurface {
        let mut surface = MapSurface::new(GeoPosition::new(10.53724, 122.83202), 18.0);
        surface.set_size(Point::new(400.0, 400.0));
        let mut location = MyLocationOverlay::new();
        location.enable_my_location();
        location.enable_follow_location();
        surface.overlays_mut().add(Box::new(location)).unwrap();
        surface
    }

    #[test]
    fn test_zoom_steps_clamp_to_range() {
        let mut surface = MapSurface::new(GeoPosition::new(0.0, 0.0), 19.0);
        assert!(!surface.zoom_in());
        assert!(surface.zoom_out());
        assert_eq!(surface.viewport.zoom, 18.0);

        surface.set_view(GeoPosition::new(0.0, 0.0), 0.0);
        assert!(!surface.zoom_out());
    }

    #[test]
    fn test_following_fix_recenters_until_user_pans() {
        let mut surface = surface_with_location();
        let fix = Fix::new(GeoPosition::new(10.6, 122.9));
        assert!(surface.apply_fix(fix));
        assert_eq!(surface.viewport.center, GeoPosition::new(10.6, 122.9));

        surface.pan_by(Point::new(50.0, 0.0));
        let panned = surface.viewport.center;
        assert!(surface.apply_fix(Fix::new(GeoPosition::new(10.7, 123.0))));
        assert_eq!(surface.viewport.center, panned);
        assert_eq!(
            surface.location_overlay().unwrap().my_location(),
            Some(GeoPosition::new(10.7, 123.0))
        );
    }

    #[test]
    fn test_render_needs_layout() {
        let mut surface = MapSurface::new(GeoPosition::new(10.0, 122.0), 15.0);
        surface
            .overlays_mut()
            .add(Box::new(MapMarker::new("m", GeoPosition::new(10.0, 122.0))))
            .unwrap();

        let mut context = RenderContext::new(0.0, 0.0);
        surface.render(&mut context).unwrap();
        assert!(context.commands().is_empty());

        surface.set_size(Point::new(300.0, 300.0));
        let mut context = RenderContext::new(300.0, 300.0);
        surface.render(&mut context).unwrap();
        assert!(matches!(context.commands()[0], DrawCommand::Marker { .. }));
    }

    #[test]
    fn test_detach_releases_once() {
        let mut surface = surface_with_location();
        surface.pause();
        assert_eq!(surface.state(), SurfaceState::Paused);

        assert!(surface.detach());
        assert!(!surface.detach());
        assert_eq!(surface.release_count(), 1);
        assert!(surface.overlays().is_empty());

        surface.resume();
        assert!(surface.is_detached());
        let mut context = RenderContext::new(400.0, 400.0);
        surface.render(&mut context).unwrap();
        assert!(context.commands().is_empty());
    }
}
