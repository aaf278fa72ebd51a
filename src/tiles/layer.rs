use super::loader::TileLoader;
use crate::core::geo::{Point, TileCoord};
use crate::core::viewport::Viewport;
use crate::prelude::HashSet;
use crate::rendering::context::RenderContext;

/// Base map drawn under every overlay.
///
/// Each frame queues the cached tiles covering the viewport and requests the
/// missing ones. A missing tile whose parent is cached shows the parent
/// scaled up until it arrives.
pub struct TileLayer {
    loader: TileLoader,
}

impl TileLayer {
    pub fn new(loader: TileLoader) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &TileLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut TileLoader {
        &mut self.loader
    }

    pub fn attribution(&self) -> &str {
        self.loader.source().attribution()
    }

    /// Queues tiles for `viewport`. Returns how many visible tiles were missing.
    pub fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> usize {
        self.loader.poll_completed();

        let max_zoom = self.loader.source().max_zoom();
        let cache = self.loader.cache().clone();
        let mut ready = Vec::new();
        let mut fallbacks = Vec::new();
        let mut fallback_seen = HashSet::default();

        let tiles = viewport.visible_tiles(max_zoom);
        let total = tiles.len();
        for tile in tiles {
            if let Some(data) = cache.get(&tile.coord) {
                ready.push((tile.coord, data, tile.min, tile.max));
                continue;
            }

            self.loader.request(tile.coord);
            if let Some(parent) = parent_of(tile.coord) {
                if let Some(data) = cache.get(&parent) {
                    if fallback_seen.insert(parent) {
                        let (min, max) = parent_rect(tile.coord, tile.min, tile.max);
                        fallbacks.push((parent, data, min, max));
                    }
                }
            }
        }

        let missing = total - ready.len();
        // Fallbacks first so loaded tiles paint over them
        for (coord, data, min, max) in fallbacks.into_iter().chain(ready) {
            context.render_tile(coord, data, min, max);
        }
        missing
    }
}

fn parent_of(coord: TileCoord) -> Option<TileCoord> {
    (coord.z > 0).then(|| TileCoord::new(coord.x / 2, coord.y / 2, coord.z - 1))
}

/// Screen rectangle of the parent of `coord`, given where `coord` is placed
fn parent_rect(coord: TileCoord, min: Point, max: Point) -> (Point, Point) {
    let width = max.x - min.x;
    let height = max.y - min.y;
    let origin = Point::new(
        min.x - (coord.x % 2) as f64 * width,
        min.y - (coord.y % 2) as f64 * height,
    );
    (origin, Point::new(origin.x + 2.0 * width, origin.y + 2.0 * height))
}
