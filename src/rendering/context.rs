use crate::core::geo::{Point, TileCoord};
use crate::layers::style::{Anchor, Color, MarkerIcon};
use std::sync::Arc;

/// Commands that can be issued to the render context.
///
/// All positions are screen pixels relative to the surface's top-left corner.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Raster tile; `data` is the encoded image as downloaded
    Tile {
        coord: TileCoord,
        data: Arc<Vec<u8>>,
        min: Point,
        max: Point,
    },
    /// Connected line through `points` in order
    Polyline {
        points: Vec<Point>,
        color: Color,
        width: f32,
    },
    Marker {
        id: String,
        /// Screen position of the marker's geographic point
        position: Point,
        icon: MarkerIcon,
        anchor: Anchor,
        title: String,
    },
    LocationDot {
        center: Point,
        /// Accuracy circle radius in pixels, when drawn
        accuracy_radius: Option<f32>,
        icon: Option<MarkerIcon>,
    },
}

/// Collects draw commands for one frame; the UI replays them onto a painter
#[derive(Debug, Default)]
pub struct RenderContext {
    pub width: f64,
    pub height: f64,
    drawing_queue: Vec<DrawCommand>,
}

impl RenderContext {
    /// Create a new render context for a surface of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.drawing_queue.push(command);
    }

    /// Queue a tile unless it lies completely outside the surface
    pub fn render_tile(&mut self, coord: TileCoord, data: Arc<Vec<u8>>, min: Point, max: Point) {
        if max.x < 0.0 || max.y < 0.0 || min.x > self.width || min.y > self.height {
            return;
        }
        self.push(DrawCommand::Tile {
            coord,
            data,
            min,
            max,
        });
    }

    /// Get the current drawing queue
    pub fn commands(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.drawing_queue
    }

    /// Marker commands in draw order
    pub fn markers(&self) -> impl Iterator<Item = &DrawCommand> {
        self.drawing_queue
            .iter()
            .filter(|command| matches!(command, DrawCommand::Marker { .. }))
    }

    /// Polyline commands in draw order
    pub fn polylines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.drawing_queue
            .iter()
            .filter(|command| matches!(command, DrawCommand::Polyline { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offscreen_tiles_are_dropped() {
        let mut context = RenderContext::new(256.0, 256.0);
        let data = Arc::new(vec![0u8; 4]);

        context.render_tile(
            TileCoord::new(0, 0, 1),
            data.clone(),
            Point::new(0.0, 0.0),
            Point::new(256.0, 256.0),
        );
        context.render_tile(
            TileCoord::new(1, 0, 1),
            data,
            Point::new(300.0, 0.0),
            Point::new(556.0, 256.0),
        );

        assert_eq!(context.commands().len(), 1);
        context.begin_frame();
        assert!(context.commands().is_empty());
    }
}
