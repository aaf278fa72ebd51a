use crate::screen::controller::ScreenController;
use egui::{Button, Rect, Ui, Vec2};

const BUTTON_SIZE: Vec2 = Vec2::new(32.0, 32.0);
const MARGIN: f32 = 10.0;

/// Zoom in / zoom out buttons in the top-right corner of `map_rect`.
/// Returns whether the zoom changed.
pub fn zoom_buttons(ui: &mut Ui, map_rect: Rect, screen: &mut ScreenController) -> bool {
    let zoom_in_rect = Rect::from_min_size(
        map_rect.right_top() + Vec2::new(-MARGIN - BUTTON_SIZE.x, MARGIN),
        BUTTON_SIZE,
    );
    let zoom_out_rect = zoom_in_rect.translate(Vec2::new(0.0, BUTTON_SIZE.y + 4.0));

    let viewport = &screen.surface().viewport;
    let can_zoom_in = viewport.zoom < viewport.max_zoom;
    let can_zoom_out = viewport.zoom > viewport.min_zoom;

    let mut changed = false;
    if ui
        .put(zoom_in_rect, Button::new("+").sense(sense_for(can_zoom_in)))
        .on_hover_text("Zoom in")
        .clicked()
    {
        changed |= screen.zoom_in();
    }
    if ui
        .put(zoom_out_rect, Button::new("−").sense(sense_for(can_zoom_out)))
        .on_hover_text("Zoom out")
        .clicked()
    {
        changed |= screen.zoom_out();
    }
    changed
}

fn sense_for(enabled: bool) -> egui::Sense {
    if enabled {
        egui::Sense::click()
    } else {
        egui::Sense::hover()
    }
}
