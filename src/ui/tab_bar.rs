use crate::screen::config::Destination;
use egui::{Layout, Ui};

const TAB_HEIGHT: f32 = 28.0;

/// One selectable label per destination. Returns the tab clicked this frame,
/// including the current one.
pub fn tab_bar(ui: &mut Ui, destinations: &[Destination], current: Destination) -> Option<Destination> {
    let mut selected = None;
    let count = destinations.len().max(1) as f32;
    let spacing = ui.spacing().item_spacing.x;
    let tab_width = (ui.available_width() - spacing * (count - 1.0)) / count;

    ui.horizontal(|ui| {
        for destination in destinations {
            ui.allocate_ui_with_layout(
                egui::vec2(tab_width, TAB_HEIGHT),
                Layout::centered_and_justified(egui::Direction::TopDown),
                |ui| {
                    if ui
                        .selectable_label(*destination == current, destination.label())
                        .clicked()
                    {
                        selected = Some(*destination);
                    }
                },
            );
        }
    });

    selected
}
