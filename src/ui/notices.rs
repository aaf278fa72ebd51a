use crate::core::constants::NOTICE_DURATION_MS;
use egui::{Align2, Area, Frame, Id, Vec2};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Short-lived messages shown over the bottom of the window
pub struct Notices {
    items: VecDeque<(String, Instant)>,
    duration: Duration,
}

impl Notices {
    pub fn new(duration: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            duration,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.items.push_back((text.into(), Instant::now()));
    }

    pub fn extend(&mut self, texts: impl IntoIterator<Item = String>) {
        for text in texts {
            self.push(text);
        }
    }

    /// Drops expired notices; returns the ones still visible
    pub fn visible(&mut self, now: Instant) -> Vec<&str> {
        let duration = self.duration;
        self.items
            .retain(|(_, shown_at)| now.duration_since(*shown_at) < duration);
        self.items.iter().map(|(text, _)| text.as_str()).collect()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let duration = self.duration;
        let next_expiry = self
            .items
            .front()
            .map(|(_, shown_at)| duration.saturating_sub(now.duration_since(*shown_at)));

        let visible = self.visible(now);
        if visible.is_empty() {
            return;
        }

        Area::new(Id::new("notices"))
            .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -64.0))
            .interactable(false)
            .show(ctx, |ui| {
                for text in visible {
                    Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(text);
                    });
                }
            });

        if let Some(remaining) = next_expiry {
            ctx.request_repaint_after(remaining);
        }
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(Duration::from_millis(NOTICE_DURATION_MS))
    }
}
