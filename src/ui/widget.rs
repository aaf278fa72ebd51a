use crate::{
    core::constants::{
        CROSSHAIR_ICON_SIZE, LOCATION_DOT_RADIUS, MARKER_ICON_SIZE, SCROLL_PIXELS_PER_ZOOM_LEVEL,
    },
    core::geo::Point,
    layers::style::{Anchor, Color, MarkerIcon},
    rendering::context::{DrawCommand, RenderContext},
    screen::controller::ScreenController,
    ui::textures::TileTextures,
};
use egui::{
    Align2, Color32, FontId, Pos2, Rect, Response, Sense, Shape, Stroke, Ui, Vec2, Widget,
};

/// Info bubble shown after tapping a marker
#[derive(Debug, Clone)]
struct MarkerPopup {
    title: String,
    at: Pos2,
}

/// Immediate-mode widget showing one screen's map surface
///
/// Drag pans, the scroll wheel zooms around the pointer and a click on a
/// titled marker opens its info bubble.
pub struct MapView<'a> {
    screen: &'a mut ScreenController,
    textures: &'a mut TileTextures,
    interactive: bool,
}

impl<'a> MapView<'a> {
    pub fn new(screen: &'a mut ScreenController, textures: &'a mut TileTextures) -> Self {
        Self {
            screen,
            textures,
            interactive: true,
        }
    }

    /// Set whether the map reacts to input (default: true)
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response, popup_id: egui::Id) {
        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                self.screen.pan(Point::new(delta.x as f64, delta.y as f64));
                clear_popup(ui, popup_id);
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                let anchor = response
                    .hover_pos()
                    .map(|pos| pos - rect.min)
                    .unwrap_or(rect.size() / 2.0);
                self.screen.zoom_around(
                    Point::new(anchor.x as f64, anchor.y as f64),
                    scroll as f64 / SCROLL_PIXELS_PER_ZOOM_LEVEL,
                );
                clear_popup(ui, popup_id);
            }
        }

        if response.clicked() {
            let tapped = response.interact_pointer_pos().and_then(|pos| {
                let local = pos - rect.min;
                self.screen
                    .tap(Point::new(local.x as f64, local.y as f64))
                    .map(|title| MarkerPopup { title, at: pos })
            });
            ui.ctx().memory_mut(|mem| match tapped {
                Some(popup) => mem.data.insert_temp(popup_id, popup),
                None => mem.data.remove::<MarkerPopup>(popup_id),
            });
        }
    }

    fn paint(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(0xE5, 0xE3, 0xDF));

        let mut context = RenderContext::new(rect.width() as f64, rect.height() as f64);
        if let Err(err) = self.screen.render(&mut context) {
            log::warn!("rendering the map failed: {err}");
            return;
        }

        let to_screen = |point: &Point| rect.min + Vec2::new(point.x as f32, point.y as f32);

        for command in context.commands() {
            match command {
                DrawCommand::Tile { coord, data, min, max } => {
                    if let Some(texture) = self.textures.texture_for(ui.ctx(), *coord, data) {
                        painter.image(
                            texture,
                            Rect::from_two_pos(to_screen(min), to_screen(max)),
                            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                            Color32::WHITE,
                        );
                    }
                }
                DrawCommand::Polyline { points, color, width } => {
                    let points: Vec<Pos2> = points.iter().map(to_screen).collect();
                    painter.add(Shape::line(points, Stroke::new(*width, Color32::from(*color))));
                }
                DrawCommand::Marker { position, icon, anchor, .. } => {
                    paint_marker(&painter, to_screen(position), *icon, *anchor);
                }
                DrawCommand::LocationDot { center, accuracy_radius, icon } => {
                    let center = to_screen(center);
                    if let Some(radius) = accuracy_radius {
                        painter.circle(
                            center,
                            *radius,
                            Color32::from(Color::BLUE.with_alpha(40)),
                            Stroke::new(1.0, Color32::from(Color::BLUE.with_alpha(120))),
                        );
                    }
                    match icon {
                        Some(icon) => paint_marker(&painter, center, *icon, Anchor::CENTER),
                        None => {
                            painter.circle(
                                center,
                                LOCATION_DOT_RADIUS,
                                Color32::from(Color::BLUE),
                                Stroke::new(2.0, Color32::WHITE),
                            );
                        }
                    }
                }
            }
        }
    }
}

impl Widget for MapView<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let desired_size = ui.available_size();
        let sense = if self.interactive {
            Sense::click_and_drag()
        } else {
            Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(desired_size, sense);
        let popup_id = response.id.with("marker_popup");

        if let Err(err) = self
            .screen
            .on_layout(Point::new(rect.width() as f64, rect.height() as f64))
        {
            log::debug!("map layout ignored: {err}");
        }

        if self.interactive {
            self.handle_input(ui, rect, &response, popup_id);
        }
        self.paint(ui, rect);

        let painter = ui.painter_at(rect);
        if let Some(popup) = ui.ctx().memory(|mem| mem.data.get_temp::<MarkerPopup>(popup_id)) {
            paint_popup(&painter, &popup);
        }
        if let Some(attribution) = self.screen.surface().attribution() {
            painter.text(
                rect.right_bottom() - Vec2::new(4.0, 2.0),
                Align2::RIGHT_BOTTOM,
                attribution,
                FontId::proportional(10.0),
                Color32::from_gray(60),
            );
        }

        response
    }
}

fn clear_popup(ui: &Ui, popup_id: egui::Id) {
    ui.ctx().memory_mut(|mem| mem.data.remove::<MarkerPopup>(popup_id));
}

fn icon_size(icon: MarkerIcon) -> Vec2 {
    let (width, height) = match icon {
        MarkerIcon::Crosshair => CROSSHAIR_ICON_SIZE,
        MarkerIcon::Default | MarkerIcon::Pin => MARKER_ICON_SIZE,
    };
    Vec2::new(width, height)
}

/// Draws `icon` so that its anchor point sits on `at`
fn paint_marker(painter: &egui::Painter, at: Pos2, icon: MarkerIcon, anchor: Anchor) {
    let size = icon_size(icon);
    let top_left = at - Vec2::new(size.x * anchor.x, size.y * anchor.y);
    let rect = Rect::from_min_size(top_left, size);

    match icon {
        MarkerIcon::Default => {
            let head = Pos2::new(rect.center().x, rect.min.y + size.x / 2.0);
            let radius = size.x / 2.0;
            let tip = Pos2::new(rect.center().x, rect.max.y);
            let fill = Color32::from(Color::BLUE);
            painter.add(Shape::convex_polygon(
                vec![
                    Pos2::new(head.x - radius * 0.8, head.y + radius * 0.5),
                    Pos2::new(head.x + radius * 0.8, head.y + radius * 0.5),
                    tip,
                ],
                fill,
                Stroke::NONE,
            ));
            painter.circle(head, radius, fill, Stroke::new(1.0, Color32::from_gray(40)));
            painter.circle_filled(head, radius * 0.4, Color32::WHITE);
        }
        MarkerIcon::Pin => {
            let head = Pos2::new(rect.center().x, rect.min.y + size.x / 2.0);
            let tip = Pos2::new(rect.center().x, rect.max.y);
            painter.line_segment([head, tip], Stroke::new(2.0, Color32::from_gray(60)));
            painter.circle(
                head,
                size.x / 2.0,
                Color32::from(Color::RED),
                Stroke::new(1.0, Color32::from_gray(40)),
            );
        }
        MarkerIcon::Crosshair => {
            let center = rect.center();
            let radius = size.x.min(size.y) / 2.0 - 2.0;
            let stroke = Stroke::new(2.0, Color32::from(Color::RED));
            painter.circle_stroke(center, radius, stroke);
            painter.circle_stroke(center, radius / 3.0, stroke);
            painter.line_segment([center - Vec2::X * radius, center + Vec2::X * radius], stroke);
            painter.line_segment([center - Vec2::Y * radius, center + Vec2::Y * radius], stroke);
        }
    }
}

fn paint_popup(painter: &egui::Painter, popup: &MarkerPopup) {
    let font = FontId::proportional(13.0);
    let galley = painter.layout_no_wrap(popup.title.clone(), font, Color32::BLACK);
    let padding = Vec2::splat(6.0);
    let size = galley.size() + padding * 2.0;
    let rect = Rect::from_min_size(
        popup.at - Vec2::new(size.x / 2.0, size.y + 12.0),
        size,
    );

    painter.rect(rect, 4.0, Color32::WHITE, Stroke::new(1.0, Color32::from_gray(120)));
    painter.galley(rect.min + padding, galley, Color32::BLACK);
}
