//! egui front end: the map widget and the window chrome around it

pub mod app;
pub mod controls;
pub mod notices;
pub mod permission_dialog;
pub mod tab_bar;
pub mod textures;
pub mod widget;

pub use app::DemoApp;
pub use notices::Notices;
pub use permission_dialog::PermissionChoice;
pub use textures::TileTextures;
pub use widget::MapView;

pub trait UiMapExt {
    /// Adds a [`MapView`] filling the remaining space
    fn map_view(
        &mut self,
        screen: &mut crate::screen::controller::ScreenController,
        textures: &mut TileTextures,
    ) -> egui::Response;
}

impl UiMapExt for egui::Ui {
    fn map_view(
        &mut self,
        screen: &mut crate::screen::controller::ScreenController,
        textures: &mut TileTextures,
    ) -> egui::Response {
        self.add(MapView::new(screen, textures))
    }
}
