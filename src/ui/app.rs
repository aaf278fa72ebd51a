use crate::{
    permission::PromptPermissionGate,
    screen::controller::ScreenState,
    shell::NavigationShell,
    ui::{
        controls::zoom_buttons, notices::Notices, permission_dialog, tab_bar::tab_bar,
        textures::TileTextures, UiMapExt,
    },
};
use egui::{CentralPanel, Frame, TopBottomPanel};

/// The whole window: the active screen's map, its zoom buttons, the tab bar,
/// transient notices and the permission dialog
pub struct DemoApp {
    shell: NavigationShell,
    prompt_gate: Option<PromptPermissionGate>,
    textures: TileTextures,
    notices: Notices,
}

impl DemoApp {
    /// `prompt_gate` is the gate the shell's screens ask, when permission is
    /// answered interactively
    pub fn new(shell: NavigationShell, prompt_gate: Option<PromptPermissionGate>) -> Self {
        Self {
            shell,
            prompt_gate,
            textures: TileTextures::default(),
            notices: Notices::default(),
        }
    }

    pub fn shell(&self) -> &NavigationShell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut NavigationShell {
        &mut self.shell
    }

    /// Runs one frame
    pub fn show(&mut self, ctx: &egui::Context) {
        self.sync_visibility(ctx);

        let screen = self.shell.screen_mut();
        screen.pump();
        self.notices.extend(screen.take_notices());

        if let Some(gate) = &self.prompt_gate {
            permission_dialog::show(ctx, gate);
        }

        let mut selected = None;
        TopBottomPanel::bottom("tab_bar").show(ctx, |ui| {
            selected = tab_bar(ui, self.shell.destinations(), self.shell.current());
        });
        if let Some(destination) = selected {
            if let Err(err) = self.shell.select(destination) {
                log::error!("could not open the {destination} screen: {err}");
                self.notices.push(format!("Could not open {destination}"));
            }
        }

        CentralPanel::default()
            .frame(Frame::none())
            .show(ctx, |ui| {
                let response = ui.map_view(self.shell.screen_mut(), &mut self.textures);
                zoom_buttons(ui, response.rect, self.shell.screen_mut());
            });

        self.notices.show(ctx);
    }

    /// A minimized window pauses the active screen
    fn sync_visibility(&mut self, ctx: &egui::Context) {
        let minimized = ctx.input(|i| i.viewport().minimized.unwrap_or(false));
        let screen = self.shell.screen_mut();
        let result = match (minimized, screen.state()) {
            (true, ScreenState::Active) => screen.pause(),
            (false, ScreenState::Paused) => screen.resume(),
            _ => Ok(()),
        };
        if let Err(err) = result {
            log::warn!("visibility change ignored: {err}");
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}
