use anyhow::Context as _;
use mapdemo::{
    core::config::PermissionPolicy,
    permission::{gate_for_policy, PermissionGate, PromptPermissionGate},
    runtime::RepaintHook,
    ui::DemoApp,
    AppConfig, NavigationShell, ScreenServices,
};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Desktop shell for the mapdemo screens
///
/// Usage: `mapdemo-app [config.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => "loading default configuration".to_string(),
    })?;

    let (gate, prompt_gate): (Arc<dyn PermissionGate>, Option<PromptPermissionGate>) =
        match config.permission {
            PermissionPolicy::Prompt => {
                let prompt = PromptPermissionGate::new();
                (Arc::new(prompt.clone()), Some(prompt))
            }
            policy => (gate_for_policy(policy), None),
        };

    // Filled in once the window exists; tasks finishing earlier just skip the wake-up
    let egui_ctx: Arc<OnceLock<egui::Context>> = Arc::new(OnceLock::new());
    let repaint: RepaintHook = {
        let egui_ctx = egui_ctx.clone();
        Arc::new(move || {
            if let Some(ctx) = egui_ctx.get() {
                ctx.request_repaint();
            }
        })
    };

    let services = ScreenServices::from_config(&config, tokio::runtime::Handle::current(), gate)
        .context("wiring screen services")?
        .with_repaint_hook(repaint);
    let shell = NavigationShell::new(services).context("opening the first screen")?;
    let app = DemoApp::new(shell, prompt_gate);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 800.0])
            .with_title("mapdemo"),
        ..Default::default()
    };

    log::info!("starting mapdemo");
    eframe::run_native(
        "mapdemo-app",
        options,
        Box::new(move |cc| {
            let _ = egui_ctx.set(cc.egui_ctx.clone());
            Box::new(app)
        }),
    )
    .map_err(|err| anyhow::anyhow!("window error: {err}"))?;

    Ok(())
}
