use crate::permission::{PermissionKind, PermissionOutcome, PromptPermissionGate};
use egui::{Align2, Vec2, Window};

/// Answer picked in the location permission dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionChoice {
    Precise,
    Approximate,
    Deny,
}

impl PermissionChoice {
    /// Outcome for a request of `kinds`; kinds that were not asked for stay
    /// denied
    pub fn outcome(self, kinds: &[PermissionKind]) -> PermissionOutcome {
        let granted = match self {
            PermissionChoice::Precise => PermissionOutcome::granted(&PermissionKind::LOCATION),
            PermissionChoice::Approximate => PermissionOutcome::granted(&[PermissionKind::Coarse]),
            PermissionChoice::Deny => PermissionOutcome::DENIED,
        };
        granted.restricted_to(kinds)
    }
}

/// Shows a modal window while `gate` has a pending request. Returns the
/// choice made this frame, if any.
pub fn show(ctx: &egui::Context, gate: &PromptPermissionGate) -> Option<PermissionChoice> {
    let kinds = gate.pending_kinds()?;
    let precise_asked = kinds.contains(&PermissionKind::Fine);

    let mut choice = None;
    Window::new("Location access")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label("Allow mapdemo to show your position on the map?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if precise_asked && ui.button("Precise").clicked() {
                    choice = Some(PermissionChoice::Precise);
                }
                if ui.button("Approximate").clicked() {
                    choice = Some(PermissionChoice::Approximate);
                }
                if ui.button("Deny").clicked() {
                    choice = Some(PermissionChoice::Deny);
                }
            });
        });

    let choice = choice?;
    let outcome = choice.outcome(&kinds);
    log::info!("location permission answered: {choice:?}");
    if !gate.resolve(outcome) {
        log::debug!("permission request went away before it was answered");
    }
    Some(choice)
}
