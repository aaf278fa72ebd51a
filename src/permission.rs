//! Location permission
//!
//! A [`PermissionGate`] answers a request for one or more permission kinds
//! exactly once. The answer is remembered for the rest of the session: kinds
//! already granted or denied are answered from that record without asking
//! again, so a denial is never re-prompted automatically.

use crate::core::config::PermissionPolicy;
use crate::prelude::HashMap;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    /// Precise location
    Fine,
    /// Approximate location
    Coarse,
}

impl PermissionKind {
    pub const LOCATION: [PermissionKind; 2] = [PermissionKind::Fine, PermissionKind::Coarse];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// The set of kinds granted by one request (possibly empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionOutcome {
    pub fine: bool,
    pub coarse: bool,
}

impl PermissionOutcome {
    pub const DENIED: PermissionOutcome = PermissionOutcome {
        fine: false,
        coarse: false,
    };

    pub fn granted(kinds: &[PermissionKind]) -> Self {
        let mut outcome = Self::DENIED;
        for kind in kinds {
            outcome.set(*kind, true);
        }
        outcome
    }

    pub fn is_granted(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::Fine => self.fine,
            PermissionKind::Coarse => self.coarse,
        }
    }

    fn set(&mut self, kind: PermissionKind, granted: bool) {
        match kind {
            PermissionKind::Fine => self.fine = granted,
            PermissionKind::Coarse => self.coarse = granted,
        }
    }

    /// The location overlay may be shown with either grade of location access
    pub fn allows_location(&self) -> bool {
        self.fine || self.coarse
    }

    /// Keeps only the kinds that were actually requested
    pub fn restricted_to(&self, kinds: &[PermissionKind]) -> Self {
        let mut outcome = Self::DENIED;
        for kind in kinds {
            outcome.set(*kind, self.is_granted(*kind));
        }
        outcome
    }
}

#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Resolves once with the granted subset of `kinds`
    async fn request(&self, kinds: &[PermissionKind]) -> PermissionOutcome;

    /// Session state for one kind
    fn state(&self, kind: PermissionKind) -> PermissionState;
}

/// Per-session record of resolved permissions
#[derive(Debug, Default, Clone)]
pub struct PermissionStore {
    states: Arc<Mutex<HashMap<PermissionKind, PermissionState>>>,
}

impl PermissionStore {
    pub fn state(&self, kind: PermissionKind) -> PermissionState {
        self.states
            .lock()
            .ok()
            .and_then(|states| states.get(&kind).copied())
            .unwrap_or_default()
    }

    /// The outcome for `kinds` if every one of them is already resolved
    pub fn resolved(&self, kinds: &[PermissionKind]) -> Option<PermissionOutcome> {
        let mut outcome = PermissionOutcome::DENIED;
        for kind in kinds {
            match self.state(*kind) {
                PermissionState::Unknown => return None,
                PermissionState::Granted => outcome.set(*kind, true),
                PermissionState::Denied => {}
            }
        }
        Some(outcome)
    }

    /// Records the answer for each requested kind
    pub fn record(&self, kinds: &[PermissionKind], outcome: PermissionOutcome) {
        if let Ok(mut states) = self.states.lock() {
            for kind in kinds {
                let state = if outcome.is_granted(*kind) {
                    PermissionState::Granted
                } else {
                    PermissionState::Denied
                };
                states.insert(*kind, state);
            }
        }
    }
}

/// Answers from a fixed policy; used for headless runs and tests
#[derive(Debug, Clone)]
pub struct PolicyPermissionGate {
    policy: PermissionPolicy,
    store: PermissionStore,
}

impl PolicyPermissionGate {
    pub fn new(policy: PermissionPolicy) -> Self {
        Self {
            policy,
            store: PermissionStore::default(),
        }
    }

    fn answer(&self) -> PermissionOutcome {
        match self.policy {
            PermissionPolicy::GrantAll | PermissionPolicy::Prompt => PermissionOutcome {
                fine: true,
                coarse: true,
            },
            PermissionPolicy::CoarseOnly => PermissionOutcome {
                fine: false,
                coarse: true,
            },
            PermissionPolicy::DenyAll => PermissionOutcome::DENIED,
        }
    }
}

#[async_trait]
impl PermissionGate for PolicyPermissionGate {
    async fn request(&self, kinds: &[PermissionKind]) -> PermissionOutcome {
        if let Some(outcome) = self.store.resolved(kinds) {
            return outcome;
        }
        let outcome = self.answer().restricted_to(kinds);
        self.store.record(kinds, outcome);
        log::debug!("permission policy {:?} answered {:?}", self.policy, outcome);
        outcome
    }

    fn state(&self, kind: PermissionKind) -> PermissionState {
        self.store.state(kind)
    }
}

/// A request waiting for the user
#[derive(Debug)]
struct PendingPrompt {
    kinds: Vec<PermissionKind>,
    responder: oneshot::Sender<PermissionOutcome>,
}

/// Asks the user through a dialog.
///
/// `request` parks a pending prompt; the UI reads it with
/// [`PromptPermissionGate::pending_kinds`] and answers with
/// [`PromptPermissionGate::resolve`]. A newer request replaces an unanswered
/// one, which then resolves as denied.
#[derive(Debug, Clone, Default)]
pub struct PromptPermissionGate {
    pending: Arc<Mutex<Option<PendingPrompt>>>,
    store: PermissionStore,
}

impl PromptPermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds of the request currently waiting for an answer
    pub fn pending_kinds(&self) -> Option<Vec<PermissionKind>> {
        self.pending
            .lock()
            .ok()
            .and_then(|pending| pending.as_ref().map(|prompt| prompt.kinds.clone()))
    }

    /// Answers the pending prompt. Returns `false` when nothing was pending.
    pub fn resolve(&self, outcome: PermissionOutcome) -> bool {
        let prompt = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        match prompt {
            Some(prompt) => {
                let outcome = outcome.restricted_to(&prompt.kinds);
                self.store.record(&prompt.kinds, outcome);
                // The requester may already be gone with its screen
                let _ = prompt.responder.send(outcome);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl PermissionGate for PromptPermissionGate {
    async fn request(&self, kinds: &[PermissionKind]) -> PermissionOutcome {
        if let Some(outcome) = self.store.resolved(kinds) {
            return outcome;
        }

        let (responder, answer) = oneshot::channel();
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(PendingPrompt {
                kinds: kinds.to_vec(),
                responder,
            });
        }
        log::debug!("waiting for the user to answer a permission prompt for {kinds:?}");

        answer.await.unwrap_or(PermissionOutcome::DENIED)
    }

    fn state(&self, kind: PermissionKind) -> PermissionState {
        self.store.state(kind)
    }
}

/// Builds the gate selected by configuration
pub fn gate_for_policy(policy: PermissionPolicy) -> Arc<dyn PermissionGate> {
    match policy {
        PermissionPolicy::Prompt => Arc::new(PromptPermissionGate::new()),
        other => Arc::new(PolicyPermissionGate::new(other)),
    }
}
