//! Per-action request tracking so a double click or a slow response can't
//! apply out of order.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Predict,
    Upload,
    Login,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// A second request is refused while one is pending.
    Reject,
    /// A second request replaces the first; the older response is dropped.
    Supersede,
}

impl Action {
    pub fn policy(&self) -> Policy {
        match self {
            Action::Predict | Action::Upload => Policy::Supersede,
            Action::Login | Action::Register => Policy::Reject,
        }
    }

    pub fn pending_label(&self) -> &'static str {
        match self {
            Action::Predict => "Predicting...",
            Action::Upload => "Uploading...",
            Action::Login => "Logging in...",
            Action::Register => "Creating account...",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub action: Action,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    pending: HashMap<Action, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request, or returns `None` when the action refuses
    /// re-entry and is already pending.
    pub fn begin(&mut self, action: Action) -> Option<Ticket> {
        if action.policy() == Policy::Reject && self.is_pending(action) {
            log::debug!("{:?} already in flight, ignored", action);
            return None;
        }
        self.next += 1;
        if let Some(old) = self.pending.insert(action, self.next) {
            log::debug!("{:?} request {} superseded by {}", action, old, self.next);
        }
        Some(Ticket {
            action,
            generation: self.next,
        })
    }

    /// Completes a request. Returns `false` when its response is stale and
    /// must be discarded.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        match self.pending.get(&ticket.action) {
            Some(generation) if *generation == ticket.generation => {
                self.pending.remove(&ticket.action);
                true
            }
            _ => false,
        }
    }

    /// Forgets a pending request; its response will be discarded.
    pub fn abandon(&mut self, action: Action) {
        self.pending.remove(&action);
    }

    pub fn is_pending(&self, action: Action) -> bool {
        self.pending.contains_key(&action)
    }
}
