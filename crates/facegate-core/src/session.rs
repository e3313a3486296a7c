use serde::Serialize;
use tracing::info;

use crate::faces::AuthDecision;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// Per-process authentication flag. Never persisted.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Only an accepted decision moves the session; a reject leaves it as is.
    pub fn record(&mut self, decision: AuthDecision) -> SessionState {
        if decision.is_accept() && self.state != SessionState::Authenticated {
            self.state = SessionState::Authenticated;
            info!("session authenticated");
        }
        self.state
    }

    pub fn logout(&mut self) {
        if self.state == SessionState::Authenticated {
            info!("session logged out");
        }
        self.state = SessionState::Unauthenticated;
    }
}
