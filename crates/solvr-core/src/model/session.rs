// ── Session state types ──

use std::sync::Arc;

use super::Identity;

/// Message shown by the login prompt when a request needs authentication.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to continue";

/// Lifecycle of the session controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Mounted, `initialize()` not yet started.
    #[default]
    Uninitialized,
    /// Stored token found, identity fetch in flight.
    Initializing,
    Authenticated,
    Unauthenticated,
}

/// Current-user state owned by the session controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub phase: SessionPhase,
    pub user: Option<Arc<Identity>>,
}

impl Session {
    /// `true` until the startup sequence has determined the auth state.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Uninitialized | SessionPhase::Initializing
        )
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub(crate) fn authenticated(user: Arc<Identity>) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            user: Some(user),
        }
    }

    pub(crate) fn unauthenticated() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            user: None,
        }
    }
}

/// Interactive "please sign in" prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthModalState {
    pub visible: bool,
    pub message: String,
}
