//! Session lifecycle and optimistic voting on top of `solvr-api`.
//!
//! - **[`SessionController`]**: boots the session from the persisted token,
//!   owns the current [`Identity`], runs the login/logout flows and decides
//!   whether an auth failure reported by the API client should open the
//!   login prompt ([`AuthModalState`]).
//!
//! - **[`VoteController`]**: per-item optimistic vote state. The score and
//!   the caller's vote change the moment `vote()` is called and are rolled
//!   back atomically if the server refuses.
//!
//! - **Storage** ([`store`]): [`KeyValueStore`] backends (memory, JSON file,
//!   OS keyring) behind the typed [`TokenStore`].
//!
//! - **Navigation** ([`navigator`]): the [`Navigator`] seam the session uses
//!   to read the current route and to redirect.
//!
//! State is exposed through `tokio::sync::watch` receivers, so any number of
//! observers can follow a controller without polling.

pub mod config;
pub mod error;
pub mod model;
pub mod navigator;
pub mod session;
pub mod store;
pub mod vote;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DEFAULT_API_URL, TlsVerification};
pub use error::CoreError;
pub use navigator::{MemoryNavigator, NavigationKind, Navigator, is_auth_route};
pub use session::{AuthOutcome, AuthPromptDecision, SessionController, decide_auth_prompt};
pub use store::{FileStore, KeyValueStore, KeyringStore, MemoryStore, ReturnToHint, TokenStore};
pub use vote::VoteController;

pub use model::{
    AuthModalState, Identity, IdentityKind, LOGIN_REQUIRED_MESSAGE, Session, SessionPhase,
    VoteDirection, VoteOutcome, VoteSeed, VoteState,
};

// The client types callers need to wire a controller together.
pub use solvr_api::{ApiClient, OAuthProvider, RegisterRequest};
