// solvr-api: Async Rust client for the Solvr REST API

pub mod account;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;
pub mod votes;

pub use auth::{AuthErrorHandler, AuthFailureEvent, AuthSubscription, OAuthProvider};
pub use client::ApiClient;
pub use error::Error;
pub use models::{AuthSession, MeResponse, RegisterRequest, VoteDirection, VoteResult};
pub use transport::{TlsMode, TransportConfig};
