//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `ConfigError` into user-facing errors with help text
//! and a stable exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use solvr_config::ConfigError;
use solvr_core::CoreError;
use solvr_core::model::{ALREADY_VOTED, LOGIN_REQUIRED_TO_VOTE};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Solvr API")]
    #[diagnostic(
        code(solvr::connection_failed),
        help(
            "{reason}\n\
             Check your network, or point at another server with --api-url."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(solvr::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not signed in")]
    #[diagnostic(
        code(solvr::not_signed_in),
        help("Run: solvr login --email <EMAIL>  or  solvr auth github")
    )]
    NotSignedIn,

    #[error("Sign-in failed: {message}")]
    #[diagnostic(code(solvr::auth_failed))]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(code(solvr::forbidden))]
    Forbidden { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(solvr::not_found))]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(solvr::conflict))]
    Conflict { message: String },

    #[error("Vote on '{post_id}' was not recorded: {message}")]
    #[diagnostic(code(solvr::vote_rejected))]
    VoteRejected { post_id: String, message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(solvr::api_error))]
    ApiError {
        code: Option<String>,
        message: String,
    },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(solvr::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(solvr::config),
        help("Check your config file or SOLVR_* environment variables.")
    )]
    Config(Box<ConfigError>),

    #[error("Session storage error: {message}")]
    #[diagnostic(
        code(solvr::storage),
        help("Try --storage memory to run without persisting the session.")
    )]
    Storage { message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(solvr::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(solvr::json))]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotSignedIn | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::VoteRejected { message, .. } => match message.as_str() {
                LOGIN_REQUIRED_TO_VOTE => exit_code::AUTH,
                ALREADY_VOTED => exit_code::CONFLICT,
                _ => exit_code::GENERAL,
            },
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { message } => CliError::AuthFailed { message },
            CoreError::Forbidden { message } => CliError::Forbidden { message },
            CoreError::Conflict { message, .. } => CliError::Conflict { message },
            CoreError::NotFound { message } => CliError::NotFound { message },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Api { message, code, .. } => CliError::ApiError { code, message },
            CoreError::Storage { message } => CliError::Storage { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
