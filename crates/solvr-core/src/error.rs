// ── Core error types ──
//
// Errors surfaced by solvr-core. Consumers never see HTTP status codes;
// the `From<solvr_api::Error>` impl translates transport-layer errors into
// the session/vote taxonomy (unauthorized, conflict, transient, unknown).

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authorization ────────────────────────────────────────────────
    #[error("Login required: {message}")]
    Unauthorized { message: String },

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    // ── Resource state ───────────────────────────────────────────────
    #[error("Already exists: {message}")]
    Conflict { code: String, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Connectivity ─────────────────────────────────────────────────
    #[error("Cannot reach Solvr API: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Message suitable for showing to a person, preferring what the
    /// server said over the wrapper text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Conflict { message, .. }
            | Self::NotFound { message }
            | Self::Api { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<solvr_api::Error> for CoreError {
    fn from(err: solvr_api::Error) -> Self {
        match err {
            solvr_api::Error::Unauthorized { message } => CoreError::Unauthorized {
                message: message.unwrap_or_else(|| "authentication required".into()),
            },
            solvr_api::Error::Forbidden { message, .. } => CoreError::Forbidden {
                message: message.unwrap_or_else(|| "permission denied".into()),
            },
            solvr_api::Error::NotFound { message, .. } => CoreError::NotFound {
                message: message.unwrap_or_else(|| "no such resource".into()),
            },
            solvr_api::Error::Conflict { code, message, .. } => CoreError::Conflict {
                message: message.unwrap_or_else(|| code.clone()),
                code,
            },
            solvr_api::Error::Api {
                status,
                code,
                message,
                ..
            } => CoreError::Api {
                message: message.unwrap_or_else(|| format!("HTTP {status}")),
                code,
                status: Some(status),
            },
            solvr_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            solvr_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            solvr_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            solvr_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
