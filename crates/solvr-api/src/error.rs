use thiserror::Error;

/// Top-level error type for the `solvr-api` crate.
///
/// Every HTTP status the client cares about is classified here, once.
/// Downstream crates match on variants and never look at raw status codes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// HTTP 401. The auth-failure broadcast has already fired by the time
    /// the caller sees this.
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("authentication required"))]
    Unauthorized { message: Option<String> },

    /// HTTP 403 (e.g. voting on your own content).
    #[error("Forbidden: {}", .message.as_deref().unwrap_or("permission denied"))]
    Forbidden { message: Option<String>, body: String },

    // ── Resource state ──────────────────────────────────────────────
    /// HTTP 404.
    #[error("Not found: {}", .message.as_deref().unwrap_or("no such resource"))]
    NotFound { message: Option<String>, body: String },

    /// HTTP 409 (duplicate vote, email already registered, ...).
    #[error("Conflict ({code}): {}", .message.as_deref().unwrap_or("conflict"))]
    Conflict {
        code: String,
        message: Option<String>,
        body: String,
    },

    /// Any other non-2xx response.
    ///
    /// `code` and `message` come only from the `{"error": {"code", "message"}}`
    /// envelope; `body` is a preview of the raw response for debugging.
    #[error("API error (HTTP {status}): {}", .message.as_deref().unwrap_or("no error details"))]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
        body: String,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, ...)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` for HTTP 409.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The message from the server's error envelope, if it sent one.
    ///
    /// Bodies that are not the platform envelope (proxy error pages, plain
    /// text) and transport failures have no server message.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Conflict { code, .. } => Some(code),
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
