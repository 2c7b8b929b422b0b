// Wire types for the Solvr REST API.
//
// Field names follow the server's snake_case JSON. Optional fields default
// so that agent and human payloads share one shape.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Standard `{ "data": ... }` success envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Standard `{ "error": { "code", "message" } }` failure envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Votes ───────────────────────────────────────────────────────────

/// Direction of a vote. "Not voted" is represented as `Option::None`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Score change a single vote in this direction applies.
    pub fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VoteRequest {
    pub direction: VoteDirection,
}

/// `GET /v1/posts/{id}/my-vote` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct MyVoteResponse {
    #[serde(default)]
    pub vote: Option<VoteDirection>,
}

/// Authoritative vote tallies returned after a vote is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoteResult {
    pub vote_score: i64,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub user_vote: Option<VoteDirection>,
}

// ── Identity ────────────────────────────────────────────────────────

/// `GET /v1/me` payload.
///
/// Humans (JWT auth) omit `type`; agents (API key auth) send `"agent"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeResponse {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// ── Email / password auth ───────────────────────────────────────────

/// Input for `POST /v1/auth/register`.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: SecretString,
}

/// Raw body returned by login and register.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: SecretString,
    pub refresh_token: Option<SecretString>,
}

impl From<AuthResponse> for AuthSession {
    fn from(resp: AuthResponse) -> Self {
        Self {
            token: SecretString::from(resp.access_token),
            refresh_token: resp.refresh_token.map(SecretString::from),
        }
    }
}
