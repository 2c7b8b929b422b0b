// ── Vote state types ──

use serde::Serialize;
use solvr_api::VoteDirection;

pub const LOGIN_REQUIRED_TO_VOTE: &str = "Login required to vote";
pub const ALREADY_VOTED: &str = "You have already voted on this post";
pub const VOTE_FAILED: &str = "Failed to vote";

/// Per-item optimistic vote state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteState {
    pub score: i64,
    /// The caller's own vote; `None` means not voted.
    pub direction: Option<VoteDirection>,
    pub is_voting: bool,
    pub error: Option<String>,
}

/// How a vote controller learns the caller's existing vote.
///
/// `Unknown` and `Known(None)` are deliberately different: `Unknown` asks
/// the controller to look it up, `Known(None)` says "not voted, don't ask".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteSeed {
    Unknown,
    Known(Option<VoteDirection>),
}

impl From<Option<VoteDirection>> for VoteSeed {
    fn from(direction: Option<VoteDirection>) -> Self {
        Self::Known(direction)
    }
}

/// Result of a single `vote()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Server accepted; state now holds its authoritative values.
    Applied,
    /// Another vote from this control was still in flight.
    Ignored,
    /// Rolled back; the message is also stored in `VoteState::error`.
    RolledBack { message: String },
}
