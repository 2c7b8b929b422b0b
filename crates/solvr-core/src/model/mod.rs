// ── Domain model ──
//
// Types owned by the session and vote controllers. Wire payloads from
// solvr-api are converted into these at the controller boundary.

pub mod identity;
pub mod session;
pub mod vote;

pub use identity::{Identity, IdentityKind};
pub use session::{AuthModalState, LOGIN_REQUIRED_MESSAGE, Session, SessionPhase};
pub use vote::{
    ALREADY_VOTED, LOGIN_REQUIRED_TO_VOTE, VOTE_FAILED, VoteOutcome, VoteSeed, VoteState,
};

pub use solvr_api::VoteDirection;
