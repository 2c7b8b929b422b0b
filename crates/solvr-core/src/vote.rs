// ── Optimistic vote controller ──
//
// One controller per rendered vote control. The displayed score and the
// caller's own vote flip immediately on click, the request runs, and the
// state is then either replaced by the server's tallies or restored to
// exactly what it was before the click.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use solvr_api::{ApiClient, VoteDirection};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::model::{
    ALREADY_VOTED, LOGIN_REQUIRED_TO_VOTE, Session, VOTE_FAILED, VoteOutcome, VoteSeed, VoteState,
};
use crate::session::SessionController;

pub struct VoteController {
    inner: Arc<VoteInner>,
    seed_task: Option<JoinHandle<()>>,
}

struct VoteInner {
    api: ApiClient,
    post_id: String,
    state: watch::Sender<VoteState>,
    /// Set by the first `vote()`; a late seed lookup must not overwrite it.
    vote_started: AtomicBool,
    seeded: watch::Sender<bool>,
}

impl VoteController {
    /// Create the controller for `post_id` showing `score`.
    ///
    /// With [`VoteSeed::Unknown`] the caller's existing vote is looked up in
    /// the background once the session has finished loading, and only if it
    /// ended up authenticated; this must then be called from within a tokio
    /// runtime. Any other seed, or a settled anonymous session, issues no
    /// request.
    pub fn new(
        api: ApiClient,
        session: &SessionController,
        post_id: impl Into<String>,
        score: i64,
        seed: VoteSeed,
    ) -> Self {
        let initial = match seed {
            VoteSeed::Known(direction) => direction,
            VoteSeed::Unknown => None,
        };
        let (state, _) = watch::channel(VoteState {
            score,
            direction: initial,
            ..VoteState::default()
        });
        let lookup = seed == VoteSeed::Unknown && {
            let current = session.current();
            current.is_loading() || current.is_authenticated()
        };
        let (seeded, _) = watch::channel(!lookup);

        let inner = Arc::new(VoteInner {
            api,
            post_id: post_id.into(),
            state,
            vote_started: AtomicBool::new(false),
            seeded,
        });

        let seed_task = lookup.then(|| {
            tokio::spawn(fetch_seed(Arc::downgrade(&inner), session.subscribe()))
        });
        Self { inner, seed_task }
    }

    pub fn post_id(&self) -> &str {
        &self.inner.post_id
    }

    pub fn current(&self) -> VoteState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<VoteState> {
        self.inner.state.subscribe()
    }

    /// Resolves once the background lookup of the caller's vote (if any)
    /// has finished.
    pub async fn seeded(&self) {
        let mut rx = self.inner.seeded.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }

    pub async fn upvote(&self) -> VoteOutcome {
        self.vote(VoteDirection::Up).await
    }

    pub async fn downvote(&self) -> VoteOutcome {
        self.vote(VoteDirection::Down).await
    }

    /// Cast a vote. Ignored while another vote from this controller is in
    /// flight; never returns an error, failures land in `VoteState::error`.
    pub async fn vote(&self, direction: VoteDirection) -> VoteOutcome {
        let inner = &self.inner;

        // Guard check and optimistic update happen in one critical section,
        // before the first await.
        let mut previous = None;
        inner.state.send_if_modified(|s| {
            if s.is_voting {
                return false;
            }
            previous = Some((s.score, s.direction));
            inner.vote_started.store(true, Ordering::Release);
            s.score += direction.delta();
            s.direction = Some(direction);
            s.is_voting = true;
            s.error = None;
            true
        });
        let Some((prev_score, prev_direction)) = previous else {
            debug!(post_id = %inner.post_id, "vote already in flight, ignoring");
            return VoteOutcome::Ignored;
        };

        let _in_flight = VotingGuard(&inner.state);

        match inner.api.submit_vote(&inner.post_id, direction).await {
            Ok(result) => {
                debug!(
                    post_id = %inner.post_id,
                    score = result.vote_score,
                    "vote recorded"
                );
                inner.state.send_modify(|s| {
                    s.score = result.vote_score;
                    s.direction = result.user_vote;
                    s.is_voting = false;
                });
                VoteOutcome::Applied
            }
            Err(e) => {
                let message = if e.is_unauthorized() {
                    LOGIN_REQUIRED_TO_VOTE.to_owned()
                } else if e.is_conflict() {
                    ALREADY_VOTED.to_owned()
                } else {
                    e.server_message().unwrap_or(VOTE_FAILED).to_owned()
                };
                debug!(post_id = %inner.post_id, error = %e, "vote failed, rolling back");
                inner.state.send_modify(|s| {
                    s.score = prev_score;
                    s.direction = prev_direction;
                    s.is_voting = false;
                    s.error = Some(message.clone());
                });
                VoteOutcome::RolledBack { message }
            }
        }
    }
}

impl Drop for VoteController {
    fn drop(&mut self) {
        if let Some(task) = self.seed_task.take() {
            task.abort();
        }
    }
}

/// Releases `is_voting` if a `vote()` future is dropped mid-request.
struct VotingGuard<'a>(&'a watch::Sender<VoteState>);

impl Drop for VotingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|s| std::mem::replace(&mut s.is_voting, false));
    }
}

async fn fetch_seed(weak: Weak<VoteInner>, mut session: watch::Receiver<Session>) {
    // A session still loading its stored token is not anonymous yet.
    let authenticated = session
        .wait_for(|s| !s.is_loading())
        .await
        .is_ok_and(|s| s.is_authenticated());

    let Some(inner) = weak.upgrade() else {
        return;
    };
    if !authenticated {
        debug!(post_id = %inner.post_id, "session is anonymous, skipping vote lookup");
        inner.seeded.send_replace(true);
        return;
    }
    // Only the weak handle is held across the request.
    let (api, post_id) = (inner.api.clone(), inner.post_id.clone());
    drop(inner);

    let direction = match api.fetch_my_vote(&post_id).await {
        Ok(direction) => direction,
        Err(e) => {
            debug!(%post_id, error = %e, "vote lookup failed, assuming not voted");
            None
        }
    };

    // Controller gone: nothing to update.
    let Some(inner) = weak.upgrade() else {
        return;
    };
    inner.state.send_if_modified(|s| {
        if inner.vote_started.load(Ordering::Acquire) || s.direction == direction {
            return false;
        }
        s.direction = direction;
        true
    });
    inner.seeded.send_replace(true);
}
