// Authorization plumbing shared by every request.
//
// The client owns a list of auth-failure handlers. Any request that comes
// back 401 dispatches an `AuthFailureEvent` to all of them synchronously,
// then the original error still goes back to the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use strum::{Display, EnumString};
use tracing::trace;

/// Signal emitted whenever any request receives HTTP 401.
///
/// Ephemeral: it is never stored. Overlapping failed requests each emit
/// their own event, so subscribers must treat duplicates idempotently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailureEvent {
    pub status_code: u16,
    pub message: String,
    /// Request path that failed (e.g. `/v1/me`).
    pub path: String,
}

/// Callback registered through [`ApiClient::on_auth_error`](crate::ApiClient::on_auth_error).
pub type AuthErrorHandler = Arc<dyn Fn(&AuthFailureEvent) + Send + Sync>;

/// Handle returned by `on_auth_error`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthSubscription(u64);

/// External identity providers supported by the platform's redirect flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OAuthProvider {
    Github,
    Google,
}

/// Subscriber list for auth failures.
///
/// Reads take a lock-free snapshot, so a handler may subscribe or
/// unsubscribe while a dispatch is running without deadlocking; the change
/// applies from the next event on.
pub(crate) struct AuthBroadcast {
    next_id: AtomicU64,
    listeners: ArcSwap<Vec<(AuthSubscription, AuthErrorHandler)>>,
}

impl AuthBroadcast {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, handler: AuthErrorHandler) -> AuthSubscription {
        let id = AuthSubscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push((id, Arc::clone(&handler)));
            next
        });
        trace!(subscription = id.0, "auth-failure handler registered");
        id
    }

    /// Returns `true` if the subscription was registered.
    pub(crate) fn unsubscribe(&self, id: AuthSubscription) -> bool {
        let previous = self.listeners.rcu(|current| {
            current
                .iter()
                .filter(|(sub, _)| *sub != id)
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().any(|(sub, _)| *sub == id)
    }

    pub(crate) fn dispatch(&self, event: &AuthFailureEvent) {
        let snapshot = self.listeners.load_full();
        trace!(
            handlers = snapshot.len(),
            path = %event.path,
            "dispatching auth failure"
        );
        for (_, handler) in snapshot.iter() {
            handler(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.load().len()
    }
}
