// ── Session controller ──
//
// Owns "who is logged in": boots the session from the persisted token,
// keeps the API client's bearer token in sync with the store, and turns
// auth failures reported by the client into a login prompt when (and only
// when) the user would expect one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use secrecy::SecretString;
use solvr_api::{ApiClient, AuthFailureEvent, AuthSubscription, OAuthProvider, RegisterRequest};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::model::{AuthModalState, Identity, LOGIN_REQUIRED_MESSAGE, Session, SessionPhase};
use crate::navigator::{Navigator, is_auth_route, is_local_path};
use crate::store::{KeyValueStore, ReturnToHint, TokenStore};

/// Query parameter carrying an explicit post-login destination.
pub const NEXT_PARAM: &str = "next";

/// Result of a credential login or registration. Failures carry a message
/// ready to show next to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failed { message: String },
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What to do with one auth failure, given the session at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPromptDecision {
    /// Boot-time identity check still running; a stale token is expected.
    SuppressWhileLoading,
    /// Already on a login, registration or callback page.
    SuppressOnAuthRoute,
    /// The user is logged in; the failure concerns something else.
    SuppressAuthenticated,
    ShowLoginPrompt,
}

/// Evaluate the prompt rules in order: loading, route, authenticated.
pub fn decide_auth_prompt(session: &Session, current_path: &str) -> AuthPromptDecision {
    if session.is_loading() {
        AuthPromptDecision::SuppressWhileLoading
    } else if is_auth_route(current_path) {
        AuthPromptDecision::SuppressOnAuthRoute
    } else if session.is_authenticated() {
        AuthPromptDecision::SuppressAuthenticated
    } else {
        AuthPromptDecision::ShowLoginPrompt
    }
}

/// Cheaply cloneable handle; all clones share one session.
///
/// The auth-failure subscription lives exactly as long as the shared
/// state: it is registered in [`mount`](Self::mount) and removed when the
/// last clone is dropped.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    tokens: TokenStore,
    return_to: ReturnToHint,
    navigator: Arc<dyn Navigator>,
    session: watch::Sender<Session>,
    modal: watch::Sender<AuthModalState>,
    initialized: AtomicBool,
    subscription: AuthSubscription,
}

impl SessionController {
    /// Create the controller and subscribe it to the client's auth
    /// failures. Call [`initialize`](Self::initialize) next.
    pub fn mount(
        api: ApiClient,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let weak = weak.clone();
            // Reads live state through the weak handle at event time, never
            // a copy captured here.
            let subscription = api.on_auth_error(move |event| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_auth_failure(event);
                }
            });
            let (session, _) = watch::channel(Session::default());
            let (modal, _) = watch::channel(AuthModalState::default());

            SessionInner {
                tokens: TokenStore::new(Arc::clone(&store)),
                return_to: ReturnToHint::new(store),
                api,
                navigator,
                session,
                modal,
                initialized: AtomicBool::new(false),
                subscription,
            }
        });
        debug!("session controller mounted");
        Self { inner }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn current(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    pub fn current_user(&self) -> Option<Arc<Identity>> {
        self.inner.session.borrow().user.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    pub fn auth_modal(&self) -> AuthModalState {
        self.inner.modal.borrow().clone()
    }

    pub fn subscribe_auth_modal(&self) -> watch::Receiver<AuthModalState> {
        self.inner.modal.subscribe()
    }

    pub fn dismiss_auth_modal(&self) {
        self.inner.modal.send_if_modified(|modal| {
            let was_visible = modal.visible;
            modal.visible = false;
            was_visible
        });
    }

    // ── Boot ─────────────────────────────────────────────────────────

    /// Restore the session from the persisted token.
    ///
    /// Runs once per controller; later calls return immediately. Never
    /// fails: a missing or rejected token leaves the session
    /// unauthenticated. Loading ends only after the identity check has
    /// settled, so auth failures raised by that check never prompt.
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner
            .session
            .send_modify(|s| s.phase = SessionPhase::Initializing);

        let token = self.inner.tokens.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read stored token; starting logged out");
            None
        });

        let Some(token) = token else {
            debug!("no stored token");
            self.inner.session.send_replace(Session::unauthenticated());
            return;
        };

        self.inner.api.set_auth_token(token);
        if let Err(e) = self.load_identity().await {
            debug!(error = %e, "stored token rejected");
        }
    }

    // ── Token lifecycle ──────────────────────────────────────────────

    /// Adopt a freshly issued token: persist it, attach it to the client
    /// and resolve the identity behind it.
    pub async fn set_token(&self, token: SecretString) -> Result<Arc<Identity>, CoreError> {
        self.inner.initialized.store(true, Ordering::Release);
        if let Err(e) = self.inner.tokens.save(&token) {
            warn!(error = %e, "failed to persist token; session will not survive a restart");
        }
        self.inner.api.set_auth_token(token);
        self.load_identity().await
    }

    /// Re-resolve the identity for the current token.
    pub async fn refresh_identity(&self) -> Result<Arc<Identity>, CoreError> {
        if !self.inner.api.has_auth_token() {
            self.inner.session.send_replace(Session::unauthenticated());
            return Err(CoreError::Unauthorized {
                message: "not logged in".into(),
            });
        }
        self.load_identity().await
    }

    /// Forget the token and the user, then reload at the site root.
    pub fn logout(&self) {
        self.forget_token();
        self.inner.session.send_replace(Session::unauthenticated());
        self.dismiss_auth_modal();
        info!("logged out");
        self.inner.navigator.reload("/");
    }

    // ── Login flows ──────────────────────────────────────────────────

    /// Remember where to come back to, then hand off to the provider.
    ///
    /// The destination is the `next` query parameter when it names a local
    /// path, otherwise the current path unless that is itself an auth page.
    pub fn login_with_provider(&self, provider: OAuthProvider) -> Result<Url, CoreError> {
        let nav = &self.inner.navigator;
        let destination = nav
            .query_param(NEXT_PARAM)
            .filter(|next| is_local_path(next))
            .or_else(|| {
                let path = nav.current_path();
                (!is_auth_route(&path)).then_some(path)
            });

        let stored = match destination.as_deref() {
            Some(path) => self.inner.return_to.save(path),
            None => self.inner.return_to.clear(),
        };
        if let Err(e) = stored {
            warn!(error = %e, "failed to store return-to hint");
        }

        let url = self.inner.api.provider_authorize_url(provider)?;
        debug!(%provider, return_to = ?destination, "redirecting to identity provider");
        nav.assign(url.as_str());
        Ok(url)
    }

    /// Finish an external login: adopt the token, then navigate to the
    /// remembered destination (default `/`) and return it.
    pub async fn complete_provider_login(&self, token: SecretString) -> Result<String, CoreError> {
        self.set_token(token).await?;

        let destination = self
            .inner
            .return_to
            .take()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to read return-to hint");
                None
            })
            .filter(|path| is_local_path(path))
            .unwrap_or_else(|| "/".to_owned());

        self.inner.navigator.assign(&destination);
        Ok(destination)
    }

    pub async fn login_with_password(&self, email: &str, password: &SecretString) -> AuthOutcome {
        match self.inner.api.login(email, password).await {
            Ok(session) => self.adopt(session.token).await,
            Err(e) => failed(CoreError::from(e)),
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> AuthOutcome {
        match self.inner.api.register(request).await {
            Ok(session) => self.adopt(session.token).await,
            Err(e) => failed(CoreError::from(e)),
        }
    }

    async fn adopt(&self, token: SecretString) -> AuthOutcome {
        match self.set_token(token).await {
            Ok(user) => {
                info!(user = %user.display_name, "logged in");
                AuthOutcome::Success
            }
            Err(e) => failed(e),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn load_identity(&self) -> Result<Arc<Identity>, CoreError> {
        match self.inner.api.fetch_me().await {
            Ok(me) => {
                let user = Arc::new(Identity::from(me));
                debug!(id = %user.id, kind = ?user.kind, "identity resolved");
                self.inner
                    .session
                    .send_replace(Session::authenticated(Arc::clone(&user)));
                self.dismiss_auth_modal();
                Ok(user)
            }
            Err(e) => {
                self.forget_token();
                self.inner.session.send_replace(Session::unauthenticated());
                Err(e.into())
            }
        }
    }

    fn forget_token(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            warn!(error = %e, "failed to clear stored token");
        }
        self.inner.api.clear_auth_token();
    }
}

impl SessionInner {
    fn handle_auth_failure(&self, event: &AuthFailureEvent) {
        let path = self.navigator.current_path();
        let decision = decide_auth_prompt(&self.session.borrow(), &path);
        debug!(
            status = event.status_code,
            request = %event.path,
            route = %path,
            ?decision,
            "auth failure"
        );

        if decision == AuthPromptDecision::ShowLoginPrompt {
            self.modal.send_if_modified(|modal| {
                if modal.visible {
                    return false;
                }
                modal.visible = true;
                LOGIN_REQUIRED_MESSAGE.clone_into(&mut modal.message);
                true
            });
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.api.off_auth_error(self.subscription);
        debug!("session controller unmounted");
    }
}

fn failed(err: CoreError) -> AuthOutcome {
    AuthOutcome::Failed {
        message: err.user_message(),
    }
}
