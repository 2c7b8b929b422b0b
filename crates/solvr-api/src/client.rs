// Solvr API HTTP client
//
// Wraps `reqwest::Client` with URL construction, bearer-token injection,
// envelope unwrapping and status classification. Endpoint groups (account,
// votes) are implemented as inherent methods in separate files so this
// module stays focused on transport mechanics.

use std::sync::{Arc, RwLock};

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{AuthBroadcast, AuthFailureEvent, AuthSubscription};
use crate::error::Error;
use crate::models::ErrorEnvelope;
use crate::transport::TransportConfig;

/// Raw HTTP client for the Solvr REST API.
///
/// Cheaply cloneable; clones share the bearer token and the auth-failure
/// subscriber list. Every request goes through [`send`](Self::send), the
/// single place that inspects HTTP status codes.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer credential attached to every outgoing request.
    token: RwLock<Option<SecretString>>,
    auth_errors: AuthBroadcast,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (e.g. `https://api.solvr.dev`); paths
    /// such as `/v1/me` are appended to it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                token: RwLock::new(None),
                auth_errors: AuthBroadcast::new(),
            }),
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ── Bearer token ─────────────────────────────────────────────────

    /// Attach `token` to all subsequent requests.
    pub fn set_auth_token(&self, token: SecretString) {
        debug!("bearer token attached");
        *self.inner.token.write().expect("token lock poisoned") = Some(token);
    }

    /// Stop sending a bearer token.
    pub fn clear_auth_token(&self) {
        debug!("bearer token cleared");
        *self.inner.token.write().expect("token lock poisoned") = None;
    }

    pub fn has_auth_token(&self) -> bool {
        self.inner.token.read().expect("token lock poisoned").is_some()
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.inner.token.read().expect("token lock poisoned");
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── Auth-failure broadcast ───────────────────────────────────────

    /// Register a handler invoked synchronously for every HTTP 401 this
    /// client (or any clone of it) receives.
    pub fn on_auth_error(
        &self,
        handler: impl Fn(&AuthFailureEvent) + Send + Sync + 'static,
    ) -> AuthSubscription {
        self.inner.auth_errors.subscribe(Arc::new(handler))
    }

    /// Remove a handler. Returns `false` if it was already removed.
    pub fn off_auth_error(&self, subscription: AuthSubscription) -> bool {
        self.inner.auth_errors.unsubscribe(subscription)
    }

    /// Number of registered auth-failure handlers.
    pub fn auth_error_subscribers(&self) -> usize {
        self.inner.auth_errors.len()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path such as `v1/posts/{id}/vote`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let resp = self.send(Method::GET, url, None::<&()>).await?;
        decode(resp).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let resp = self.send(Method::POST, url, Some(body)).await?;
        decode(resp).await
    }

    /// Issue a request and classify the response status.
    ///
    /// On HTTP 401 every auth-failure handler runs before the error is
    /// returned; the caller still receives `Error::Unauthorized`.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<reqwest::Response, Error> {
        debug!("{method} {url}");

        let mut builder = self.apply_auth(self.inner.http.request(method, url.clone()));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        trace!(%status, path = url.path(), "response received");
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(&body);

        if status == StatusCode::UNAUTHORIZED {
            self.inner.auth_errors.dispatch(&AuthFailureEvent {
                status_code: status.as_u16(),
                message: message
                    .clone()
                    .unwrap_or_else(|| "authentication required".into()),
                path: url.path().to_owned(),
            });
            return Err(Error::Unauthorized { message });
        }

        let body = body_preview(&body);
        if message.is_none() {
            debug!(%status, body = %body, "error response without envelope");
        }
        Err(match status {
            StatusCode::FORBIDDEN => Error::Forbidden { message, body },
            StatusCode::NOT_FOUND => Error::NotFound { message, body },
            StatusCode::CONFLICT => Error::Conflict {
                code: code.unwrap_or_else(|| "CONFLICT".into()),
                message,
                body,
            },
            _ => Error::Api {
                status: status.as_u16(),
                code,
                message,
                body,
            },
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.has_auth_token())
            .finish_non_exhaustive()
    }
}

/// Decode a successful response body, keeping the raw text on failure.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", body_preview(&body)),
        body,
    })
}

/// Pull `code` / `message` out of the platform's error envelope.
fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.code,
            envelope.error.message.filter(|m| !m.is_empty()),
        ),
        Err(_) => (None, None),
    }
}

fn body_preview(body: &str) -> String {
    body.chars().take(200).collect()
}
