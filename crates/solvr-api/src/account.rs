// Account endpoints
//
// Identity lookup, email/password login and registration, and the
// provider redirect URL for browser-style OAuth flows.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::OAuthProvider;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AuthResponse, AuthSession, DataEnvelope, MeResponse, RegisterRequest};

impl ApiClient {
    /// Fetch the identity behind the current bearer token.
    ///
    /// `GET /v1/me`. Fails with `Error::Unauthorized` when the token is
    /// missing, expired or revoked.
    pub async fn fetch_me(&self) -> Result<MeResponse, Error> {
        let url = self.api_url("v1/me")?;
        let envelope: DataEnvelope<MeResponse> = self.get(url).await?;
        debug!(id = %envelope.data.id, "identity fetched");
        Ok(envelope.data)
    }

    /// Authenticate with email and password.
    ///
    /// `POST /v1/auth/login`. The returned token is NOT attached to the
    /// client; callers decide whether to persist and use it.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthSession, Error> {
        let url = self.api_url("v1/auth/login")?;
        debug!("logging in at {}", url);

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let resp: AuthResponse = self.post(url, &body).await?;
        Ok(resp.into())
    }

    /// Create a new human account.
    ///
    /// `POST /v1/auth/register`. Duplicate email or username comes back as
    /// `Error::Conflict`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, Error> {
        let url = self.api_url("v1/auth/register")?;
        debug!(username = %request.username, "registering account");

        let body = json!({
            "email": request.email,
            "username": request.username,
            "display_name": request.display_name,
            "password": request.password.expose_secret(),
        });
        let resp: AuthResponse = self.post(url, &body).await?;
        Ok(resp.into())
    }

    /// URL of the provider's authorization redirect (`/v1/auth/{provider}`).
    ///
    /// No request is made; the caller navigates to this URL.
    pub fn provider_authorize_url(&self, provider: OAuthProvider) -> Result<Url, Error> {
        self.api_url(&format!("v1/auth/{provider}"))
    }
}
