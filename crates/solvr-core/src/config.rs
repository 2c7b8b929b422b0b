// ── Runtime client configuration ──
//
// Describes *how* to reach the Solvr API. Never touches disk; the CLI (via
// solvr-config) constructs a `ClientConfig` and hands it in.

use std::time::Duration;

use solvr_api::transport::{TlsMode, TransportConfig};
use solvr_api::ApiClient;
use url::Url;

use crate::error::CoreError;

/// Default production API root.
pub const DEFAULT_API_URL: &str = "https://api.solvr.dev";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local development servers).
    DangerAcceptInvalid,
}

/// Configuration for talking to one Solvr API deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root (e.g., `https://api.solvr.dev`).
    pub api_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
    }

    /// Build the shared API client for this configuration.
    pub fn build_client(&self) -> Result<ApiClient, CoreError> {
        Ok(ApiClient::new(self.api_url.clone(), &self.transport())?)
    }
}
