//! Shared configuration for Solvr tools.
//!
//! TOML file + `SOLVR_*` environment overrides, platform data paths, the
//! choice of token storage backend, and translation to
//! `solvr_core::ClientConfig`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use solvr_core::{
    ClientConfig, DEFAULT_API_URL, FileStore, KeyValueStore, KeyringStore, MemoryStore,
    TlsVerification,
};

/// Prefix for environment overrides, e.g. `SOLVR_API_URL`.
pub const ENV_PREFIX: &str = "SOLVR_";

pub const DEFAULT_FRONTEND_URL: &str = "https://solvr.dev";

/// File inside the data directory holding the persisted session.
pub const SESSION_FILE: &str = "session.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("cannot determine a data directory; set data_dir or SOLVR_DATA_DIR")]
    NoDataDir,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Where the session token is kept between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the data directory.
    #[default]
    File,
    /// OS credential store.
    Keyring,
    /// Nothing persists; every run starts logged out.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Solvr API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Web frontend, used to print absolute links for local routes.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,

    /// Extra CA certificate (PEM) to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub storage: StorageBackend,

    /// Override for the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            frontend_url: default_frontend_url(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            storage: StorageBackend::default(),
            data_dir: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_frontend_url() -> String {
    DEFAULT_FRONTEND_URL.into()
}
fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Runtime client settings for `solvr_core`.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let api_url = parse_url("api_url", &self.api_url)?;

        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(ClientConfig {
            api_url,
            tls,
            timeout: Duration::from_secs(self.timeout),
        })
    }

    pub fn frontend_url(&self) -> Result<Url, ConfigError> {
        parse_url("frontend_url", &self.frontend_url)
    }

    /// Resolved data directory: explicit setting, else the platform default.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .ok_or(ConfigError::NoDataDir)
    }

    pub fn session_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(SESSION_FILE))
    }

    /// Open the configured token storage backend.
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        let store: Arc<dyn KeyValueStore> = match self.storage {
            StorageBackend::File => Arc::new(FileStore::new(self.session_file()?)),
            StorageBackend::Keyring => Arc::new(KeyringStore::default()),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url)
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "solvr", "solvr")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("solvr");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load from the canonical config path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if it exists), then `SOLVR_*` variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}
