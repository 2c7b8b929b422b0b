// ── Durable key-value storage ──
//
// The session layer persists two strings across restarts: the bearer token
// and the "return here after login" hint. Backends implement the small
// `KeyValueStore` trait; `TokenStore` and `ReturnToHint` give the two keys a
// typed face.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;

mod file;
mod keyring;
mod memory;

pub use self::file::FileStore;
pub use self::keyring::KeyringStore;
pub use self::memory::MemoryStore;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "solvr_token";
/// Key holding the post-login return URL, consumed once by the callback.
pub const RETURN_TO_KEY: &str = "solvr_auth_return_to";

/// Minimal string key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Persists the opaque bearer token. No validation, no expiry.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.backend.set(TOKEN_KEY, token.expose_secret())
    }

    pub fn load(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self
            .backend
            .get(TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.backend.remove(TOKEN_KEY)
    }
}

/// Where to send the user once an external login completes.
#[derive(Clone)]
pub struct ReturnToHint {
    backend: Arc<dyn KeyValueStore>,
}

impl ReturnToHint {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn save(&self, path: &str) -> Result<(), CoreError> {
        self.backend.set(RETURN_TO_KEY, path)
    }

    pub fn peek(&self) -> Result<Option<String>, CoreError> {
        self.backend.get(RETURN_TO_KEY)
    }

    /// Read and remove the hint in one step.
    pub fn take(&self) -> Result<Option<String>, CoreError> {
        let value = self.backend.get(RETURN_TO_KEY)?;
        if value.is_some() {
            self.backend.remove(RETURN_TO_KEY)?;
        }
        Ok(value)
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.backend.remove(RETURN_TO_KEY)
    }
}
