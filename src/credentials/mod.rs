//! Credential verification capability.
//!
//! The API layer never sees how credentials are stored; it holds an
//! `Arc<dyn CredentialVerifier>` and asks it to verify a username/password
//! pair. The default implementation keeps a single user in memory, loaded
//! from the environment, with the password as an argon2 hash.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use async_trait::async_trait;
use tracing::warn;

use crate::error::{Error, Result};

/// Verifies a username/secret pair, yielding the authenticated principal.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Option<String>;
}

/// Single-user store backed by environment configuration.
pub struct EnvCredentials {
    username: String,
    password_hash: String,
}

impl EnvCredentials {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Load from `PROXY_USERNAME` / `PROXY_PASSWORD_HASH`.
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("PROXY_USERNAME")
            .map_err(|_| Error::config("PROXY_USERNAME not set"))?;
        let password_hash = std::env::var("PROXY_PASSWORD_HASH")
            .map_err(|_| Error::config("PROXY_PASSWORD_HASH not set"))?;
        // Fail at startup on an unparseable hash, not on first login.
        PasswordHash::new(&password_hash)
            .map_err(|e| Error::config(format!("Invalid PROXY_PASSWORD_HASH: {e}")))?;
        Ok(Self::new(username, password_hash))
    }

    fn password_matches(&self, password: &str) -> bool {
        let parsed = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(%error, "Stored password hash failed to parse");
                return false;
            }
        };
        // Default Argon2 reads the parameters from the hash itself.
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[async_trait]
impl CredentialVerifier for EnvCredentials {
    async fn verify(&self, username: &str, password: &str) -> Option<String> {
        if username == self.username && self.password_matches(password) {
            Some(username.to_string())
        } else {
            None
        }
    }
}
