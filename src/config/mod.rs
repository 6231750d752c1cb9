//! Application configuration loaded from the environment.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Service-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Steam Web API key. Required.
    pub steam_api_key: String,
    /// Upstream request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Minimum spacing between storefront metadata calls, in milliseconds.
    pub details_spacing_ms: u64,
    /// Courtesy delay before a numeric-id library fetch, in milliseconds.
    pub id_fetch_delay_ms: u64,
    /// Directory holding the static UI, if any.
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            steam_api_key: String::new(),
            request_timeout_secs: 10,
            details_spacing_ms: 100,
            id_fetch_delay_ms: 500,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Supported env vars:
    /// - `STEAM_API_KEY` (required)
    /// - `REQUEST_TIMEOUT_SECS`
    /// - `DETAILS_SPACING_MS`
    /// - `ID_FETCH_DELAY_MS`
    /// - `STATIC_DIR`
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            steam_api_key: std::env::var("STEAM_API_KEY")
                .map_err(|_| Error::config("Steam API key not found in environment"))?,
            ..Self::default()
        };

        if let Some(parsed) = env_parse("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parsed;
        }
        if let Some(parsed) = env_parse("DETAILS_SPACING_MS") {
            config.details_spacing_ms = parsed;
        }
        if let Some(parsed) = env_parse("ID_FETCH_DELAY_MS") {
            config.id_fetch_delay_ms = parsed;
        }
        if let Ok(dir) = std::env::var("STATIC_DIR")
            && !dir.trim().is_empty()
        {
            config.static_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn env_parse(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
