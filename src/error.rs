//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range request input. Never reaches upstream.
    #[error("{0}")]
    Validation(String),

    /// A `steamcommunity.com/profiles/<id>` URL was given where a vanity
    /// handle is expected.
    #[error("Please use the /id/ format, not /profiles/")]
    ProfilesUrlUnsupported,

    /// The vanity handle did not resolve to an account.
    #[error("Invalid username or profile not found")]
    VanityNotFound,

    /// Upstream rejected the SteamID64 (HTTP 400).
    #[error("Invalid SteamID64 or profile does not exist.")]
    InvalidSteamId,

    /// The profile's game details are not public (HTTP 403).
    #[error(
        "Profile is private. Please set your game details to public in Steam (Settings > Privacy)."
    )]
    PrivateProfile,

    /// Upstream rate limit hit and retries exhausted (HTTP 429).
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// The library response carried no games list.
    #[error("No games found or profile is private")]
    NoGamesFound,

    /// No achievement data for the given title.
    #[error("No achievements found or profile is private")]
    NoAchievements,

    /// Transport failure or unexpected upstream status after retries.
    #[error("Failed to fetch data from Steam API: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(msg: impl std::fmt::Display) -> Self {
        Self::Upstream(msg.to_string())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}
