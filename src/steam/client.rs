//! Steam Web API client.
//!
//! One shared client performs all upstream calls: vanity resolution, the
//! owned-games list, per-title storefront metadata, and achievement
//! progress. Status codes are mapped to domain errors here so the routes
//! never inspect HTTP responses themselves.

use std::time::Duration;

use async_trait::async_trait;
use rand::RngExt;
use reqwest::{Client, Response, StatusCode, header};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::steam::models::{
    AchievementsResponse, AppDetails, AppDetailsEnvelope, OwnedGame, OwnedGamesResponse,
    ResolveVanityResponse,
};

const API_BASE: &str = "https://api.steampowered.com";
const STORE_BASE: &str = "https://store.steampowered.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Statuses worth retrying before giving up on a call.
const RETRYABLE: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;

/// Upstream calls the service depends on.
///
/// Routes and the library service hold this behind `Arc<dyn SteamApi>` so
/// tests can substitute a stub.
#[async_trait]
pub trait SteamApi: Send + Sync {
    /// Resolve a vanity handle to a SteamID64.
    async fn resolve_vanity(&self, handle: &str) -> Result<String>;

    /// Fetch the full owned-games list for an account.
    async fn fetch_owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>>;

    /// Fetch storefront metadata for one title.
    ///
    /// Never fails: any error (malformed appid, transport, upstream
    /// `success=false`) degrades to `None`. Implementations must keep at
    /// least 100ms between consecutive calls.
    async fn fetch_app_details(&self, appid: u64) -> Option<AppDetails>;

    /// Fetch the raw achievement-progress object for one title.
    async fn fetch_achievements(&self, steam_id: &str, appid: u64) -> Result<serde_json::Value>;
}

/// Extract the vanity handle from a user-supplied identifier, which may be
/// a bare handle or a profile URL.
pub fn parse_profile_input(input: &str) -> Result<&str> {
    if let Some((_, rest)) = input.split_once("steamcommunity.com/id/") {
        return Ok(rest.trim_matches('/'));
    }
    if input.contains("steamcommunity.com/profiles/") {
        return Err(Error::ProfilesUrlUnsupported);
    }
    Ok(input)
}

/// Reqwest-backed [`SteamApi`] implementation.
pub struct SteamClient {
    http: Client,
    api_key: String,
    details_spacing: Duration,
}

impl SteamClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.steam_api_key.clone(),
            details_spacing: Duration::from_millis(config.details_spacing_ms),
        })
    }

    /// GET with up to [`MAX_RETRIES`] retries on transient statuses and
    /// transport errors, with exponential backoff and jitter.
    ///
    /// Returns the final response even when its status is an error; the
    /// caller owns the status-to-domain mapping.
    async fn get_with_retry(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let mut attempt = 0;
        loop {
            match self.http.get(url).query(query).send().await {
                Ok(response) => {
                    let status = response.status();
                    if RETRYABLE.contains(&status) && attempt < MAX_RETRIES {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        debug!(%url, %status, attempt, ?delay, "Retrying upstream call");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(error) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    let delay = backoff_delay(attempt);
                    debug!(%url, %error, attempt, ?delay, "Retrying upstream call");
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let base = BACKOFF_BASE_MS * 2u64.pow(attempt.saturating_sub(1));
    let jitter = rand::rng().random_range(0..250);
    Duration::from_millis(base + jitter)
}

#[async_trait]
impl SteamApi for SteamClient {
    async fn resolve_vanity(&self, handle: &str) -> Result<String> {
        let url = format!("{API_BASE}/ISteamUser/ResolveVanityURL/v0001/");
        let response = self
            .get_with_retry(&url, &[("key", self.api_key.as_str()), ("vanityurl", handle)])
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream(format!("vanity resolution returned {status}")));
        }

        let parsed: ResolveVanityResponse = response.json().await?;
        if parsed.response.success != 1 {
            return Err(Error::VanityNotFound);
        }
        parsed.response.steamid.ok_or(Error::VanityNotFound)
    }

    async fn fetch_owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>> {
        let url = format!("{API_BASE}/IPlayerService/GetOwnedGames/v0001/");
        let response = self
            .get_with_retry(
                &url,
                &[
                    ("key", self.api_key.as_str()),
                    ("steamid", steam_id),
                    ("format", "json"),
                    ("include_appinfo", "true"),
                ],
            )
            .await?;

        match response.status() {
            StatusCode::BAD_REQUEST => return Err(Error::InvalidSteamId),
            StatusCode::FORBIDDEN => return Err(Error::PrivateProfile),
            StatusCode::TOO_MANY_REQUESTS => return Err(Error::RateLimited),
            status if !status.is_success() => {
                return Err(Error::upstream(format!("owned-games fetch returned {status}")));
            }
            _ => {}
        }

        let parsed: OwnedGamesResponse = response.json().await?;
        parsed.response.games.ok_or(Error::NoGamesFound)
    }

    async fn fetch_app_details(&self, appid: u64) -> Option<AppDetails> {
        let url = format!("{STORE_BASE}/api/appdetails");
        let appid_str = appid.to_string();
        let result = self
            .get_with_retry(&url, &[("appids", appid_str.as_str())])
            .await;

        let details = match result {
            Ok(response) if response.status().is_success() => {
                match response
                    .json::<std::collections::HashMap<String, AppDetailsEnvelope>>()
                    .await
                {
                    Ok(mut body) => body
                        .remove(&appid_str)
                        .filter(|envelope| envelope.success)
                        .and_then(|envelope| envelope.data)
                        .map(|data| data.into_details()),
                    Err(error) => {
                        warn!(appid, %error, "Malformed appdetails response");
                        None
                    }
                }
            }
            Ok(response) => {
                warn!(appid, status = %response.status(), "appdetails fetch failed");
                None
            }
            Err(error) => {
                warn!(appid, %error, "appdetails fetch failed");
                None
            }
        };

        // Spacing between storefront calls; Steam rate-limits this endpoint
        // aggressively when a page of titles is enriched in one request.
        tokio::time::sleep(self.details_spacing).await;
        details
    }

    async fn fetch_achievements(&self, steam_id: &str, appid: u64) -> Result<serde_json::Value> {
        let url = format!("{API_BASE}/ISteamUserStats/GetPlayerAchievements/v0001/");
        let appid_str = appid.to_string();
        let response = self
            .get_with_retry(
                &url,
                &[
                    ("key", self.api_key.as_str()),
                    ("steamid", steam_id),
                    ("appid", appid_str.as_str()),
                ],
            )
            .await?;

        match response.status() {
            StatusCode::BAD_REQUEST => {
                return Err(Error::validation("Invalid SteamID64 or AppID."));
            }
            StatusCode::FORBIDDEN => return Err(Error::PrivateProfile),
            StatusCode::TOO_MANY_REQUESTS => return Err(Error::RateLimited),
            status if !status.is_success() => {
                return Err(Error::upstream(format!("achievements fetch returned {status}")));
            }
            _ => {}
        }

        let parsed: AchievementsResponse = response.json().await?;
        let stats = parsed.playerstats.ok_or(Error::NoAchievements)?;
        let success = stats
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !success {
            return Err(Error::NoAchievements);
        }
        Ok(stats)
    }
}
