//! Steam Web API response models.
//!
//! Every field the upstream may omit is optional or defaulted; the
//! library pipeline applies the defaulting rules, not ad-hoc lookups.

use serde::{Deserialize, Serialize};

/// One entry of the `GetOwnedGames` response, as upstream sends it.
///
/// Entries missing `appid` or `name` do exist in the wild and are dropped
/// during normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedGame {
    pub appid: Option<u64>,
    pub name: Option<String>,
    #[serde(default)]
    pub playtime_forever: u64,
    #[serde(default)]
    pub playtime_windows_forever: u64,
    #[serde(default)]
    pub playtime_mac_forever: u64,
    #[serde(default)]
    pub playtime_linux_forever: u64,
    #[serde(default)]
    pub playtime_deck_forever: u64,
    #[serde(default)]
    pub playtime_2weeks: u64,
    /// Unix timestamp of the last session; absent or zero means never
    /// recorded.
    pub rtime_last_played: Option<i64>,
}

/// Envelope of `IPlayerService/GetOwnedGames`.
#[derive(Debug, Deserialize)]
pub struct OwnedGamesResponse {
    #[serde(default)]
    pub response: OwnedGamesBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnedGamesBody {
    pub game_count: Option<u64>,
    pub games: Option<Vec<OwnedGame>>,
}

/// Envelope of `ISteamUser/ResolveVanityURL`.
#[derive(Debug, Deserialize)]
pub struct ResolveVanityResponse {
    pub response: ResolveVanityBody,
}

#[derive(Debug, Deserialize)]
pub struct ResolveVanityBody {
    pub success: i32,
    pub steamid: Option<String>,
}

/// Per-title store metadata attached to a page entry on request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppDetails {
    pub genres: Vec<String>,
    pub release_date: String,
    pub categories: Vec<String>,
}

/// One appid's envelope in the storefront `appdetails` response.
#[derive(Debug, Deserialize)]
pub struct AppDetailsEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<AppDetailsData>,
}

#[derive(Debug, Deserialize)]
pub struct AppDetailsData {
    #[serde(default)]
    pub genres: Vec<Descriptor>,
    pub release_date: Option<ReleaseDate>,
    #[serde(default)]
    pub categories: Vec<Descriptor>,
}

#[derive(Debug, Deserialize)]
pub struct Descriptor {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseDate {
    pub date: Option<String>,
}

impl AppDetailsData {
    /// Flatten the storefront shape into the fields the API exposes.
    pub fn into_details(self) -> AppDetails {
        AppDetails {
            genres: self.genres.into_iter().map(|g| g.description).collect(),
            release_date: self
                .release_date
                .and_then(|r| r.date)
                .unwrap_or_else(|| "Unknown".to_string()),
            categories: self.categories.into_iter().map(|c| c.description).collect(),
        }
    }
}

/// Envelope of `ISteamUserStats/GetPlayerAchievements`.
#[derive(Debug, Deserialize)]
pub struct AchievementsResponse {
    pub playerstats: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_game_defaults_missing_counters() {
        let game: OwnedGame =
            serde_json::from_str(r#"{"appid": 440, "name": "Team Fortress 2"}"#).unwrap();
        assert_eq!(game.appid, Some(440));
        assert_eq!(game.playtime_forever, 0);
        assert_eq!(game.playtime_deck_forever, 0);
        assert!(game.rtime_last_played.is_none());
    }

    #[test]
    fn owned_games_body_tolerates_empty_response() {
        let parsed: OwnedGamesResponse = serde_json::from_str(r#"{"response": {}}"#).unwrap();
        assert!(parsed.response.games.is_none());
    }

    #[test]
    fn app_details_flattens_descriptors() {
        let data: AppDetailsData = serde_json::from_str(
            r#"{
                "genres": [{"id": "1", "description": "Action"}],
                "release_date": {"coming_soon": false, "date": "10 Oct, 2007"},
                "categories": [{"id": 2, "description": "Single-player"}]
            }"#,
        )
        .unwrap();
        let details = data.into_details();
        assert_eq!(details.genres, vec!["Action"]);
        assert_eq!(details.release_date, "10 Oct, 2007");
        assert_eq!(details.categories, vec!["Single-player"]);
    }

    #[test]
    fn app_details_release_date_defaults_to_unknown() {
        let data: AppDetailsData = serde_json::from_str(r#"{"genres": []}"#).unwrap();
        assert_eq!(data.into_details().release_date, "Unknown");
    }
}
