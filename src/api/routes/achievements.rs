//! Achievement progress route.
//!
//! Proxies the raw `playerstats` object from upstream; the pipeline is not
//! involved.

use axum::{Json, extract::Query, extract::State};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::server::AppState;
use crate::error::Error;
use crate::library::query::validate_steam_id;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AchievementParams {
    pub steamid: Option<String>,
    pub appid: Option<String>,
}

/// `GET /get_achievements`
pub async fn get_achievements(
    State(state): State<AppState>,
    Query(params): Query<AchievementParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let steam_id = validate_steam_id(params.steamid.as_deref())?;
    let appid = parse_appid(params.appid.as_deref())?;

    let stats = state.steam.fetch_achievements(steam_id, appid).await?;
    Ok(Json(stats))
}

fn parse_appid(raw: Option<&str>) -> Result<u64, Error> {
    raw.filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::validation("Invalid AppID"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appid_must_be_numeric() {
        assert!(parse_appid(None).is_err());
        assert!(parse_appid(Some("")).is_err());
        assert!(parse_appid(Some("44O")).is_err());
        assert!(parse_appid(Some("-440")).is_err());
        assert_eq!(parse_appid(Some("440")).unwrap(), 440);
    }
}
