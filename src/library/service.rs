//! Library service: one shared path for both entry points.
//!
//! The handle-based and numeric-id endpoints differ only in how they
//! obtain the SteamID64; everything after that goes through
//! [`LibraryService::fetch_page`].

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::library::pipeline::{self, GameRecord};
use crate::library::query::LibraryQuery;
use crate::steam::client::{SteamApi, parse_profile_input};

/// One page of a filtered, sorted library. Constructed fresh per request,
/// never cached or shared.
#[derive(Debug, Clone)]
pub struct LibraryPage {
    pub steam_id: String,
    pub games: Vec<GameRecord>,
    pub total_games: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

pub struct LibraryService {
    steam: Arc<dyn SteamApi>,
}

impl LibraryService {
    pub fn new(steam: Arc<dyn SteamApi>) -> Self {
        Self { steam }
    }

    /// Resolve a user-supplied handle (possibly a profile URL) to a
    /// SteamID64 via the vanity endpoint.
    pub async fn resolve_identifier(&self, input: &str) -> Result<String> {
        let handle = parse_profile_input(input)?;
        info!(handle, "Resolving vanity handle");
        self.steam.resolve_vanity(handle).await
    }

    /// Fetch the library and run the pipeline for an already-resolved id.
    pub async fn fetch_page(&self, steam_id: &str, query: &LibraryQuery) -> Result<LibraryPage> {
        let raw = self.steam.fetch_owned_games(steam_id).await?;
        let mut games = pipeline::normalize(raw);

        let now = chrono::Utc::now().timestamp();
        pipeline::apply_filters(&mut games, query, now);
        pipeline::sort_games(&mut games, query.sort_by);

        let total_games = games.len();
        let bounds = pipeline::paginate(total_games, query.page, query.per_page);
        let mut page_games: Vec<GameRecord> = games
            .into_iter()
            .skip(bounds.start)
            .take(bounds.end - bounds.start)
            .collect();

        if query.fetch_details {
            for game in &mut page_games {
                game.details = self.steam.fetch_app_details(game.appid).await;
            }
        }

        info!(
            steam_id,
            page = query.page,
            returned = page_games.len(),
            total_filtered = total_games,
            "Fetched library page"
        );

        Ok(LibraryPage {
            steam_id: steam_id.to_string(),
            games: page_games,
            total_games,
            page: query.page,
            per_page: query.per_page,
            total_pages: bounds.total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::Error;
    use crate::library::query::LibraryParams;
    use crate::steam::models::{AppDetails, OwnedGame};

    struct StubSteam {
        games: Vec<OwnedGame>,
        failing_detail_appids: Vec<u64>,
    }

    #[async_trait]
    impl SteamApi for StubSteam {
        async fn resolve_vanity(&self, handle: &str) -> crate::error::Result<String> {
            if handle == "gaben" {
                Ok("76561197960287930".to_string())
            } else {
                Err(Error::VanityNotFound)
            }
        }

        async fn fetch_owned_games(&self, _steam_id: &str) -> crate::error::Result<Vec<OwnedGame>> {
            Ok(self.games.clone())
        }

        async fn fetch_app_details(&self, appid: u64) -> Option<AppDetails> {
            if self.failing_detail_appids.contains(&appid) {
                None
            } else {
                Some(AppDetails {
                    genres: vec!["Action".into()],
                    release_date: "1 Jan, 2020".into(),
                    categories: vec![],
                })
            }
        }

        async fn fetch_achievements(
            &self,
            _steam_id: &str,
            _appid: u64,
        ) -> crate::error::Result<serde_json::Value> {
            Err(Error::NoAchievements)
        }
    }

    fn owned(appid: u64, name: &str) -> OwnedGame {
        serde_json::from_value(serde_json::json!({ "appid": appid, "name": name })).unwrap()
    }

    fn service(games: Vec<OwnedGame>, failing: Vec<u64>) -> LibraryService {
        LibraryService::new(Arc::new(StubSteam {
            games,
            failing_detail_appids: failing,
        }))
    }

    #[tokio::test]
    async fn name_sorted_first_page() {
        let svc = service(
            vec![owned(1, "Zeta"), owned(2, "alpha"), owned(3, "Beta")],
            vec![],
        );
        let mut params = LibraryParams::default();
        params.per_page = Some("2".into());
        let query = LibraryQuery::from_params(&params).unwrap();

        let page = svc.fetch_page("76561197960287930", &query).await.unwrap();
        let names: Vec<_> = page.games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta"]);
        assert_eq!(page.total_games, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn enrichment_failure_degrades_single_title() {
        let svc = service(vec![owned(1, "alpha"), owned(2, "beta")], vec![2]);
        let mut params = LibraryParams::default();
        params.fetch_details = Some("true".into());
        let query = LibraryQuery::from_params(&params).unwrap();

        let page = svc.fetch_page("76561197960287930", &query).await.unwrap();
        assert!(page.games[0].details.is_some());
        assert!(page.games[1].details.is_none());
    }

    #[tokio::test]
    async fn details_untouched_when_not_requested() {
        let svc = service(vec![owned(1, "alpha")], vec![]);
        let query = LibraryQuery::from_params(&LibraryParams::default()).unwrap();
        let page = svc.fetch_page("76561197960287930", &query).await.unwrap();
        assert!(page.games[0].details.is_none());
    }

    #[tokio::test]
    async fn resolver_handles_urls_and_bare_handles() {
        let svc = service(vec![], vec![]);
        assert_eq!(
            svc.resolve_identifier("https://steamcommunity.com/id/gaben/")
                .await
                .unwrap(),
            "76561197960287930"
        );
        assert!(matches!(
            svc.resolve_identifier("unknown-handle").await.unwrap_err(),
            Error::VanityNotFound
        ));
        assert!(matches!(
            svc.resolve_identifier("steamcommunity.com/profiles/123")
                .await
                .unwrap_err(),
            Error::ProfilesUrlUnsupported
        ));
    }
}
