//! The library pipeline: normalize, filter, sort, paginate.
//!
//! Pure and deterministic over the validated query and the raw upstream
//! collection. Step ordering is fixed: filters and the sort always see the
//! full matching set before pagination, and enrichment (in the service
//! layer) only ever touches the final page slice.

use serde::{Serialize, Serializer};

use crate::library::query::{LibraryQuery, SortKey};
use crate::steam::models::{AppDetails, OwnedGame};

/// One owned title after normalization.
///
/// Serializes with the upstream Steam field names, plus
/// a `details` field that is a populated object when enrichment succeeded
/// and `{}` otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub appid: u64,
    pub name: String,
    pub playtime_forever: u64,
    pub playtime_windows_forever: u64,
    pub playtime_mac_forever: u64,
    pub playtime_linux_forever: u64,
    pub playtime_deck_forever: u64,
    #[serde(rename = "playtime_2weeks")]
    pub playtime_2weeks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtime_last_played: Option<i64>,
    #[serde(serialize_with = "serialize_details")]
    pub details: Option<AppDetails>,
}

fn serialize_details<S: Serializer>(
    details: &Option<AppDetails>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match details {
        Some(details) => details.serialize(serializer),
        // Empty object, not null: enrichment failed or was not requested.
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// Drop raw entries missing `appid` or `name`; malformed upstream records
/// never reach a filter, sort, or response.
pub fn normalize(raw: Vec<OwnedGame>) -> Vec<GameRecord> {
    raw.into_iter()
        .filter_map(|game| {
            let appid = game.appid?;
            let name = game.name?;
            Some(GameRecord {
                appid,
                name,
                playtime_forever: game.playtime_forever,
                playtime_windows_forever: game.playtime_windows_forever,
                playtime_mac_forever: game.playtime_mac_forever,
                playtime_linux_forever: game.playtime_linux_forever,
                playtime_deck_forever: game.playtime_deck_forever,
                playtime_2weeks: game.playtime_2weeks,
                rtime_last_played: game.rtime_last_played,
                details: None,
            })
        })
        .collect()
}

/// Apply the query's filter predicates. Predicates commute, so the order
/// of the retain passes is not significant.
pub fn apply_filters(games: &mut Vec<GameRecord>, query: &LibraryQuery, now: i64) {
    if query.show_played_only {
        games.retain(|g| g.playtime_forever > 0);
    }
    if query.filter_windows {
        games.retain(|g| g.playtime_windows_forever > 0);
    }
    if query.filter_mac {
        games.retain(|g| g.playtime_mac_forever > 0);
    }
    if query.filter_linux {
        games.retain(|g| g.playtime_linux_forever > 0);
    }
    if query.filter_deck {
        games.retain(|g| g.playtime_deck_forever > 0);
    }
    if !query.search.is_empty() {
        games.retain(|g| g.name.to_lowercase().contains(&query.search));
    }
    if let Some(cutoff) = query.date_range.cutoff(now) {
        games.retain(|g| matches!(g.rtime_last_played, Some(t) if t != 0 && t >= cutoff));
    }
}

/// Stable single-key sort of the filtered set.
pub fn sort_games(games: &mut [GameRecord], key: SortKey) {
    match key {
        SortKey::Name => {
            games.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortKey::Playtime => {
            games.sort_by(|a, b| b.playtime_forever.cmp(&a.playtime_forever));
        }
        SortKey::LastPlayed => {
            games.sort_by(|a, b| {
                b.rtime_last_played
                    .unwrap_or(0)
                    .cmp(&a.rtime_last_played.unwrap_or(0))
            });
        }
        SortKey::Playtime2Weeks => {
            games.sort_by(|a, b| b.playtime_2weeks.cmp(&a.playtime_2weeks));
        }
    }
}

/// The page slice bounds plus the total page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub start: usize,
    pub end: usize,
    pub total_pages: usize,
}

/// Compute the slice for `page` of a filtered set of `total` items.
///
/// A start beyond the end yields an empty slice, not an error, and the
/// page count is at least 1 even for an empty set.
pub fn paginate(total: usize, page: usize, per_page: usize) -> PageBounds {
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);
    let total_pages = if total > 0 {
        total.div_ceil(per_page)
    } else {
        1
    };
    PageBounds {
        start,
        end,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::query::{DateRange, LibraryParams, LibraryQuery};

    fn game(appid: u64, name: &str) -> GameRecord {
        GameRecord {
            appid,
            name: name.to_string(),
            playtime_forever: 0,
            playtime_windows_forever: 0,
            playtime_mac_forever: 0,
            playtime_linux_forever: 0,
            playtime_deck_forever: 0,
            playtime_2weeks: 0,
            rtime_last_played: None,
            details: None,
        }
    }

    fn raw(appid: Option<u64>, name: Option<&str>) -> OwnedGame {
        serde_json::from_value(serde_json::json!({
            "appid": appid,
            "name": name,
        }))
        .unwrap()
    }

    fn base_query() -> LibraryQuery {
        LibraryQuery::from_params(&LibraryParams::default()).unwrap()
    }

    #[test]
    fn normalize_drops_incomplete_entries() {
        let games = normalize(vec![
            raw(Some(10), Some("Counter-Strike")),
            raw(None, Some("ghost")),
            raw(Some(20), None),
        ]);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].appid, 10);
    }

    #[test]
    fn played_only_filter() {
        let mut games = vec![game(1, "a"), game(2, "b")];
        games[0].playtime_forever = 90;
        let mut query = base_query();
        query.show_played_only = true;
        apply_filters(&mut games, &query, 0);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].appid, 1);
    }

    #[test]
    fn platform_filters_are_independent() {
        let mut games = vec![game(1, "a"), game(2, "b"), game(3, "c")];
        games[0].playtime_linux_forever = 5;
        games[1].playtime_linux_forever = 5;
        games[1].playtime_deck_forever = 5;
        let mut query = base_query();
        query.filter_linux = true;
        query.filter_deck = true;
        apply_filters(&mut games, &query, 0);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].appid, 2);
    }

    #[test]
    fn search_is_case_insensitive_containment() {
        let mut games = vec![game(1, "Half-Life 2"), game(2, "Portal")];
        let mut query = base_query();
        query.search = "half".into();
        apply_filters(&mut games, &query, 0);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Half-Life 2");
    }

    #[test]
    fn recency_window_excludes_unplayed_and_old() {
        let now = 1_700_000_000;
        let mut games = vec![game(1, "recent"), game(2, "old"), game(3, "never"), game(4, "zero")];
        games[0].rtime_last_played = Some(now - 24 * 60 * 60);
        games[1].rtime_last_played = Some(now - 60 * 24 * 60 * 60);
        games[3].rtime_last_played = Some(0);
        let mut query = base_query();
        query.date_range = DateRange::Last30Days;
        apply_filters(&mut games, &query, now);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].appid, 1);
    }

    #[test]
    fn filters_commute() {
        let now = 1_700_000_000;
        let mut lhs = Vec::new();
        for i in 0..20u64 {
            let mut g = game(i, if i % 2 == 0 { "Even Game" } else { "Odd Game" });
            g.playtime_forever = i % 3;
            g.playtime_windows_forever = i % 4;
            g.rtime_last_played = Some(now - (i as i64) * 10 * 24 * 60 * 60);
            lhs.push(g);
        }
        let mut rhs = lhs.clone();

        let mut query = base_query();
        query.show_played_only = true;
        query.filter_windows = true;
        query.search = "even".into();
        query.date_range = DateRange::LastYear;

        apply_filters(&mut lhs, &query, now);

        // Same predicates applied one at a time, in a different order.
        if let Some(cutoff) = query.date_range.cutoff(now) {
            rhs.retain(|g| matches!(g.rtime_last_played, Some(t) if t != 0 && t >= cutoff));
        }
        rhs.retain(|g| g.name.to_lowercase().contains(&query.search));
        rhs.retain(|g| g.playtime_windows_forever > 0);
        rhs.retain(|g| g.playtime_forever > 0);

        let ids = |v: &[GameRecord]| v.iter().map(|g| g.appid).collect::<Vec<_>>();
        assert_eq!(ids(&lhs), ids(&rhs));
    }

    #[test]
    fn name_sort_is_case_insensitive_ascending() {
        let mut games = vec![game(1, "Zeta"), game(2, "alpha"), game(3, "Beta")];
        sort_games(&mut games, SortKey::Name);
        let names: Vec<_> = games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn name_sort_is_stable_for_equal_keys() {
        let mut games = vec![game(1, "Same"), game(2, "same"), game(3, "SAME")];
        sort_games(&mut games, SortKey::Name);
        let ids: Vec<_> = games.iter().map(|g| g.appid).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn playtime_sort_is_descending() {
        let mut games = vec![game(1, "a"), game(2, "b"), game(3, "c")];
        games[0].playtime_forever = 10;
        games[1].playtime_forever = 300;
        games[2].playtime_forever = 20;
        sort_games(&mut games, SortKey::Playtime);
        let ids: Vec<_> = games.iter().map(|g| g.appid).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn last_played_sort_puts_never_played_last() {
        let mut games = vec![game(1, "never"), game(2, "recent"), game(3, "older")];
        games[1].rtime_last_played = Some(2_000);
        games[2].rtime_last_played = Some(1_000);
        sort_games(&mut games, SortKey::LastPlayed);
        let ids: Vec<_> = games.iter().map(|g| g.appid).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn two_week_sort_treats_missing_as_zero() {
        let mut games = vec![game(1, "idle"), game(2, "active")];
        games[1].playtime_2weeks = 120;
        sort_games(&mut games, SortKey::Playtime2Weeks);
        assert_eq!(games[0].appid, 2);
    }

    #[test]
    fn pagination_bounds() {
        assert_eq!(
            paginate(3, 1, 2),
            PageBounds { start: 0, end: 2, total_pages: 2 }
        );
        assert_eq!(
            paginate(3, 2, 2),
            PageBounds { start: 2, end: 3, total_pages: 2 }
        );
        // Past the end: empty slice, not an error.
        assert_eq!(
            paginate(3, 5, 2),
            PageBounds { start: 3, end: 3, total_pages: 2 }
        );
        // Empty set still reports one page.
        assert_eq!(
            paginate(0, 1, 50),
            PageBounds { start: 0, end: 0, total_pages: 1 }
        );
    }

    #[test]
    fn pages_partition_the_filtered_set() {
        let total = 53;
        let per_page = 10;
        let mut covered = 0;
        let mut expected_start = 0;
        for page in 1..=6 {
            let bounds = paginate(total, page, per_page);
            assert_eq!(bounds.start, expected_start);
            assert_eq!(bounds.total_pages, 6);
            covered += bounds.end - bounds.start;
            expected_start = bounds.end;
        }
        assert_eq!(covered, total);
    }

    #[test]
    fn empty_details_serialize_as_empty_object() {
        let entry = game(1, "a");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["details"], serde_json::json!({}));
        // Never played: the timestamp field is omitted entirely.
        assert!(value.get("rtime_last_played").is_none());
    }

    #[test]
    fn populated_details_serialize_in_full() {
        let mut entry = game(1, "a");
        entry.details = Some(AppDetails {
            genres: vec!["Action".into()],
            release_date: "10 Oct, 2007".into(),
            categories: vec!["Single-player".into()],
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["details"]["genres"][0], "Action");
        assert_eq!(value["details"]["release_date"], "10 Oct, 2007");
    }
}
