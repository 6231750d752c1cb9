//! Request parameter validation.
//!
//! Raw query parameters arrive as strings and are bounds-checked here
//! before any upstream call is made. A violation produces a
//! [`Error::Validation`] naming the offending parameter and the pipeline
//! never runs.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Page size ceiling for normal traffic.
const MAX_PER_PAGE: usize = 500;
/// Ceiling when the caller explicitly asks for more than
/// [`EXPORT_THRESHOLD`] items, unlocking a full-library export.
const MAX_PER_PAGE_EXPORT: usize = 10_000;
const EXPORT_THRESHOLD: usize = 1_000;

const DEFAULT_PER_PAGE: usize = 50;

/// Characters never allowed in a vanity handle.
const FORBIDDEN_HANDLE_CHARS: [char; 4] = ['<', '>', '"', '\''];

/// Raw query parameters of the library endpoints, exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryParams {
    pub username: Option<String>,
    pub steamid: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    #[serde(rename = "showPlayedOnly")]
    pub show_played_only: Option<String>,
    #[serde(rename = "filterWindows")]
    pub filter_windows: Option<String>,
    #[serde(rename = "filterMac")]
    pub filter_mac: Option<String>,
    #[serde(rename = "filterLinux")]
    pub filter_linux: Option<String>,
    #[serde(rename = "filterDeck")]
    pub filter_deck: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "dateRange")]
    pub date_range: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "fetchDetails")]
    pub fetch_details: Option<String>,
}

/// Sort order of the filtered library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Ascending, case-insensitive by title.
    #[default]
    Name,
    /// Descending by total playtime.
    Playtime,
    /// Descending by last-played timestamp; never-played titles sort last.
    LastPlayed,
    /// Descending by playtime over the last two weeks.
    Playtime2Weeks,
}

impl SortKey {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "playtime" => Some(Self::Playtime),
            "lastPlayed" => Some(Self::LastPlayed),
            "playtime2Weeks" => Some(Self::Playtime2Weeks),
            _ => None,
        }
    }
}

/// Recency window over the last-played timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    Last30Days,
    LastYear,
}

impl DateRange {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "last30Days" => Some(Self::Last30Days),
            "lastYear" => Some(Self::LastYear),
            _ => None,
        }
    }

    /// Lower bound on `rtime_last_played`, or `None` when unbounded.
    pub fn cutoff(self, now: i64) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Last30Days => Some(now - 30 * 24 * 60 * 60),
            Self::LastYear => Some(now - 365 * 24 * 60 * 60),
        }
    }
}

/// One validated request's parameters.
#[derive(Debug, Clone)]
pub struct LibraryQuery {
    pub page: usize,
    pub per_page: usize,
    pub show_played_only: bool,
    pub filter_windows: bool,
    pub filter_mac: bool,
    pub filter_linux: bool,
    pub filter_deck: bool,
    /// Lowercased, trimmed search term; empty means no search filter.
    pub search: String,
    pub date_range: DateRange,
    pub sort_by: SortKey,
    pub fetch_details: bool,
}

impl LibraryQuery {
    /// Validate and normalize raw parameters. Identifier validation is
    /// separate ([`validate_handle`] / [`validate_steam_id`]) because the
    /// two entry points differ only there.
    pub fn from_params(params: &LibraryParams) -> Result<Self> {
        let page = parse_number(params.page.as_deref(), 1)?;
        let per_page = parse_number(params.per_page.as_deref(), DEFAULT_PER_PAGE)?;

        let max_per_page = if per_page > EXPORT_THRESHOLD {
            MAX_PER_PAGE_EXPORT
        } else {
            MAX_PER_PAGE
        };
        if page < 1 || per_page < 1 || per_page > max_per_page {
            return Err(Error::validation("Invalid pagination parameters"));
        }

        let sort_by = match params.sort_by.as_deref() {
            None => SortKey::default(),
            Some(raw) => {
                SortKey::parse(raw).ok_or_else(|| Error::validation("Invalid sort_by parameter"))?
            }
        };

        let date_range = match params.date_range.as_deref() {
            None => DateRange::default(),
            Some(raw) => DateRange::parse(raw)
                .ok_or_else(|| Error::validation("Invalid date_range parameter"))?,
        };

        Ok(Self {
            page,
            per_page,
            show_played_only: parse_flag(params.show_played_only.as_deref()),
            filter_windows: parse_flag(params.filter_windows.as_deref()),
            filter_mac: parse_flag(params.filter_mac.as_deref()),
            filter_linux: parse_flag(params.filter_linux.as_deref()),
            filter_deck: parse_flag(params.filter_deck.as_deref()),
            search: params
                .search
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_lowercase(),
            date_range,
            sort_by,
            fetch_details: parse_flag(params.fetch_details.as_deref()),
        })
    }
}

/// Only the literal `true` (any case) enables a flag.
fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn parse_number(value: Option<&str>, default: usize) -> Result<usize> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::validation("Invalid pagination parameters")),
    }
}

/// Validate a vanity handle (which may still be a profile URL at this
/// point; URL extraction happens later).
pub fn validate_handle(username: Option<&str>) -> Result<&str> {
    let username = match username {
        Some(u) if !u.is_empty() => u,
        _ => return Err(Error::validation("No username provided")),
    };
    if username.len() > 50 || username.contains(FORBIDDEN_HANDLE_CHARS) {
        return Err(Error::validation("Invalid username format"));
    }
    Ok(username)
}

/// Validate a SteamID64: exactly 17 digits.
pub fn validate_steam_id(steam_id: Option<&str>) -> Result<&str> {
    let steam_id = match steam_id {
        Some(s) if !s.is_empty() => s,
        _ => return Err(Error::validation("No SteamID64 provided")),
    };
    if steam_id.len() != 17 || !steam_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation("Invalid SteamID64 format"));
    }
    Ok(steam_id)
}
