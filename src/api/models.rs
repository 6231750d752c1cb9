//! API response models (DTOs).

use serde::Serialize;

use crate::library::service::LibraryPage;
use crate::library::GameRecord;

/// Paged library response.
///
/// # Response Format
///
/// ```json
/// {
///     "steam_id": "76561197960287930",
///     "games": [...],
///     "total_games": 312,
///     "page": 1,
///     "per_page": 50,
///     "total_pages": 7
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct LibraryResponse {
    pub steam_id: String,
    pub games: Vec<GameRecord>,
    pub total_games: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl From<LibraryPage> for LibraryResponse {
    fn from(page: LibraryPage) -> Self {
        Self {
            steam_id: page.steam_id,
            games: page.games,
            total_games: page.total_games,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}
