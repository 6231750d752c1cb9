//! Library routes.
//!
//! The two entry points share one pipeline path; they differ only in how
//! the SteamID64 is obtained (vanity resolution vs direct validation).

use axum::{Json, extract::Query, extract::State};

use crate::api::error::ApiResult;
use crate::api::models::LibraryResponse;
use crate::api::server::AppState;
use crate::library::query::{self, LibraryParams, LibraryQuery};

/// `GET /get_library` — handle-based entry point.
pub async fn get_library(
    State(state): State<AppState>,
    Query(params): Query<LibraryParams>,
) -> ApiResult<Json<LibraryResponse>> {
    let username = query::validate_handle(params.username.as_deref())?;
    let library_query = LibraryQuery::from_params(&params)?;

    let steam_id = state.library.resolve_identifier(username).await?;
    let page = state.library.fetch_page(&steam_id, &library_query).await?;
    Ok(Json(page.into()))
}

/// `GET /get_library_by_id` — numeric-id entry point.
pub async fn get_library_by_id(
    State(state): State<AppState>,
    Query(params): Query<LibraryParams>,
) -> ApiResult<Json<LibraryResponse>> {
    let steam_id = query::validate_steam_id(params.steamid.as_deref())?;
    let library_query = LibraryQuery::from_params(&params)?;

    // Courtesy pause before hitting the rate-limited owned-games endpoint.
    if !state.id_fetch_delay.is_zero() {
        tokio::time::sleep(state.id_fetch_delay).await;
    }

    let page = state.library.fetch_page(steam_id, &library_query).await?;
    Ok(Json(page.into()))
}
