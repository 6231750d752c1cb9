//! API route modules.

pub mod achievements;
pub mod health;
pub mod library;

use axum::{Router, middleware, routing::get};
use tower_http::services::{ServeDir, ServeFile};

use crate::api::middleware::{AdmissionControl, Quota, admission_middleware, basic_auth};
use crate::api::server::AppState;

/// Default admission limit applied to every authenticated route.
const DEFAULT_QUOTA: Quota = Quota::per_hour(50);
/// Stricter limit on the Steam-proxy routes.
const PROXY_QUOTA: Quota = Quota::per_minute(5);
/// Limit on the static index.
const INDEX_QUOTA: Quota = Quota::per_minute(10);

/// Create the main router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let proxy = Router::new()
        .route("/get_library", get(library::get_library))
        .route("/get_library_by_id", get(library::get_library_by_id))
        .route("/get_achievements", get(achievements::get_achievements))
        .layer(middleware::from_fn_with_state(
            AdmissionControl::new(state.rate_limiter.clone(), "route", PROXY_QUOTA),
            admission_middleware,
        ));

    let ui = Router::new()
        .route_service("/", ServeFile::new(state.static_dir.join("index.html")))
        .fallback_service(ServeDir::new(state.static_dir.clone()))
        .layer(middleware::from_fn_with_state(
            AdmissionControl::new(state.rate_limiter.clone(), "route", INDEX_QUOTA),
            admission_middleware,
        ));

    let credentials = state.credentials.clone();
    Router::new()
        .merge(proxy)
        .merge(ui)
        .layer(middleware::from_fn(move |request, next| {
            basic_auth(credentials.clone(), request, next)
        }))
        .layer(middleware::from_fn_with_state(
            AdmissionControl::new(state.rate_limiter.clone(), "default", DEFAULT_QUOTA),
            admission_middleware,
        ))
        .route("/health", get(health::health_check))
        .with_state(state)
}
