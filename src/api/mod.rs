//! HTTP API layer: server, routes, middleware, and error mapping.

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{ApiServer, ApiServerConfig, AppState};
