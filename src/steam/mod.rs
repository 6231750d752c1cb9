//! Steam Web API integration.
//!
//! [`client::SteamApi`] is the capability the rest of the service depends
//! on; [`client::SteamClient`] is the reqwest-backed implementation.

pub mod client;
pub mod models;

pub use client::{SteamApi, SteamClient};
pub use models::{AppDetails, OwnedGame};
