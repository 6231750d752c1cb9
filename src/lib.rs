//! steam-library-proxy library crate.
//!
//! This module exposes the service's components for integration testing.

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod library;
pub mod steam;

pub use error::{Error, Result};
