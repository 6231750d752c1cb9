//! API middleware.

pub mod auth;
pub mod rate_limit;

pub use auth::basic_auth;
pub use rate_limit::{AdmissionControl, Quota, RateLimiter, admission_middleware};
