//! API error handling.
//!
//! Maps domain errors to HTTP statuses and the `{"error": "..."}` body the
//! API promises.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::Error;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// API error type that can be converted to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation(_) | Error::ProfilesUrlUnsupported | Error::InvalidSteamId => {
                StatusCode::BAD_REQUEST
            }
            Error::PrivateProfile => StatusCode::FORBIDDEN,
            Error::VanityNotFound | Error::NoGamesFound | Error::NoAchievements => {
                StatusCode::NOT_FOUND
            }
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::Upstream(_) => {
                tracing::error!("Upstream error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => {
                tracing::error!("Unexpected error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, err.to_string())
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
