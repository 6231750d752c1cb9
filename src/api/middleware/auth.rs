//! HTTP Basic authentication middleware.
//!
//! Credential storage and verification live behind the injected
//! [`CredentialVerifier`]; this middleware only parses the header and
//! rejects unauthenticated requests.

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;

use crate::credentials::CredentialVerifier;

/// The authenticated principal, injected into request extensions for
/// downstream handlers.
#[derive(Debug, Clone)]
pub struct Principal(pub String);

/// Parse `Authorization: Basic <base64(user:pass)>` into its parts.
fn parse_basic_header(request: &Request) -> Option<(String, String)> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn unauthorized() -> Response {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::WWW_AUTHENTICATE, "Basic realm=\"steam-library-proxy\"")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"error":"Authentication required"}"#))
        .unwrap_or_else(|_| StatusCode::UNAUTHORIZED.into_response())
}

/// Basic authentication middleware.
///
/// Verifies the supplied credentials against the injected verifier and
/// injects the [`Principal`] into request extensions.
pub async fn basic_auth(
    verifier: Arc<dyn CredentialVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some((username, password)) = parse_basic_header(&request) else {
        tracing::warn!("Missing or malformed Authorization header");
        return unauthorized();
    };

    match verifier.verify(&username, &password).await {
        Some(principal) => {
            request.extensions_mut().insert(Principal(principal));
            next.run(request).await
        }
        None => {
            tracing::warn!(username, "Rejected credentials");
            unauthorized()
        }
    }
}
