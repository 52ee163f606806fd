//! Authentication middleware
//!
//! Protected routes require the shared secret in the `X-API-Key` header.
//! When no secret is configured every request is let through.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::server::AppState;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// API key authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A header that is not valid UTF-8 can never match and counts as a wrong key
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.to_str().unwrap_or("\u{fffd}"));

    validate_api_key(provided, state.api_key.as_deref())?;
    Ok(next.run(request).await)
}

/// Compare the provided key with the configured one
pub fn validate_api_key(provided: Option<&str>, expected: Option<&str>) -> Result<(), ApiError> {
    match (provided, expected) {
        (_, None) => Ok(()),
        (None | Some(""), Some(_)) => Err(ApiError::MissingApiKey),
        (Some(p), Some(e)) if p == e => Ok(()),
        (Some(_), Some(_)) => Err(ApiError::InvalidApiKey),
    }
}
