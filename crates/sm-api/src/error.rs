//! Error types for sm-api
//!
//! Every failure leaves the API as `{"detail": "..."}` with a status code
//! chosen by [`ApiError::status`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use sm_core::SessionErrorKind;

/// sm-api error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing API key. Please provide X-API-Key header.")]
    MissingApiKey,

    #[error("Invalid API key.")]
    InvalidApiKey,

    /// Query or body failed validation
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Core(#[from] sm_core::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingApiKey => StatusCode::UNAUTHORIZED,
            ApiError::InvalidApiKey => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(sm_core::Error::Session(e)) => match e.kind {
                SessionErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Core(sm_core::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;
