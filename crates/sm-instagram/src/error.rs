//! Error types for sm-instagram

use thiserror::Error;

/// sm-instagram error type
#[derive(Error, Debug)]
pub enum InstagramError {
    #[error("Two-factor authentication required")]
    TwoFactorRequired,

    #[error("Challenge required (suspicious login detected)")]
    ChallengeRequired,

    #[error("Please wait a few minutes before you try again: {0}")]
    PleaseWaitFewMinutes(String),

    #[error("Login required")]
    LoginRequired,

    #[error("Bad password: {0}")]
    BadPassword(String),

    #[error("No valid login method available")]
    NoLoginMethod,

    #[error("Instagram API error: {0}")]
    Api(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid Instagram URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid shortcode: {0}")]
    InvalidShortcode(String),

    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, InstagramError>;
