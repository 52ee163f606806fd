//! Error types for sm-tiktok

use thiserror::Error;

/// sm-tiktok error type
#[derive(Error, Debug)]
pub enum TikTokError {
    #[error("TikTok MS_TOKEN not set")]
    TokenNotSet,

    #[error("Timeout while creating TikTok session: {0}")]
    Timeout(String),

    #[error("TikTok rejected the ms_token: {0}")]
    InvalidToken(String),

    #[error("TikTok returned an empty response, the ms_token may be invalid or the request was flagged as automated")]
    EmptyResponse,

    #[error("TikTok API error: {0}")]
    Api(String),

    #[error("Could not extract video ID from URL: {0}")]
    InvalidUrl(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TikTokError {
    /// Whether the failure came from a transport or upstream timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            TikTokError::Timeout(_) => true,
            TikTokError::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TikTokError>;
