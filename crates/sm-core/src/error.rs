//! Error types for sm-core

use thiserror::Error;

use crate::session::SessionError;

/// Main error type shared by the platform crates
#[derive(Error, Debug)]
pub enum Error {
    /// Session could not be established (classified)
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Malformed identifier or source URL supplied by the caller
    #[error("{0}")]
    InvalidInput(String),

    /// Any other failure from an upstream client, message kept verbatim
    #[error("{0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an upstream failure with the endpoint context,
    /// e.g. `Error fetching TikTok video: <message>`
    pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
        Error::Upstream(format!("{}: {}", context, err))
    }
}

/// Result type alias for sm-core
pub type Result<T> = std::result::Result<T, Error>;
