//! sm-core: Social Gateway Core Library
//!
//! Shared building blocks for the platform crates: configuration, the
//! normalized response schemas, the field lookup table used by the
//! normalizers, timestamp handling, request pacing and session state.

pub mod config;
pub mod error;
pub mod models;
pub mod pacing;
pub mod probe;
pub mod session;
pub mod timestamp;

pub use config::{Config, InstagramConfig, PacingConfig, ServerConfig, TikTokConfig};
pub use error::{Error, Result};
pub use pacing::Pacer;
pub use session::{SessionError, SessionErrorKind, SessionState, SessionStatus};
