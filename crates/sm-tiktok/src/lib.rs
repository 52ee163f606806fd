//! sm-tiktok: TikTok platform support
//!
//! Session management, the web client, URL parsing and the normalizers that
//! turn TikTok payloads into the schemas from `sm_core::models`.

pub mod api;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod service;
pub mod session;
pub mod url;

#[cfg(test)]
mod test_support;

pub use api::{SessionOptions, TikTokBackend, TikTokClient, TikTokWebBackend};
pub use error::{Result, TikTokError};
pub use fingerprint::Fingerprint;
pub use service::TikTokService;
pub use session::TikTokSessionManager;
