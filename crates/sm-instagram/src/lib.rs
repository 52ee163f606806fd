//! sm-instagram: Instagram platform support
//!
//! A private mobile API client, the session manager with its tiered login,
//! shortcode handling and the normalizers producing `sm_core::models`.

pub mod client;
pub mod device;
pub mod error;
pub mod normalize;
pub mod service;
pub mod session;
pub mod shortcode;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{InstagramClient, InstagramClientFactory, PrivateApiClient, PrivateApiFactory, Settings};
pub use device::DeviceProfile;
pub use error::{InstagramError, Result};
pub use service::InstagramService;
pub use session::InstagramSessionManager;
