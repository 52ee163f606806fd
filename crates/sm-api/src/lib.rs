//! sm-api: REST facade for Social Gateway
//!
//! Exposes the TikTok and Instagram services as JSON endpoints.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{app, start_server, AppState};
