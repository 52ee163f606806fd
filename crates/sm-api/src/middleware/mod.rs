//! Middleware modules
//!
//! Contains the API key authentication middleware.

pub mod auth;
