//! Session state shared by the platform session managers
//!
//! Each platform keeps one `SessionState` for the lifetime of the process.
//! Login failures are reported as a typed [`SessionError`] so the HTTP layer
//! can map them without inspecting messages.

use serde::Serialize;
use thiserror::Error;

/// Classification of a failed session initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    /// Required credentials or tokens are absent
    NotConfigured,
    /// Upstream asked for a second factor
    TwoFactorRequired,
    /// Upstream flagged the login as suspicious
    ChallengeRequired,
    /// Upstream asked us to slow down
    RateLimited,
    /// Session creation timed out
    Timeout,
    /// The configured token was rejected
    InvalidToken,
    /// Anything else
    LoginFailed,
}

/// A failed `ensure_session` call
#[derive(Error, Debug, Clone)]
#[error("{detail}")]
pub struct SessionError {
    pub kind: SessionErrorKind,
    /// Caller-facing message with corrective guidance
    pub detail: String,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Snapshot reported by the health endpoint
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SessionStatus {
    pub session_initialized: bool,
    pub session_error: Option<String>,
}

/// Per-platform session slot
#[derive(Debug)]
pub struct SessionState<C: ?Sized> {
    pub client: Option<std::sync::Arc<C>>,
    pub initialized: bool,
    pub error: Option<String>,
}

impl<C: ?Sized> Default for SessionState<C> {
    fn default() -> Self {
        Self {
            client: None,
            initialized: false,
            error: None,
        }
    }
}

impl<C: ?Sized> SessionState<C> {
    /// Record a successful login
    pub fn ready(&mut self, client: std::sync::Arc<C>) {
        self.client = Some(client);
        self.initialized = true;
        self.error = None;
    }

    /// Record a failed login, keeping the message for health reports
    pub fn failed(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_initialized: self.initialized,
            session_error: self.error.clone(),
        }
    }
}
