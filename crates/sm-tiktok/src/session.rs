//! TikTok session lifecycle
//!
//! A single session is created lazily on first demand and cached for the
//! lifetime of the process.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use sm_core::{Pacer, SessionError, SessionErrorKind, SessionState, SessionStatus};

use crate::api::{SessionOptions, TikTokBackend, TikTokClient};
use crate::error::TikTokError;
use crate::fingerprint::Fingerprint;

/// Lazily creates and caches the shared TikTok session
pub struct TikTokSessionManager {
    backend: Arc<dyn TikTokBackend>,
    ms_token: Option<String>,
    pacer: Arc<Pacer>,
    state: RwLock<SessionState<dyn TikTokClient>>,
    /// Serializes initialization so concurrent first requests log in once
    init_lock: Mutex<()>,
}

impl TikTokSessionManager {
    pub fn new(backend: Arc<dyn TikTokBackend>, ms_token: Option<String>, pacer: Arc<Pacer>) -> Self {
        Self {
            backend,
            ms_token: ms_token.filter(|t| !t.is_empty()),
            pacer,
            state: RwLock::new(SessionState::default()),
            init_lock: Mutex::new(()),
        }
    }

    pub fn token_configured(&self) -> bool {
        self.ms_token.is_some()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status()
    }

    async fn ready_client(&self) -> Option<Arc<dyn TikTokClient>> {
        let state = self.state.read().await;
        if state.initialized {
            state.client.clone()
        } else {
            None
        }
    }

    /// Return the live session, creating it if needed
    pub async fn ensure_session(&self) -> Result<Arc<dyn TikTokClient>, SessionError> {
        if let Some(client) = self.ready_client().await {
            return Ok(client);
        }

        let _guard = self.init_lock.lock().await;

        // Another request may have finished initialization while we waited
        if let Some(client) = self.ready_client().await {
            return Ok(client);
        }

        let Some(ms_token) = self.ms_token.clone() else {
            self.state.write().await.failed("MS_TOKEN not configured");
            return Err(SessionError::new(
                SessionErrorKind::NotConfigured,
                "TikTok MS_TOKEN not configured. Please set it in .env file.",
            ));
        };

        let anti_detection = self.pacer.is_enabled();
        let (fingerprint, sleep_after) = if anti_detection {
            let secs = rand::rng().random_range(3..=5);
            (Fingerprint::random(), Duration::from_secs(secs))
        } else {
            (Fingerprint::fixed(), Duration::from_secs(3))
        };

        self.pacer.jitter(1.0..=3.0).await;

        let options = SessionOptions {
            ms_token,
            fingerprint,
            sleep_after,
        };

        match self.backend.create_session(options).await {
            Ok(client) => {
                self.state.write().await.ready(Arc::clone(&client));
                info!(
                    "TikTok API session created successfully (anti-detection: {})",
                    anti_detection
                );
                Ok(client)
            }
            Err(e) => {
                warn!("TikTok session creation failed: {}", e);
                self.state.write().await.failed(e.to_string());
                Err(classify(&e))
            }
        }
    }
}

/// Turn a session creation failure into actionable guidance
fn classify(err: &TikTokError) -> SessionError {
    let message = err.to_string();

    if err.is_timeout() || message.contains("Timeout") {
        return SessionError::new(
            SessionErrorKind::Timeout,
            format!(
                "TikTok connection timed out. Possible causes:\n\
                 1. Your MS_TOKEN may be expired - get a fresh one from browser cookies\n\
                 2. TikTok may be blocking your IP - try using a VPN or proxy\n\
                 3. Network issues - check your internet connection\n\
                 Original error: {}",
                message
            ),
        );
    }

    if matches!(err, TikTokError::InvalidToken(_) | TikTokError::EmptyResponse)
        || message.to_lowercase().contains("ms_token")
    {
        return SessionError::new(
            SessionErrorKind::InvalidToken,
            "Invalid MS_TOKEN. Please get a fresh msToken from TikTok cookies in your browser.",
        );
    }

    SessionError::new(
        SessionErrorKind::LoginFailed,
        format!("Failed to create TikTok session: {}", message),
    )
}
