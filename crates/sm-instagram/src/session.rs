//! Instagram session lifecycle
//!
//! Login is attempted in three tiers, most reliable first:
//!
//! 1. `sessionid` cookie from the configuration
//! 2. settings persisted by a previous login, validated with `account_info`
//! 3. username and password
//!
//! Every successful login overwrites the session file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use url::Url;

use sm_core::{
    InstagramConfig, Pacer, SessionError, SessionErrorKind, SessionState, SessionStatus,
};

use crate::client::{InstagramClient, InstagramClientFactory};
use crate::device::DeviceProfile;
use crate::error::{InstagramError, Result};

/// Lazily logs in and caches the shared Instagram client
pub struct InstagramSessionManager {
    factory: Arc<dyn InstagramClientFactory>,
    config: InstagramConfig,
    pacer: Arc<Pacer>,
    state: RwLock<SessionState<dyn InstagramClient>>,
    init_lock: Mutex<()>,
}

impl InstagramSessionManager {
    pub fn new(
        factory: Arc<dyn InstagramClientFactory>,
        config: InstagramConfig,
        pacer: Arc<Pacer>,
    ) -> Self {
        Self {
            factory,
            config,
            pacer,
            state: RwLock::new(SessionState::default()),
            init_lock: Mutex::new(()),
        }
    }

    /// A session id or a username/password pair is present
    pub fn credentials_configured(&self) -> bool {
        self.config.has_session_id() || self.config.has_credentials()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status()
    }

    async fn ready_client(&self) -> Option<Arc<dyn InstagramClient>> {
        let state = self.state.read().await;
        if state.initialized {
            state.client.clone()
        } else {
            None
        }
    }

    /// Return the logged-in client, logging in if needed
    pub async fn ensure_session(&self) -> std::result::Result<Arc<dyn InstagramClient>, SessionError> {
        if let Some(client) = self.ready_client().await {
            return Ok(client);
        }

        let _guard = self.init_lock.lock().await;

        if let Some(client) = self.ready_client().await {
            return Ok(client);
        }

        if !self.credentials_configured() {
            self.state.write().await.failed("Instagram credentials not configured");
            return Err(SessionError::new(
                SessionErrorKind::NotConfigured,
                "Instagram credentials not configured. Please set INSTAGRAM_SESSION_ID or \
                 (INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD) in .env file.",
            ));
        }

        match self.login().await {
            Ok(client) => {
                self.state.write().await.ready(Arc::clone(&client));
                Ok(client)
            }
            Err(e) => {
                let (error, recorded) = classify(&e);
                warn!("Instagram login failed: {}", e);
                self.state.write().await.failed(recorded);
                Err(error)
            }
        }
    }

    fn anti_detection(&self) -> bool {
        self.pacer.is_enabled()
    }

    /// Fresh client with proxy and device applied
    fn new_client(&self) -> Result<Box<dyn InstagramClient>> {
        let mut client = self.factory.create()?;

        if let Some(proxy) = self.config.proxy.as_deref().filter(|p| !p.is_empty()) {
            client.set_proxy(proxy)?;
            info!("Instagram proxy configured: {}", proxy_label(proxy));
        }

        if self.anti_detection() {
            client.set_device(&DeviceProfile::random());
        }

        Ok(client)
    }

    async fn login(&self) -> Result<Arc<dyn InstagramClient>> {
        let mut client = self.new_client()?;
        let session_path = PathBuf::from(&self.config.session_file);

        self.pacer.jitter(1.0..=2.0).await;

        if let Some(session_id) = self.config.session_id.as_deref().filter(|s| !s.is_empty()) {
            match client.login_by_sessionid(session_id).await {
                Ok(()) => {
                    persist(client.as_ref(), &session_path);
                    info!(
                        "Instagram login successful via session ID (anti-detection: {})",
                        self.anti_detection()
                    );
                    return Ok(Arc::from(client));
                }
                Err(e) => warn!("Session ID login failed: {}, trying other methods...", e),
            }
        }

        if session_path.exists() {
            match self.restore(client.as_mut(), &session_path).await {
                Ok(()) => {
                    info!("Instagram session loaded from {}", session_path.display());
                    return Ok(Arc::from(client));
                }
                Err(e) => {
                    warn!("Saved session expired ({}), trying fresh login...", e);
                    client = self.new_client()?;
                }
            }
        }

        let credentials = self
            .config
            .username
            .as_deref()
            .zip(self.config.password.as_deref())
            .filter(|_| self.config.has_credentials());

        if let Some((username, password)) = credentials {
            self.pacer.pace().await;
            client.login(username, password).await?;
            persist(client.as_ref(), &session_path);
            info!("Instagram login successful, session saved");
            return Ok(Arc::from(client));
        }

        Err(InstagramError::NoLoginMethod)
    }

    async fn restore(&self, client: &mut dyn InstagramClient, path: &Path) -> Result<()> {
        client.load_settings(path)?;
        if self.anti_detection() {
            client.set_device(&DeviceProfile::random());
        }
        self.pacer.pace().await;
        client.account_info().await?;
        Ok(())
    }
}

/// Persist settings; a write failure does not invalidate the live session
fn persist(client: &dyn InstagramClient, path: &Path) {
    if let Err(e) = client.dump_settings(path) {
        warn!("Failed to save Instagram session to {}: {}", path.display(), e);
    }
}

/// Host (and port) of a proxy URL, keeping credentials out of the logs
pub fn proxy_label(proxy: &str) -> String {
    Url::parse(proxy)
        .ok()
        .and_then(|url| {
            let host = url.host_str()?.to_string();
            Some(match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            })
        })
        .unwrap_or_else(|| "proxy enabled".to_string())
}

/// (caller-facing error, message recorded for the health report)
fn classify(err: &InstagramError) -> (SessionError, String) {
    match err {
        InstagramError::TwoFactorRequired => (
            SessionError::new(
                SessionErrorKind::TwoFactorRequired,
                "Instagram 2FA required. Please disable 2FA or use session ID login.",
            ),
            "Two-factor authentication required".to_string(),
        ),
        InstagramError::ChallengeRequired => (
            SessionError::new(
                SessionErrorKind::ChallengeRequired,
                "Instagram challenge required. Please use session ID login instead.",
            ),
            "Challenge required (suspicious login detected)".to_string(),
        ),
        InstagramError::PleaseWaitFewMinutes(_) => (
            SessionError::new(
                SessionErrorKind::RateLimited,
                "Instagram rate limited. Please wait a few minutes.",
            ),
            "Rate limited - please wait".to_string(),
        ),
        other => (
            SessionError::new(
                SessionErrorKind::LoginFailed,
                format!("Failed to login to Instagram: {}", other),
            ),
            other.to_string(),
        ),
    }
}
