//! TikTok web client
//!
//! [`TikTokBackend`] creates sessions and [`TikTokClient`] is a live session.
//! Both are traits so the session manager and the HTTP layer can be driven
//! by test doubles; [`TikTokWebBackend`] is the reqwest implementation that
//! talks to the TikTok web endpoints with an `msToken` cookie.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use sm_core::probe;
use sm_core::TikTokConfig;

use crate::error::{Result, TikTokError};
use crate::fingerprint::Fingerprint;
use crate::url::video_id_from_resolved;

/// Sent when the fingerprint does not pin a user agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Web app id expected by the TikTok web API
const WEB_AID: &str = "1988";

/// Items requested per page when paginating
const PAGE_SIZE: usize = 20;

/// Parameters for creating one session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub ms_token: String,
    pub fingerprint: Fingerprint,
    /// Pause after the session is created, before it is handed out
    pub sleep_after: Duration,
}

/// Creates authenticated TikTok sessions
#[async_trait]
pub trait TikTokBackend: Send + Sync {
    async fn create_session(&self, options: SessionOptions) -> Result<Arc<dyn TikTokClient>>;
}

/// A live TikTok session; every method returns raw upstream JSON
#[async_trait]
pub trait TikTokClient: Send + Sync {
    /// Video item dictionary (`itemStruct`)
    async fn video_info(&self, video_id: &str) -> Result<Value>;

    /// Follow a short link and return the numeric video id it points at
    async fn resolve_short_link(&self, url: &str) -> Result<String>;

    /// Up to `count` comment dictionaries
    async fn video_comments(&self, video_id: &str, count: usize) -> Result<Vec<Value>>;

    /// User detail payload (usually `{"userInfo": {"user", "stats"}}`)
    async fn user_info(&self, username: &str) -> Result<Value>;

    /// Up to `count` of the user's most recent video dictionaries
    async fn user_videos(&self, username: &str, count: usize) -> Result<Vec<Value>>;
}

/// reqwest-backed session factory
#[derive(Debug, Clone)]
pub struct TikTokWebBackend {
    base_url: String,
    proxy: Option<String>,
    timeout: Duration,
}

impl TikTokWebBackend {
    pub fn new(base_url: impl Into<String>, proxy: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            proxy,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &TikTokConfig) -> Self {
        Self::new(config.base_url.clone(), config.proxy.clone())
    }

    /// Override the per-request timeout (default 30s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TikTokBackend for TikTokWebBackend {
    async fn create_session(&self, options: SessionOptions) -> Result<Arc<dyn TikTokClient>> {
        let client = TikTokWebClient::connect(self, options).await?;
        Ok(Arc::new(client))
    }
}

/// Live web session
pub struct TikTokWebClient {
    http: Client,
    base_url: String,
    ms_token: String,
    fingerprint: Fingerprint,
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| TikTokError::Api(format!("Invalid header value: {}", e)))
}

impl TikTokWebClient {
    async fn connect(backend: &TikTokWebBackend, options: SessionOptions) -> Result<Self> {
        if options.ms_token.is_empty() {
            return Err(TikTokError::TokenNotSet);
        }

        let fingerprint = options.fingerprint;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, header_value(&fingerprint.accept_language())?);
        headers.insert(REFERER, header_value(&format!("{}/", backend.base_url))?);
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("msToken={}", options.ms_token))
                .map_err(|_| TikTokError::InvalidToken("ms_token contains invalid characters".to_string()))?,
        );

        let user_agent = fingerprint
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .timeout(backend.timeout);

        if let Some(proxy) = &backend.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        let http = builder.build()?;

        // Warm-up request establishes cookies and surfaces token/network problems early
        let response = http
            .get(format!("{}/", backend.base_url))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TikTokError::Timeout(e.to_string())
                } else {
                    TikTokError::Request(e)
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(TikTokError::InvalidToken(format!(
                "ms_token rejected with status {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(TikTokError::Api(format!("Session warm-up failed: {}", status)));
        }

        info!(
            "TikTok web session ready ({}x{})",
            fingerprint.viewport.width, fingerprint.viewport.height
        );

        if !options.sleep_after.is_zero() {
            tokio::time::sleep(options.sleep_after).await;
        }

        Ok(Self {
            http,
            base_url: backend.base_url.clone(),
            ms_token: options.ms_token,
            fingerprint,
        })
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("aid", WEB_AID.to_string()),
            ("app_name", "tiktok_web".to_string()),
            ("device_platform", "web_pc".to_string()),
            ("browser_language", self.fingerprint.locale.clone()),
            ("tz_name", self.fingerprint.timezone_id.clone()),
            ("screen_width", self.fingerprint.viewport.width.to_string()),
            ("screen_height", self.fingerprint.viewport.height.to_string()),
            ("msToken", self.ms_token.clone()),
        ]
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http
            .get(&url)
            .query(&self.common_params())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!("TikTok API response: {} - {} bytes", status, body.len());

        if !status.is_success() {
            error!("TikTok API error: {} - {}", status, body);
            return Err(TikTokError::Api(format!("Status: {}, Body: {}", status, body)));
        }

        if body.trim().is_empty() {
            return Err(TikTokError::EmptyResponse);
        }

        let json: Value = serde_json::from_str(&body)?;

        if let Some(code) = json.get("statusCode").and_then(Value::as_i64) {
            if code != 0 {
                let message = probe::first_str(&json, &["statusMsg", "status_msg"]);
                return Err(TikTokError::Api(format!("statusCode {}: {}", code, message)));
            }
        }

        Ok(json)
    }

    /// Collect up to `count` items from a cursor-paginated endpoint
    async fn paginate(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        list_key: &str,
        has_more_keys: &[&str],
        count: usize,
    ) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut cursor = "0".to_string();

        while items.len() < count {
            let mut page_params = params.to_vec();
            page_params.push(("count", PAGE_SIZE.to_string()));
            page_params.push(("cursor", cursor.clone()));

            let page = self.get_json(endpoint, &page_params).await?;
            let batch = match page.get(list_key).and_then(Value::as_array) {
                Some(batch) if !batch.is_empty() => batch,
                _ => break,
            };

            let remaining = count - items.len();
            items.extend(batch.iter().take(remaining).cloned());

            let has_more = probe::first(&page, has_more_keys).is_some();
            match page.get("cursor").and_then(probe::id_string) {
                Some(next) if has_more && next != cursor => cursor = next,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl TikTokClient for TikTokWebClient {
    async fn video_info(&self, video_id: &str) -> Result<Value> {
        info!("Fetching TikTok video: {}", video_id);

        let json = self
            .get_json("/api/item/detail/", &[("itemId", video_id.to_string())])
            .await?;

        probe::path(&json, &["itemInfo", "itemStruct"])
            .filter(|item| item.is_object())
            .cloned()
            .ok_or_else(|| TikTokError::Api(format!("Video {} not found", video_id)))
    }

    async fn resolve_short_link(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let resolved = response.url().to_string();

        debug!("Resolved {} -> {}", url, resolved);

        video_id_from_resolved(&resolved).ok_or(TikTokError::InvalidUrl(resolved))
    }

    async fn video_comments(&self, video_id: &str, count: usize) -> Result<Vec<Value>> {
        self.paginate(
            "/api/comment/list/",
            &[("aweme_id", video_id.to_string())],
            "comments",
            &["has_more", "hasMore"],
            count,
        )
        .await
    }

    async fn user_info(&self, username: &str) -> Result<Value> {
        info!("Fetching TikTok user: {}", username);

        let json = self
            .get_json("/api/user/detail/", &[("uniqueId", username.to_string())])
            .await?;

        if probe::path(&json, &["userInfo", "user"]).is_none() {
            return Err(TikTokError::Api(format!("User {} not found", username)));
        }

        Ok(json)
    }

    async fn user_videos(&self, username: &str, count: usize) -> Result<Vec<Value>> {
        let info = self.user_info(username).await?;
        let sec_uid = probe::path(&info, &["userInfo", "user"])
            .and_then(|user| probe::first_opt_str(user, &["secUid", "sec_uid"]))
            .ok_or_else(|| TikTokError::Api(format!("No secUid for user {}", username)))?;

        self.paginate(
            "/api/post/item_list/",
            &[("secUid", sec_uid)],
            "itemList",
            &["hasMore", "has_more"],
            count,
        )
        .await
    }
}
