//! Instagram mobile private API client
//!
//! [`InstagramClient`] is the seam used by the session manager and the
//! service. [`PrivateApiClient`] implements it over reqwest, emulating the
//! Android app: device headers, a cookie jar persisted as a JSON settings
//! file, and error classification from the response body.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, HeaderMap, SET_COOKIE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use sm_core::probe::{self, first_str, id_string, path};
use sm_core::InstagramConfig;

use crate::device::DeviceProfile;
use crate::error::{InstagramError, Result};
use crate::shortcode;
use crate::types::{IgComment, IgMedia, IgStory, IgUser, IgUserShort};

/// Application id sent by the Android app
pub const IG_APP_ID: &str = "567067343352427";

const IG_CAPABILITIES: &str = "3brTv10=";

/// Page size requested from list endpoints
const PAGE_SIZE: usize = 50;

/// Instagram client operations used by the gateway
///
/// Setup methods take `&mut self`; once logged in the client is shared
/// read-only.
#[async_trait]
pub trait InstagramClient: Send + Sync {
    fn set_proxy(&mut self, proxy: &str) -> Result<()>;

    /// Apply a device profile and its matching user agent
    fn set_device(&mut self, device: &DeviceProfile);

    async fn login_by_sessionid(&mut self, session_id: &str) -> Result<()>;

    async fn login(&mut self, username: &str, password: &str) -> Result<()>;

    fn load_settings(&mut self, path: &Path) -> Result<()>;

    fn dump_settings(&self, path: &Path) -> Result<()>;

    /// Cheap authenticated call used to validate a restored session
    async fn account_info(&self) -> Result<IgUser>;

    async fn user_info_by_username_v1(&self, username: &str) -> Result<IgUser>;

    async fn user_id_from_username(&self, username: &str) -> Result<String>;

    async fn user_medias(&self, user_id: &str, amount: usize) -> Result<Vec<IgMedia>>;

    async fn user_stories(&self, user_id: &str) -> Result<Vec<IgStory>>;

    async fn user_followers(&self, user_id: &str, amount: usize) -> Result<Vec<IgUserShort>>;

    async fn user_following(&self, user_id: &str, amount: usize) -> Result<Vec<IgUserShort>>;

    async fn media_pk_from_code(&self, code: &str) -> Result<String>;

    async fn media_pk_from_url(&self, url: &str) -> Result<String>;

    async fn media_info(&self, media_pk: &str) -> Result<IgMedia>;

    /// One page of comments starting after `min_id`, plus the cursor of the next page
    async fn media_comments_chunk(
        &self,
        media_pk: &str,
        max_amount: usize,
        min_id: Option<&str>,
    ) -> Result<(Vec<IgComment>, Option<String>)>;

    async fn media_likers(&self, media_pk: &str) -> Result<Vec<IgUserShort>>;

    async fn hashtag_medias_top(&self, name: &str, amount: usize) -> Result<Vec<IgMedia>>;

    /// Raw GET against the private API, returning the decoded body
    async fn private_request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value>;
}

/// Produces fresh, logged-out clients
pub trait InstagramClientFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn InstagramClient>>;
}

// ============================================================================
// Persisted settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uuids {
    pub phone_id: String,
    pub uuid: String,
    pub client_session_id: String,
    pub advertising_id: String,
    pub android_device_id: String,
}

impl Uuids {
    fn generate() -> Self {
        let device_seed = Uuid::new_v4().simple().to_string();
        Self {
            phone_id: Uuid::new_v4().to_string(),
            uuid: Uuid::new_v4().to_string(),
            client_session_id: Uuid::new_v4().to_string(),
            advertising_id: Uuid::new_v4().to_string(),
            android_device_id: format!("android-{}", &device_seed[..16]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationData {
    pub ds_user_id: Option<String>,
    pub sessionid: Option<String>,
}

/// Everything needed to resume a session, written to the session file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub uuids: Uuids,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default)]
    pub authorization_data: AuthorizationData,
    pub device_settings: DeviceProfile,
    pub user_agent: String,
    #[serde(default)]
    pub last_login: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        let device = DeviceProfile::default_profile();
        Self {
            uuids: Uuids::generate(),
            cookies: BTreeMap::new(),
            authorization_data: AuthorizationData::default(),
            user_agent: device.user_agent(),
            device_settings: device,
            last_login: None,
        }
    }
}

// ============================================================================
// reqwest implementation
// ============================================================================

/// Builds [`PrivateApiClient`]s against one base URL
#[derive(Debug, Clone)]
pub struct PrivateApiFactory {
    base_url: String,
    timeout: Duration,
}

impl PrivateApiFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &InstagramConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl InstagramClientFactory for PrivateApiFactory {
    fn create(&self) -> Result<Box<dyn InstagramClient>> {
        let client = PrivateApiClient::new(self.base_url.clone(), self.timeout)?;
        Ok(Box::new(client))
    }
}

pub struct PrivateApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    settings: Settings,
}

impl PrivateApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http(timeout, None)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            settings: Settings::default(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn cookie_header(&self) -> Option<String> {
        if self.settings.cookies.is_empty() {
            return None;
        }
        Some(
            self.settings
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut builder = self
            .http
            .request(method, url)
            .header(USER_AGENT, &self.settings.user_agent)
            .header(ACCEPT_LANGUAGE, "en-US")
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-IG-Capabilities", IG_CAPABILITIES)
            .header("X-IG-Device-ID", &self.settings.uuids.uuid)
            .header("X-IG-Android-ID", &self.settings.uuids.android_device_id);

        if let Some(cookies) = self.cookie_header() {
            builder = builder.header(COOKIE, cookies);
        }
        builder
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = self.request(Method::GET, endpoint).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("Instagram API response: {} {} - {} bytes", endpoint, status, body.len());

        decode(status, &body)
    }

    /// Drop the session cookies and the authorization data derived from them
    fn clear_auth(&mut self) {
        self.settings.cookies.remove("sessionid");
        self.settings.cookies.remove("ds_user_id");
        self.settings.authorization_data = AuthorizationData::default();
    }

    fn store_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let Some((name, value)) = raw.split(';').next().and_then(|pair| pair.split_once('=')) else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if value.is_empty() || value == "\"\"" {
                self.settings.cookies.remove(name);
            } else {
                self.settings.cookies.insert(name.to_string(), value.to_string());
            }
        }

        if let Some(id) = self.settings.cookies.get("ds_user_id") {
            self.settings.authorization_data.ds_user_id = Some(id.clone());
        }
        if let Some(session) = self.settings.cookies.get("sessionid") {
            self.settings.authorization_data.sessionid = Some(session.clone());
        }
    }

    /// Follow `next_max_id` cursors until `amount` items are collected
    async fn paginate<T, F>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        amount: usize,
        extract: F,
    ) -> Result<Vec<T>>
    where
        F: Fn(&Value) -> Vec<T> + Send + Sync,
        T: Send,
    {
        let mut items = Vec::new();
        let mut max_id: Option<String> = None;

        while items.len() < amount {
            let mut page_params = params.to_vec();
            page_params.push(("count", PAGE_SIZE.min(amount).to_string()));
            if let Some(cursor) = &max_id {
                page_params.push(("max_id", cursor.clone()));
            }

            let page = self.get_json(endpoint, &page_params).await?;
            let batch = extract(&page);
            if batch.is_empty() {
                break;
            }
            items.extend(batch);

            match page.get("next_max_id").and_then(id_string) {
                Some(next) if max_id.as_deref() != Some(next.as_str()) => max_id = Some(next),
                _ => break,
            }
        }

        items.truncate(amount);
        Ok(items)
    }
}

fn build_http(timeout: Duration, proxy: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| InstagramError::InvalidProxy(e.to_string()))?;
        builder = builder.proxy(proxy);
    }
    Ok(builder.build()?)
}

/// Decode a response body, classifying failures
fn decode(status: StatusCode, body: &str) -> Result<Value> {
    let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let failed = json.get("status").and_then(Value::as_str) == Some("fail");
    if !status.is_success() || failed {
        return Err(classify_error(status, &json, body));
    }

    if json.is_null() {
        return Err(InstagramError::Api(format!("Unexpected response body: {}", body)));
    }

    Ok(json)
}

/// Map an error response to the error kinds the session manager cares about
fn classify_error(status: StatusCode, json: &Value, body: &str) -> InstagramError {
    let message = first_str(json, &["message"]);
    let error_type = first_str(json, &["error_type"]);

    if json.get("two_factor_required").and_then(Value::as_bool) == Some(true) {
        return InstagramError::TwoFactorRequired;
    }
    if message == "challenge_required" || error_type == "challenge_required" || json.get("challenge").is_some() {
        return InstagramError::ChallengeRequired;
    }
    if status == StatusCode::TOO_MANY_REQUESTS || message.contains("Please wait a few minutes") {
        return InstagramError::PleaseWaitFewMinutes(message);
    }
    if message == "login_required" {
        return InstagramError::LoginRequired;
    }
    if error_type == "bad_password" {
        return InstagramError::BadPassword(message);
    }
    if status == StatusCode::NOT_FOUND {
        let message = if message.is_empty() { "Not found".to_string() } else { message };
        return InstagramError::NotFound(message);
    }

    error!("Instagram API error: {} - {}", status, body);
    InstagramError::Api(format!("Status: {}, Body: {}", status, body))
}

fn items<T>(value: &Value, key: &str, parse: fn(&Value) -> T) -> Vec<T> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|list| list.iter().map(parse).collect())
        .unwrap_or_default()
}

#[async_trait]
impl InstagramClient for PrivateApiClient {
    fn set_proxy(&mut self, proxy: &str) -> Result<()> {
        self.http = build_http(self.timeout, Some(proxy))?;
        Ok(())
    }

    fn set_device(&mut self, device: &DeviceProfile) {
        self.settings.user_agent = device.user_agent();
        self.settings.device_settings = device.clone();
    }

    async fn login_by_sessionid(&mut self, session_id: &str) -> Result<()> {
        let user_id: String = session_id.chars().take_while(char::is_ascii_digit).collect();
        if user_id.is_empty() {
            return Err(InstagramError::Api("Invalid session id".to_string()));
        }

        self.settings.cookies.insert("sessionid".to_string(), session_id.to_string());
        self.settings.cookies.insert("ds_user_id".to_string(), user_id.clone());
        self.settings.authorization_data = AuthorizationData {
            ds_user_id: Some(user_id),
            sessionid: Some(session_id.to_string()),
        };

        let user = match self.account_info().await {
            Ok(user) => user,
            Err(e) => {
                self.clear_auth();
                return Err(e);
            }
        };
        self.settings.last_login = Some(Utc::now().timestamp());
        info!("Logged in to Instagram as {} via session id", user.username);
        Ok(())
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        // The session cookie must come from this response
        self.clear_auth();

        let timestamp = Utc::now().timestamp();
        let form = [
            ("username", username.to_string()),
            ("enc_password", format!("#PWD_INSTAGRAM:0:{}:{}", timestamp, password)),
            ("phone_id", self.settings.uuids.phone_id.clone()),
            ("guid", self.settings.uuids.uuid.clone()),
            ("device_id", self.settings.uuids.android_device_id.clone()),
            ("adid", self.settings.uuids.advertising_id.clone()),
            ("login_attempt_count", "0".to_string()),
        ];

        let response = self.request(Method::POST, "accounts/login/").form(&form).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        let json = decode(status, &body)?;
        self.store_cookies(&headers);

        if let Some(pk) = path(&json, &["logged_in_user", "pk"]).and_then(id_string) {
            self.settings.authorization_data.ds_user_id = Some(pk);
        }
        if self.settings.authorization_data.sessionid.is_none() {
            return Err(InstagramError::Api("Login response did not set a session cookie".to_string()));
        }

        self.settings.last_login = Some(timestamp);
        info!("Logged in to Instagram as {}", username);
        Ok(())
    }

    fn load_settings(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.settings = serde_json::from_str(&content)?;
        debug!("Loaded Instagram settings from {}", path.display());
        Ok(())
    }

    fn dump_settings(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(path, content)?;
        debug!("Saved Instagram settings to {}", path.display());
        Ok(())
    }

    async fn account_info(&self) -> Result<IgUser> {
        let json = self
            .get_json("accounts/current_user/", &[("edit", "true".to_string())])
            .await?;
        match json.get("user") {
            Some(user) if user.is_object() => Ok(IgUser::from_json(user)),
            _ => Err(InstagramError::LoginRequired),
        }
    }

    async fn user_info_by_username_v1(&self, username: &str) -> Result<IgUser> {
        let json = self
            .get_json(&format!("users/{}/usernameinfo/", username), &[])
            .await?;
        match json.get("user") {
            Some(user) if user.is_object() => Ok(IgUser::from_json(user)),
            _ => Err(InstagramError::NotFound("User not found".to_string())),
        }
    }

    async fn user_id_from_username(&self, username: &str) -> Result<String> {
        let user = self.user_info_by_username_v1(username).await?;
        Ok(user.pk)
    }

    async fn user_medias(&self, user_id: &str, amount: usize) -> Result<Vec<IgMedia>> {
        self.paginate(&format!("feed/user/{}/", user_id), &[], amount, |page| {
            items(page, "items", IgMedia::from_json)
        })
        .await
    }

    async fn user_stories(&self, user_id: &str) -> Result<Vec<IgStory>> {
        let json = self.get_json(&format!("feed/user/{}/story/", user_id), &[]).await?;
        Ok(items(probe::object(&json, "reel"), "items", IgStory::from_json))
    }

    async fn user_followers(&self, user_id: &str, amount: usize) -> Result<Vec<IgUserShort>> {
        self.paginate(&format!("friendships/{}/followers/", user_id), &[], amount, |page| {
            items(page, "users", IgUserShort::from_json)
        })
        .await
    }

    async fn user_following(&self, user_id: &str, amount: usize) -> Result<Vec<IgUserShort>> {
        self.paginate(&format!("friendships/{}/following/", user_id), &[], amount, |page| {
            items(page, "users", IgUserShort::from_json)
        })
        .await
    }

    async fn media_pk_from_code(&self, code: &str) -> Result<String> {
        shortcode::pk_from_code(code)
    }

    async fn media_pk_from_url(&self, url: &str) -> Result<String> {
        shortcode::pk_from_url(url)
    }

    async fn media_info(&self, media_pk: &str) -> Result<IgMedia> {
        let json = self.get_json(&format!("media/{}/info/", media_pk), &[]).await?;
        path(&json, &["items", "0"])
            .map(IgMedia::from_json)
            .ok_or_else(|| InstagramError::NotFound("Media not found".to_string()))
    }

    async fn media_comments_chunk(
        &self,
        media_pk: &str,
        max_amount: usize,
        min_id: Option<&str>,
    ) -> Result<(Vec<IgComment>, Option<String>)> {
        let endpoint = format!("media/{}/comments/", media_pk);
        let mut comments = Vec::new();
        let mut cursor = min_id.map(str::to_string);

        loop {
            let mut params = vec![("can_support_threading", "true".to_string())];
            if let Some(min_id) = &cursor {
                params.push(("min_id", min_id.clone()));
            }

            let page = self.get_json(&endpoint, &params).await?;
            let batch = items(&page, "comments", IgComment::from_json);
            let fetched = batch.len();
            comments.extend(batch);

            let next = page.get("next_min_id").and_then(id_string);
            let has_more = probe::first_bool(&page, &["has_more_headload_comments", "has_more_comments"]);

            match next {
                Some(next) if has_more || fetched > 0 => {
                    let stalled = cursor.as_deref() == Some(next.as_str());
                    cursor = Some(next);
                    if stalled || fetched == 0 || comments.len() >= max_amount {
                        break;
                    }
                }
                _ => {
                    cursor = None;
                    break;
                }
            }
        }

        comments.truncate(max_amount);
        Ok((comments, cursor))
    }

    async fn media_likers(&self, media_pk: &str) -> Result<Vec<IgUserShort>> {
        let json = self.get_json(&format!("media/{}/likers/", media_pk), &[]).await?;
        Ok(items(&json, "users", IgUserShort::from_json))
    }

    async fn hashtag_medias_top(&self, name: &str, amount: usize) -> Result<Vec<IgMedia>> {
        let endpoint = format!("tags/{}/sections/", name);
        let mut medias = Vec::new();
        let mut max_id: Option<String> = None;

        while medias.len() < amount {
            let mut params = vec![("tab", "top".to_string())];
            if let Some(cursor) = &max_id {
                params.push(("max_id", cursor.clone()));
            }

            let page = self.get_json(&endpoint, &params).await?;
            let before = medias.len();
            for section in page.get("sections").and_then(Value::as_array).into_iter().flatten() {
                let section_medias = path(section, &["layout_content", "medias"]).and_then(Value::as_array);
                for entry in section_medias.into_iter().flatten() {
                    if let Some(media) = entry.get("media") {
                        medias.push(IgMedia::from_json(media));
                    }
                }
            }

            let more = probe::first_bool(&page, &["more_available"]);
            match page.get("next_max_id").and_then(id_string) {
                Some(next) if more && medias.len() > before => max_id = Some(next),
                _ => break,
            }
        }

        medias.truncate(amount);
        Ok(medias)
    }

    async fn private_request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        self.get_json(endpoint, params).await
    }
}
