//! Test doubles shared by the session and service tests

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{InstagramClient, InstagramClientFactory};
use crate::device::DeviceProfile;
use crate::error::{InstagramError, Result};
use crate::types::{IgComment, IgMedia, IgStory, IgUser, IgUserShort};

/// Scripted upstream behavior; unset data makes the call fail
#[derive(Default)]
pub struct Behavior {
    pub sessionid_error: Option<fn() -> InstagramError>,
    pub login_error: Option<fn() -> InstagramError>,
    pub account_info_fails: bool,

    pub users: HashMap<String, IgUser>,
    pub medias: Option<Vec<IgMedia>>,
    pub stories: Vec<IgStory>,
    pub followers: Vec<IgUserShort>,
    pub media_info: HashMap<String, IgMedia>,
    pub comments: Option<(Vec<IgComment>, Option<String>)>,
    pub likers: Vec<IgUserShort>,
    pub hashtag: Vec<IgMedia>,
    /// `private_request` responses keyed by endpoint
    pub raw: HashMap<String, Value>,
}

type CallLog = Arc<Mutex<Vec<String>>>;

fn record(log: &CallLog, call: impl Into<String>) {
    if let Ok(mut calls) = log.lock() {
        calls.push(call.into());
    }
}

pub struct MockClient {
    behavior: Arc<Behavior>,
    log: CallLog,
}

impl MockClient {
    fn not_found(what: &str) -> InstagramError {
        InstagramError::NotFound(format!("{} not found", what))
    }
}

#[async_trait]
impl InstagramClient for MockClient {
    fn set_proxy(&mut self, _proxy: &str) -> Result<()> {
        record(&self.log, "set_proxy");
        Ok(())
    }

    fn set_device(&mut self, _device: &DeviceProfile) {
        record(&self.log, "set_device");
    }

    async fn login_by_sessionid(&mut self, _session_id: &str) -> Result<()> {
        record(&self.log, "login_by_sessionid");
        match self.behavior.sessionid_error {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    async fn login(&mut self, _username: &str, _password: &str) -> Result<()> {
        record(&self.log, "login");
        match self.behavior.login_error {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    fn load_settings(&mut self, path: &Path) -> Result<()> {
        record(&self.log, "load_settings");
        std::fs::read_to_string(path)?;
        Ok(())
    }

    fn dump_settings(&self, path: &Path) -> Result<()> {
        record(&self.log, "dump_settings");
        std::fs::write(path, "{}")?;
        Ok(())
    }

    async fn account_info(&self) -> Result<IgUser> {
        record(&self.log, "account_info");
        if self.behavior.account_info_fails {
            return Err(InstagramError::LoginRequired);
        }
        Ok(IgUser::default())
    }

    async fn user_info_by_username_v1(&self, username: &str) -> Result<IgUser> {
        record(&self.log, format!("user_info_by_username_v1:{}", username));
        self.behavior
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| Self::not_found("User"))
    }

    async fn user_id_from_username(&self, username: &str) -> Result<String> {
        record(&self.log, format!("user_id_from_username:{}", username));
        self.behavior
            .users
            .get(username)
            .map(|u| u.pk.clone())
            .ok_or_else(|| Self::not_found("User"))
    }

    async fn user_medias(&self, _user_id: &str, amount: usize) -> Result<Vec<IgMedia>> {
        record(&self.log, "user_medias");
        self.behavior
            .medias
            .as_ref()
            .map(|m| m.iter().take(amount).cloned().collect())
            .ok_or_else(|| InstagramError::Api("feed unavailable".to_string()))
    }

    async fn user_stories(&self, _user_id: &str) -> Result<Vec<IgStory>> {
        Ok(self.behavior.stories.clone())
    }

    async fn user_followers(&self, _user_id: &str, amount: usize) -> Result<Vec<IgUserShort>> {
        Ok(self.behavior.followers.iter().take(amount).cloned().collect())
    }

    async fn user_following(&self, _user_id: &str, amount: usize) -> Result<Vec<IgUserShort>> {
        Ok(self.behavior.followers.iter().rev().take(amount).cloned().collect())
    }

    async fn media_pk_from_code(&self, code: &str) -> Result<String> {
        record(&self.log, format!("media_pk_from_code:{}", code));
        crate::shortcode::pk_from_code(code)
    }

    async fn media_pk_from_url(&self, url: &str) -> Result<String> {
        record(&self.log, "media_pk_from_url");
        crate::shortcode::pk_from_url(url)
    }

    async fn media_info(&self, media_pk: &str) -> Result<IgMedia> {
        record(&self.log, format!("media_info:{}", media_pk));
        self.behavior
            .media_info
            .get(media_pk)
            .cloned()
            .ok_or_else(|| Self::not_found("Media"))
    }

    async fn media_comments_chunk(
        &self,
        media_pk: &str,
        max_amount: usize,
        min_id: Option<&str>,
    ) -> Result<(Vec<IgComment>, Option<String>)> {
        record(
            &self.log,
            format!("media_comments_chunk:{}:{}", media_pk, min_id.unwrap_or("-")),
        );
        self.behavior
            .comments
            .as_ref()
            .map(|(comments, cursor)| {
                (comments.iter().take(max_amount).cloned().collect(), cursor.clone())
            })
            .ok_or_else(|| InstagramError::Api("comments unavailable".to_string()))
    }

    async fn media_likers(&self, _media_pk: &str) -> Result<Vec<IgUserShort>> {
        Ok(self.behavior.likers.clone())
    }

    async fn hashtag_medias_top(&self, name: &str, amount: usize) -> Result<Vec<IgMedia>> {
        record(&self.log, format!("hashtag_medias_top:{}", name));
        Ok(self.behavior.hashtag.iter().take(amount).cloned().collect())
    }

    async fn private_request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        record(&self.log, format!("private_request:{}?{}", endpoint, query.join("&")));
        self.behavior
            .raw
            .get(endpoint)
            .cloned()
            .ok_or_else(|| InstagramError::Api(format!("no fixture for {}", endpoint)))
    }
}

/// Hands out [`MockClient`]s sharing one behavior and call log
pub struct MockFactory {
    behavior: Arc<Behavior>,
    log: CallLog,
}

impl MockFactory {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior: Arc::new(behavior),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn created(&self) -> usize {
        self.count("create")
    }
}

impl InstagramClientFactory for MockFactory {
    fn create(&self) -> Result<Box<dyn InstagramClient>> {
        record(&self.log, "create");
        Ok(Box::new(MockClient {
            behavior: Arc::clone(&self.behavior),
            log: Arc::clone(&self.log),
        }))
    }
}
