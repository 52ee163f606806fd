//! Test doubles shared by the session and service tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{SessionOptions, TikTokBackend, TikTokClient};
use crate::error::{Result, TikTokError};

/// Canned responses keyed by id or username
#[derive(Default)]
pub struct MockClient {
    pub videos: HashMap<String, Value>,
    pub short_links: HashMap<String, String>,
    pub comments: Vec<Value>,
    pub users: HashMap<String, Value>,
    pub user_videos: Vec<Value>,
    /// Arguments seen by `video_info`
    pub requested: Mutex<Vec<String>>,
}

#[async_trait]
impl TikTokClient for MockClient {
    async fn video_info(&self, video_id: &str) -> Result<Value> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(video_id.to_string());
        }
        self.videos
            .get(video_id)
            .cloned()
            .ok_or_else(|| TikTokError::Api(format!("video {} not found", video_id)))
    }

    async fn resolve_short_link(&self, url: &str) -> Result<String> {
        self.short_links
            .get(url)
            .cloned()
            .ok_or_else(|| TikTokError::InvalidUrl(url.to_string()))
    }

    async fn video_comments(&self, _video_id: &str, count: usize) -> Result<Vec<Value>> {
        Ok(self.comments.iter().take(count).cloned().collect())
    }

    async fn user_info(&self, username: &str) -> Result<Value> {
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| TikTokError::Api(format!("user {} not found", username)))
    }

    async fn user_videos(&self, _username: &str, count: usize) -> Result<Vec<Value>> {
        Ok(self.user_videos.iter().take(count).cloned().collect())
    }
}

type Failure = Box<dyn Fn() -> TikTokError + Send + Sync>;

/// Backend that hands out one shared client or fails every time
pub struct MockBackend {
    client: Option<Arc<MockClient>>,
    failure: Option<Failure>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn ok(client: MockClient) -> Self {
        Self {
            client: Some(Arc::new(client)),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: impl Fn() -> TikTokError + Send + Sync + 'static) -> Self {
        Self {
            client: None,
            failure: Some(Box::new(failure)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> Option<Arc<MockClient>> {
        self.client.clone()
    }
}

#[async_trait]
impl TikTokBackend for MockBackend {
    async fn create_session(&self, _options: SessionOptions) -> Result<Arc<dyn TikTokClient>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers really overlap
        tokio::task::yield_now().await;
        match (&self.client, &self.failure) {
            (Some(client), _) => {
                let client: Arc<dyn TikTokClient> = client.clone();
                Ok(client)
            }
            (None, Some(failure)) => Err(failure()),
            (None, None) => Err(TikTokError::TokenNotSet),
        }
    }
}
