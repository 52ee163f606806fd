//! TikTok operations exposed to the HTTP layer
//!
//! Every call follows the same steps: make sure the session is up, pace,
//! call upstream, normalize. Upstream failures are wrapped with an
//! endpoint-specific prefix.

use std::sync::Arc;

use tracing::debug;

use sm_core::models::{TikTokComments, TikTokUser, TikTokUserVideos, TikTokVideo};
use sm_core::{Error, Pacer, Result, SessionStatus};

use crate::api::{TikTokBackend, TikTokClient};
use crate::error::TikTokError;
use crate::normalize;
use crate::session::TikTokSessionManager;
use crate::url::{VideoRef, parse_video_url};

/// Per-process TikTok context
pub struct TikTokService {
    sessions: TikTokSessionManager,
    pacer: Arc<Pacer>,
}

impl TikTokService {
    pub fn new(backend: Arc<dyn TikTokBackend>, ms_token: Option<String>, pacer: Pacer) -> Self {
        let pacer = Arc::new(pacer);
        Self {
            sessions: TikTokSessionManager::new(backend, ms_token, Arc::clone(&pacer)),
            pacer,
        }
    }

    pub fn token_configured(&self) -> bool {
        self.sessions.token_configured()
    }

    pub async fn status(&self) -> SessionStatus {
        self.sessions.status().await
    }

    /// Create the session ahead of the first request
    pub async fn init(&self) -> Result<()> {
        self.sessions.ensure_session().await?;
        Ok(())
    }

    async fn ready(&self) -> Result<Arc<dyn TikTokClient>> {
        let client = self.sessions.ensure_session().await?;
        self.pacer.pace().await;
        Ok(client)
    }

    pub async fn video(&self, video_id: &str) -> Result<TikTokVideo> {
        let client = self.ready().await?;
        let raw = client
            .video_info(video_id)
            .await
            .map_err(|e| Error::upstream("Error fetching TikTok video", e))?;
        Ok(normalize::video(&raw))
    }

    /// Accepts canonical URLs, short links and bare ids
    pub async fn video_by_url(&self, url: &str) -> Result<TikTokVideo> {
        let client = self.ready().await?;

        let video_id = match parse_video_url(url).map_err(|e| Error::InvalidInput(e.to_string()))? {
            VideoRef::Id(id) => id,
            VideoRef::ShortLink(link) => {
                client
                    .resolve_short_link(&link)
                    .await
                    .map_err(|e| match e {
                        e @ TikTokError::InvalidUrl(_) => Error::InvalidInput(e.to_string()),
                        e => Error::upstream("Error fetching TikTok video", e),
                    })?
            }
        };

        debug!("Resolved TikTok video id {} from {}", video_id, url);

        let raw = client
            .video_info(&video_id)
            .await
            .map_err(|e| Error::upstream("Error fetching TikTok video", e))?;
        Ok(normalize::video(&raw))
    }

    pub async fn comments(&self, video_id: &str, count: usize) -> Result<TikTokComments> {
        let client = self.ready().await?;
        let raw = client
            .video_comments(video_id, count)
            .await
            .map_err(|e| Error::upstream("Error fetching TikTok comments", e))?;

        let comments: Vec<_> = raw.iter().map(normalize::comment).collect();
        Ok(TikTokComments {
            video_id: video_id.to_string(),
            count: comments.len(),
            comments,
        })
    }

    pub async fn user(&self, username: &str) -> Result<TikTokUser> {
        let client = self.ready().await?;
        let username = username.trim_start_matches('@');
        let raw = client
            .user_info(username)
            .await
            .map_err(|e| Error::upstream("Error fetching TikTok user", e))?;
        Ok(normalize::user(&raw))
    }

    pub async fn user_videos(&self, username: &str, count: usize) -> Result<TikTokUserVideos> {
        let client = self.ready().await?;
        let username = username.trim_start_matches('@');
        let raw = client
            .user_videos(username, count)
            .await
            .map_err(|e| Error::upstream("Error fetching TikTok user videos", e))?;

        let videos: Vec<_> = raw.iter().map(normalize::video).collect();
        Ok(TikTokUserVideos {
            username: username.to_string(),
            count: videos.len(),
            videos,
        })
    }
}
