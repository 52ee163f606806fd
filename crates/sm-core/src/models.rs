//! Normalized response schemas
//!
//! These are the stable JSON shapes returned by the REST facade, whatever
//! shape the upstream client produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// TikTok
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TikTokVideoStats {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TikTokAuthor {
    pub id: String,
    pub username: String,
    pub nickname: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TikTokVideo {
    pub id: String,
    pub description: String,
    pub create_time: DateTime<Utc>,
    pub create_time_iso: String,
    pub stats: TikTokVideoStats,
    pub author: TikTokAuthor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TikTokUserStats {
    pub followers: u64,
    pub following: u64,
    /// Total hearts received
    pub likes: u64,
    pub video_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TikTokUser {
    pub id: String,
    pub username: String,
    pub nickname: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub stats: TikTokUserStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TikTokComment {
    pub id: String,
    pub text: String,
    pub create_time: Option<DateTime<Utc>>,
    pub create_time_iso: String,
    pub likes: u64,
    pub reply_count: u64,
    pub author: TikTokAuthor,
}

#[derive(Debug, Clone, Serialize)]
pub struct TikTokComments {
    pub video_id: String,
    pub count: usize,
    pub comments: Vec<TikTokComment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TikTokUserVideos {
    pub username: String,
    pub count: usize,
    pub videos: Vec<TikTokVideo>,
}

// ============================================================================
// Instagram
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramUserStats {
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramUser {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub is_private: bool,
    pub is_verified: bool,
    pub external_url: Option<String>,
    pub stats: InstagramUserStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramMediaStats {
    pub likes: u64,
    pub comments: u64,
    /// Only present for videos and reels
    pub views: Option<u64>,
}

/// Media kind as exposed by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
    Album,
    Reel,
    Igtv,
    #[default]
    Unknown,
}

impl MediaType {
    /// Map the numeric media type, letting `product_type` take precedence
    pub fn from_upstream(media_type: Option<u64>, product_type: Option<&str>) -> Self {
        match product_type {
            Some("clips") => return MediaType::Reel,
            Some("igtv") => return MediaType::Igtv,
            _ => {}
        }

        match media_type {
            Some(1) => MediaType::Photo,
            Some(2) => MediaType::Video,
            Some(8) => MediaType::Album,
            _ => MediaType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramMedia {
    pub id: String,
    pub pk: String,
    /// Shortcode used in post URLs
    pub code: String,
    pub media_type: MediaType,
    pub caption: String,
    pub create_time: Option<DateTime<Utc>>,
    pub create_time_iso: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub stats: InstagramMediaStats,
    pub author_username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramCommentAuthor {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramComment {
    pub id: String,
    pub text: String,
    pub create_time: Option<DateTime<Utc>>,
    pub create_time_iso: String,
    pub likes: u64,
    pub author: InstagramCommentAuthor,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstagramComments {
    pub media_id: String,
    pub count: usize,
    pub comments: Vec<InstagramComment>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramFollower {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub is_private: bool,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramStory {
    pub id: String,
    pub pk: String,
    pub media_type: MediaType,
    pub taken_at: Option<DateTime<Utc>>,
    pub taken_at_iso: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstagramUserPosts {
    pub username: String,
    pub count: usize,
    pub posts: Vec<InstagramMedia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstagramUserStories {
    pub username: String,
    pub count: usize,
    pub stories: Vec<InstagramStory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstagramFollowers {
    pub username: String,
    pub count: usize,
    pub followers: Vec<InstagramFollower>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstagramFollowing {
    pub username: String,
    pub count: usize,
    pub following: Vec<InstagramFollower>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstagramLikers {
    pub media_id: String,
    pub count: usize,
    pub likers: Vec<InstagramFollower>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstagramHashtagPosts {
    pub hashtag: String,
    pub count: usize,
    pub posts: Vec<InstagramMedia>,
}
