//! HTTP API handlers
//!
//! Thin wrappers over the platform services: extract and validate the
//! request, call the service, return the normalized JSON.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sm_core::models::{
    InstagramComments, InstagramFollowers, InstagramFollowing, InstagramHashtagPosts,
    InstagramLikers, InstagramMedia, InstagramUser, InstagramUserPosts, InstagramUserStories,
    TikTokComments, TikTokUser, TikTokUserVideos, TikTokVideo,
};
use sm_core::SessionStatus;

use crate::error::{ApiError, Result};
use crate::server::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query for list endpoints
#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub count: Option<i64>,
}

/// Query for paginated comment listing
#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    pub count: Option<i64>,
    /// `next_cursor` from the previous page
    pub cursor: Option<String>,
}

/// Body of the lookup-by-URL endpoints
#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct TikTokHealth {
    pub ms_token_configured: bool,
    #[serde(flatten)]
    pub session: SessionStatus,
}

#[derive(Debug, Serialize)]
pub struct InstagramHealth {
    pub credentials_configured: bool,
    #[serde(flatten)]
    pub session: SessionStatus,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tiktok: TikTokHealth,
    pub instagram: InstagramHealth,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub status: &'static str,
    pub message: String,
}

impl InitResponse {
    fn initialized(platform: &str) -> Json<Self> {
        Json(Self {
            status: "initialized",
            message: format!("{} session initialized successfully", platform),
        })
    }
}

/// `count` within `1..=max`, `default` when absent
fn bounded_count(count: Option<i64>, default: usize, max: usize) -> Result<usize> {
    let Some(count) = count else {
        return Ok(default);
    };

    usize::try_from(count)
        .ok()
        .filter(|c| (1..=max).contains(c))
        .ok_or_else(|| ApiError::Validation(format!("count must be between 1 and {}", max)))
}

fn query<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(q)| q)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

fn body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(b)| b)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

// ============================================================================
// System
// ============================================================================

/// Health check endpoint for both platforms
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        tiktok: TikTokHealth {
            ms_token_configured: state.tiktok.token_configured(),
            session: state.tiktok.status().await,
        },
        instagram: InstagramHealth {
            credentials_configured: state.instagram.credentials_configured(),
            session: state.instagram.status().await,
        },
    })
}

pub async fn tiktok_init(State(state): State<AppState>) -> Result<Json<InitResponse>> {
    state.tiktok.init().await?;
    Ok(InitResponse::initialized("TikTok"))
}

pub async fn instagram_init(State(state): State<AppState>) -> Result<Json<InitResponse>> {
    state.instagram.init().await?;
    Ok(InitResponse::initialized("Instagram"))
}

// ============================================================================
// TikTok
// ============================================================================

pub async fn tiktok_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<TikTokVideo>> {
    debug!("TikTok video request: {}", video_id);
    Ok(Json(state.tiktok.video(&video_id).await?))
}

pub async fn tiktok_video_by_url(
    State(state): State<AppState>,
    req: std::result::Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<TikTokVideo>> {
    let req = body(req)?;
    info!("TikTok video by URL: {}", req.url);
    Ok(Json(state.tiktok.video_by_url(&req.url).await?))
}

pub async fn tiktok_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    params: std::result::Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<TikTokComments>> {
    let count = bounded_count(query(params)?.count, 50, 200)?;
    Ok(Json(state.tiktok.comments(&video_id, count).await?))
}

pub async fn tiktok_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<TikTokUser>> {
    debug!("TikTok user request: {}", username);
    Ok(Json(state.tiktok.user(&username).await?))
}

pub async fn tiktok_user_videos(
    State(state): State<AppState>,
    Path(username): Path<String>,
    params: std::result::Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<TikTokUserVideos>> {
    let count = bounded_count(query(params)?.count, 10, 50)?;
    Ok(Json(state.tiktok.user_videos(&username, count).await?))
}

// ============================================================================
// Instagram
// ============================================================================

pub async fn instagram_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<InstagramUser>> {
    debug!("Instagram user request: {}", username);
    Ok(Json(state.instagram.user(&username).await?))
}

pub async fn instagram_user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
    params: std::result::Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<InstagramUserPosts>> {
    let count = bounded_count(query(params)?.count, 12, 50)?;
    Ok(Json(state.instagram.user_posts(&username, count).await?))
}

pub async fn instagram_user_stories(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<InstagramUserStories>> {
    Ok(Json(state.instagram.user_stories(&username).await?))
}

pub async fn instagram_user_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    params: std::result::Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<InstagramFollowers>> {
    let count = bounded_count(query(params)?.count, 50, 200)?;
    Ok(Json(state.instagram.user_followers(&username, count).await?))
}

pub async fn instagram_user_following(
    State(state): State<AppState>,
    Path(username): Path<String>,
    params: std::result::Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<InstagramFollowing>> {
    let count = bounded_count(query(params)?.count, 50, 200)?;
    Ok(Json(state.instagram.user_following(&username, count).await?))
}

pub async fn instagram_post(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> Result<Json<InstagramMedia>> {
    debug!("Instagram post request: {}", media_id);
    Ok(Json(state.instagram.post(&media_id).await?))
}

pub async fn instagram_post_by_url(
    State(state): State<AppState>,
    req: std::result::Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<InstagramMedia>> {
    let req = body(req)?;
    info!("Instagram post by URL: {}", req.url);
    Ok(Json(state.instagram.post_by_url(&req.url).await?))
}

pub async fn instagram_comments(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    params: std::result::Result<Query<CommentsQuery>, QueryRejection>,
) -> Result<Json<InstagramComments>> {
    let params = query(params)?;
    let count = bounded_count(params.count, 50, 200)?;
    let page = state
        .instagram
        .comments(&media_id, count, params.cursor.as_deref())
        .await?;
    Ok(Json(page))
}

pub async fn instagram_likers(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> Result<Json<InstagramLikers>> {
    Ok(Json(state.instagram.likers(&media_id).await?))
}

pub async fn instagram_hashtag_posts(
    State(state): State<AppState>,
    Path(name): Path<String>,
    params: std::result::Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<InstagramHashtagPosts>> {
    let count = bounded_count(query(params)?.count, 20, 50)?;
    Ok(Json(state.instagram.hashtag_posts(&name, count).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_count() {
        assert_eq!(bounded_count(None, 50, 200).unwrap(), 50);
        assert_eq!(bounded_count(Some(1), 50, 200).unwrap(), 1);
        assert_eq!(bounded_count(Some(200), 50, 200).unwrap(), 200);
        assert!(matches!(bounded_count(Some(0), 50, 200), Err(ApiError::Validation(_))));
        assert!(matches!(bounded_count(Some(201), 50, 200), Err(ApiError::Validation(_))));
        assert!(matches!(bounded_count(Some(-3), 10, 50), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_health_flattens_session_status() {
        let health = TikTokHealth {
            ms_token_configured: true,
            session: SessionStatus {
                session_initialized: false,
                session_error: Some("MS_TOKEN not configured".to_string()),
            },
        };
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ms_token_configured": true,
                "session_initialized": false,
                "session_error": "MS_TOKEN not configured"
            })
        );
    }
}
