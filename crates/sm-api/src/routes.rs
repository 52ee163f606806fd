//! Route definitions
//!
//! Defines all HTTP API endpoints. Everything except `/health` sits behind
//! the API key check.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{
    health, instagram_comments, instagram_hashtag_posts, instagram_init, instagram_likers,
    instagram_post, instagram_post_by_url, instagram_user, instagram_user_followers,
    instagram_user_following, instagram_user_posts, instagram_user_stories, tiktok_comments,
    tiktok_init, tiktok_user, tiktok_user_videos, tiktok_video, tiktok_video_by_url,
};
use crate::middleware::auth::auth_middleware;
use crate::server::AppState;

/// Create the API router
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        // Session management
        .route("/tiktok/init", post(tiktok_init))
        .route("/instagram/init", post(instagram_init))
        // TikTok
        .route("/tiktok/video/url", post(tiktok_video_by_url))
        .route("/tiktok/video/{video_id}", get(tiktok_video))
        .route("/tiktok/video/{video_id}/comments", get(tiktok_comments))
        .route("/tiktok/user/{username}", get(tiktok_user))
        .route("/tiktok/user/{username}/videos", get(tiktok_user_videos))
        // Instagram
        .route("/instagram/user/{username}", get(instagram_user))
        .route("/instagram/user/{username}/posts", get(instagram_user_posts))
        .route("/instagram/user/{username}/stories", get(instagram_user_stories))
        .route("/instagram/user/{username}/followers", get(instagram_user_followers))
        .route("/instagram/user/{username}/following", get(instagram_user_following))
        .route("/instagram/post/url", post(instagram_post_by_url))
        .route("/instagram/post/{media_id}", get(instagram_post))
        .route("/instagram/post/{media_id}/comments", get(instagram_comments))
        .route("/instagram/post/{media_id}/likers", get(instagram_likers))
        .route("/instagram/hashtag/{name}/posts", get(instagram_hashtag_posts))
        // Deprecated TikTok paths
        .route("/video/url", post(tiktok_video_by_url))
        .route("/video/{video_id}", get(tiktok_video))
        .route("/user/{username}", get(tiktok_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        // Health check
        .route("/health", get(health))
        .merge(protected)
}
