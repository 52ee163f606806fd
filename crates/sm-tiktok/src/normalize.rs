//! TikTok response normalizers
//!
//! Map the dictionaries returned by [`TikTokClient`](crate::TikTokClient)
//! into the stable schemas from `sm_core::models`. These never fail.

use serde_json::Value;

use sm_core::models::{
    TikTokAuthor, TikTokComment, TikTokUser, TikTokUserStats, TikTokVideo, TikTokVideoStats,
};
use sm_core::probe::{first_avatar, first_id, first_str, first_u64, is_truthy, object};
use sm_core::timestamp;

/// Video dictionary → [`TikTokVideo`]
pub fn video(data: &Value) -> TikTokVideo {
    let stats = object(data, "stats");
    let author = object(data, "author");

    let create_time = timestamp::mandatory(data.get("createTime"));

    TikTokVideo {
        id: first_id(data, &["id"]),
        description: first_str(data, &["desc"]),
        create_time_iso: timestamp::iso(&create_time),
        create_time,
        stats: TikTokVideoStats {
            views: first_u64(stats, &["playCount"]),
            likes: first_u64(stats, &["diggCount"]),
            comments: first_u64(stats, &["commentCount"]),
            shares: first_u64(stats, &["shareCount"]),
        },
        author: TikTokAuthor {
            id: first_id(author, &["id"]),
            username: first_str(author, &["uniqueId"]),
            nickname: first_str(author, &["nickname"]),
            avatar: first_avatar(author, &["avatarThumb"]),
        },
    }
}

/// User payload in any of its three shapes → [`TikTokUser`]
///
/// - `{"userInfo": {"user": {...}, "stats": {...}}}`
/// - `{"user": {...}, "stats": {...}}`
/// - flat user dictionary with an optional `stats` key
pub fn user(data: &Value) -> TikTokUser {
    let (user, stats) = if data.get("userInfo").is_some() {
        let info = object(data, "userInfo");
        (object(info, "user"), object(info, "stats"))
    } else if data.get("user").is_some() {
        (object(data, "user"), object(data, "stats"))
    } else {
        (data, object(data, "stats"))
    };

    TikTokUser {
        id: first_id(user, &["id"]),
        username: first_str(user, &["uniqueId", "unique_id"]),
        nickname: first_str(user, &["nickname"]),
        bio: first_str(user, &["signature"]),
        avatar: first_avatar(user, &["avatarThumb", "avatar_thumb"]),
        stats: TikTokUserStats {
            followers: first_u64(stats, &["followerCount", "follower_count"]),
            following: first_u64(stats, &["followingCount", "following_count"]),
            likes: first_u64(stats, &["heartCount", "heart_count", "heart"]),
            video_count: first_u64(stats, &["videoCount", "video_count"]),
        },
    }
}

/// Comment dictionary → [`TikTokComment`]
pub fn comment(data: &Value) -> TikTokComment {
    // An empty `user` object falls through to `author`
    let author = ["user", "author"]
        .iter()
        .map(|key| object(data, key))
        .find(|candidate| is_truthy(candidate))
        .unwrap_or(&Value::Null);

    let raw_time = sm_core::probe::first(data, &["createTime", "create_time"]);
    let create_time = timestamp::optional(raw_time);

    TikTokComment {
        id: first_id(data, &["cid", "id"]),
        text: first_str(data, &["text", "comment"]),
        create_time_iso: timestamp::iso_opt(create_time.as_ref()),
        create_time,
        likes: first_u64(data, &["diggCount", "digg_count", "likes"]),
        reply_count: first_u64(data, &["replyCommentTotal", "reply_count"]),
        author: TikTokAuthor {
            id: first_id(author, &["id", "uid"]),
            username: first_str(author, &["uniqueId", "unique_id"]),
            nickname: first_str(author, &["nickname"]),
            avatar: first_avatar(author, &["avatarThumb", "avatar_thumb", "avatar"]),
        },
    }
}
