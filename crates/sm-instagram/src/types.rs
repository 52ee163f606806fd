//! Typed upstream models
//!
//! Parsed once from the private API JSON by the client. Fields the upstream
//! may omit stay optional so the normalizers decide the defaults.

use chrono::{DateTime, Utc};
use serde_json::Value;

use sm_core::probe::{
    first, first_avatar, first_bool, first_id, first_opt_str, first_opt_u64, object, path,
};
use sm_core::timestamp;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgUser {
    pub pk: String,
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_private: bool,
    pub is_verified: bool,
    pub external_url: Option<String>,
    pub follower_count: Option<u64>,
    pub following_count: Option<u64>,
    pub media_count: Option<u64>,
}

impl IgUser {
    pub fn from_json(data: &Value) -> Self {
        Self {
            pk: first_id(data, &["pk", "pk_id", "id"]),
            username: first_opt_str(data, &["username"]).unwrap_or_default(),
            full_name: first_opt_str(data, &["full_name"]),
            biography: first_opt_str(data, &["biography"]),
            profile_pic_url: first_avatar(data, &["hd_profile_pic_url_info", "profile_pic_url"]),
            is_private: first_bool(data, &["is_private"]),
            is_verified: first_bool(data, &["is_verified"]),
            external_url: first_opt_str(data, &["external_url"]),
            follower_count: first_opt_u64(data, &["follower_count"]),
            following_count: first_opt_u64(data, &["following_count"]),
            media_count: first_opt_u64(data, &["media_count"]),
        }
    }
}

/// Compact user as found in follower lists, likers and embedded authors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgUserShort {
    pub pk: String,
    pub username: String,
    pub full_name: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_private: Option<bool>,
    pub is_verified: Option<bool>,
}

impl IgUserShort {
    pub fn from_json(data: &Value) -> Self {
        Self {
            pk: first_id(data, &["pk", "pk_id", "id"]),
            username: first_opt_str(data, &["username"]).unwrap_or_default(),
            full_name: first_opt_str(data, &["full_name"]),
            profile_pic_url: first_opt_str(data, &["profile_pic_url"]),
            is_private: data.get("is_private").and_then(Value::as_bool),
            is_verified: data.get("is_verified").and_then(Value::as_bool),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgMedia {
    /// `<pk>_<owner pk>`
    pub id: String,
    pub pk: String,
    pub code: String,
    pub media_type: Option<u64>,
    pub product_type: Option<String>,
    pub caption_text: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub play_count: Option<u64>,
    pub ig_play_count: Option<u64>,
    pub video_play_count: Option<u64>,
    pub view_count: Option<u64>,
    pub video_view_count: Option<u64>,
    pub user: Option<IgUserShort>,
}

impl IgMedia {
    pub fn from_json(data: &Value) -> Self {
        let user = object(data, "user");
        Self {
            id: first_id(data, &["id"]),
            pk: first_id(data, &["pk", "id"]),
            code: first_opt_str(data, &["code"]).unwrap_or_default(),
            media_type: first_opt_u64(data, &["media_type"]),
            product_type: first_opt_str(data, &["product_type"]),
            caption_text: path(data, &["caption", "text"])
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            taken_at: timestamp::optional(data.get("taken_at")),
            thumbnail_url: media_thumbnail(data),
            video_url: path(data, &["video_versions", "0", "url"])
                .and_then(Value::as_str)
                .map(str::to_string),
            like_count: first_opt_u64(data, &["like_count"]),
            comment_count: first_opt_u64(data, &["comment_count"]),
            play_count: first_opt_u64(data, &["play_count"]),
            ig_play_count: first_opt_u64(data, &["ig_play_count"]),
            video_play_count: first_opt_u64(data, &["video_play_count"]),
            view_count: first_opt_u64(data, &["view_count"]),
            video_view_count: first_opt_u64(data, &["video_view_count"]),
            user: (!user.is_null()).then(|| IgUserShort::from_json(user)),
        }
    }
}

/// First image candidate, or the first carousel item's for albums
fn media_thumbnail(data: &Value) -> Option<String> {
    path(data, &["image_versions2", "candidates", "0", "url"])
        .or_else(|| path(data, &["carousel_media", "0", "image_versions2", "candidates", "0", "url"]))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgComment {
    pub pk: String,
    pub text: Option<String>,
    pub created_at_utc: Option<DateTime<Utc>>,
    pub like_count: Option<u64>,
    pub user: Option<IgUserShort>,
}

impl IgComment {
    pub fn from_json(data: &Value) -> Self {
        let user = object(data, "user");
        Self {
            pk: first_id(data, &["pk", "id"]),
            text: first_opt_str(data, &["text"]),
            created_at_utc: timestamp::optional(first(data, &["created_at_utc", "created_at"])),
            like_count: first_opt_u64(data, &["comment_like_count", "like_count"]),
            user: (!user.is_null()).then(|| IgUserShort::from_json(user)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgStory {
    pub id: String,
    pub pk: String,
    pub media_type: Option<u64>,
    pub taken_at: Option<DateTime<Utc>>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
}

impl IgStory {
    pub fn from_json(data: &Value) -> Self {
        Self {
            id: first_id(data, &["id"]),
            pk: first_id(data, &["pk", "id"]),
            media_type: first_opt_u64(data, &["media_type"]),
            taken_at: timestamp::optional(data.get("taken_at")),
            thumbnail_url: media_thumbnail(data),
            video_url: path(data, &["video_versions", "0", "url"])
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_from_private_api_item() {
        let item = json!({
            "id": "3100_42",
            "pk": 3100,
            "code": "Cabc",
            "media_type": 2,
            "product_type": "clips",
            "caption": {"text": "hello"},
            "taken_at": 1_700_000_000,
            "image_versions2": {"candidates": [{"url": "https://img/0"}]},
            "video_versions": [{"url": "https://vid/0"}],
            "like_count": 10,
            "play_count": 99,
            "user": {"pk": 42, "username": "alice"}
        });

        let media = IgMedia::from_json(&item);
        assert_eq!(media.id, "3100_42");
        assert_eq!(media.pk, "3100");
        assert_eq!(media.caption_text.as_deref(), Some("hello"));
        assert_eq!(media.thumbnail_url.as_deref(), Some("https://img/0"));
        assert_eq!(media.video_url.as_deref(), Some("https://vid/0"));
        assert_eq!(media.play_count, Some(99));
        assert_eq!(media.comment_count, None);
        assert_eq!(media.user.unwrap().username, "alice");
    }

    #[test]
    fn test_album_thumbnail_comes_from_first_item() {
        let item = json!({
            "pk": "1",
            "media_type": 8,
            "carousel_media": [{"image_versions2": {"candidates": [{"url": "https://c/0"}]}}]
        });
        assert_eq!(IgMedia::from_json(&item).thumbnail_url.as_deref(), Some("https://c/0"));
    }

    #[test]
    fn test_user_from_usernameinfo() {
        let user = IgUser::from_json(&json!({
            "pk": "42",
            "username": "alice",
            "biography": "",
            "is_verified": true,
            "follower_count": 5,
            "profile_pic_url": "https://p"
        }));
        assert_eq!(user.pk, "42");
        assert!(user.biography.is_none());
        assert!(user.is_verified);
        assert!(!user.is_private);
        assert_eq!(user.follower_count, Some(5));
        assert_eq!(user.profile_pic_url.as_deref(), Some("https://p"));
    }

    #[test]
    fn test_comment_reads_created_at_utc() {
        let comment = IgComment::from_json(&json!({
            "pk": 7,
            "text": "hey",
            "created_at_utc": 1_600_000_000,
            "comment_like_count": 3
        }));
        assert_eq!(comment.pk, "7");
        assert_eq!(comment.like_count, Some(3));
        assert!(comment.created_at_utc.is_some());
        assert!(comment.user.is_none());
    }
}
