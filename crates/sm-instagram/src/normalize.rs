//! Instagram response normalizers
//!
//! Two families: object-shape functions take the typed models returned by
//! [`InstagramClient`](crate::InstagramClient), raw-shape functions take the
//! JSON dictionaries from `private_request` fallbacks. Neither ever fails.

use serde_json::Value;

use sm_core::models::{
    InstagramComment, InstagramCommentAuthor, InstagramFollower, InstagramMedia,
    InstagramMediaStats, InstagramStory, InstagramUser, InstagramUserStats, MediaType,
};
use sm_core::probe::{
    first, first_bool, first_id, first_opt_str, first_opt_u64, first_str, first_u64, object, path,
};
use sm_core::timestamp;

use crate::types::{IgComment, IgMedia, IgStory, IgUser, IgUserShort};

// ============================================================================
// Object shape
// ============================================================================

pub fn user(user: &IgUser) -> InstagramUser {
    InstagramUser {
        id: user.pk.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone().unwrap_or_default(),
        bio: user.biography.clone().unwrap_or_default(),
        avatar: user.profile_pic_url.clone(),
        is_private: user.is_private,
        is_verified: user.is_verified,
        external_url: user.external_url.clone(),
        stats: InstagramUserStats {
            followers: user.follower_count.unwrap_or(0),
            following: user.following_count.unwrap_or(0),
            posts_count: user.media_count.unwrap_or(0),
        },
    }
}

pub fn media(media: &IgMedia) -> InstagramMedia {
    let views = [
        media.play_count,
        media.ig_play_count,
        media.video_play_count,
        media.view_count,
        media.video_view_count,
    ]
    .into_iter()
    .flatten()
    .find(|n| *n != 0);

    InstagramMedia {
        id: media.id.clone(),
        pk: media.pk.clone(),
        code: media.code.clone(),
        media_type: MediaType::from_upstream(media.media_type, media.product_type.as_deref()),
        caption: media.caption_text.clone().unwrap_or_default(),
        create_time: media.taken_at,
        create_time_iso: timestamp::iso_opt(media.taken_at.as_ref()),
        thumbnail_url: media.thumbnail_url.clone(),
        video_url: media.video_url.clone(),
        stats: InstagramMediaStats {
            likes: media.like_count.unwrap_or(0),
            comments: media.comment_count.unwrap_or(0),
            views,
        },
        author_username: media
            .user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_default(),
    }
}

pub fn comment(comment: &IgComment) -> InstagramComment {
    let author = comment.user.as_ref();
    InstagramComment {
        id: comment.pk.clone(),
        text: comment.text.clone().unwrap_or_default(),
        create_time: comment.created_at_utc,
        create_time_iso: timestamp::iso_opt(comment.created_at_utc.as_ref()),
        likes: comment.like_count.unwrap_or(0),
        author: InstagramCommentAuthor {
            id: author.map(|u| u.pk.clone()).unwrap_or_default(),
            username: author.map(|u| u.username.clone()).unwrap_or_default(),
            full_name: author.and_then(|u| u.full_name.clone()).unwrap_or_default(),
            avatar: author.and_then(|u| u.profile_pic_url.clone()),
        },
    }
}

/// Used for followers, following and likers
pub fn follower(user: &IgUserShort) -> InstagramFollower {
    InstagramFollower {
        id: user.pk.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone().unwrap_or_default(),
        avatar: user.profile_pic_url.clone(),
        is_private: user.is_private.unwrap_or(false),
        is_verified: user.is_verified.unwrap_or(false),
    }
}

pub fn story(story: &IgStory) -> InstagramStory {
    InstagramStory {
        id: story.id.clone(),
        pk: story.pk.clone(),
        media_type: MediaType::from_upstream(story.media_type, None),
        taken_at: story.taken_at,
        taken_at_iso: timestamp::iso_opt(story.taken_at.as_ref()),
        thumbnail_url: story.thumbnail_url.clone(),
        video_url: story.video_url.clone(),
    }
}

// ============================================================================
// Raw shape
// ============================================================================

/// View counters in priority order; reels report plays, older videos views
const VIEW_KEYS: &[&str] = &[
    "play_count",
    "ig_play_count",
    "video_play_count",
    "view_count",
    "video_view_count",
    "fb_play_count",
];

fn string_at(value: &Value, segments: &[&str]) -> Option<String> {
    path(value, segments)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Raw media dictionary (`media/{pk}/info/` items, feed items, GraphQL nodes)
pub fn media_from_raw(data: &Value) -> InstagramMedia {
    let taken_at = timestamp::optional(first(data, &["taken_at", "taken_at_timestamp"]));

    // Missing media_type means a plain photo
    let media_type = data.get("media_type").map_or(Some(1), |v| v.as_u64());
    let product_type = data.get("product_type").and_then(Value::as_str);

    let thumbnail_url = first_opt_str(data, &["thumbnail_url"])
        .or_else(|| string_at(data, &["image_versions2", "candidates", "0", "url"]))
        .or_else(|| first_opt_str(data, &["display_url"]));

    let video_url = first_opt_str(data, &["video_url"])
        .or_else(|| string_at(data, &["video_versions", "0", "url"]));

    let likes = first_opt_u64(data, &["like_count"])
        .unwrap_or_else(|| first_u64(object(data, "edge_media_preview_like"), &["count"]));
    let comments = first_opt_u64(data, &["comment_count"])
        .unwrap_or_else(|| first_u64(object(data, "edge_media_to_comment"), &["count"]));
    let views = first_opt_u64(data, VIEW_KEYS)
        .or_else(|| first_opt_u64(object(data, "clips_metadata"), &["play_count"]));

    let caption = match data.get("caption") {
        Some(Value::Object(_)) => string_at(data, &["caption", "text"]).unwrap_or_default(),
        _ => first_str(data, &["caption_text", "caption"]),
    };

    InstagramMedia {
        id: first_id(data, &["id"]),
        pk: first_id(data, &["pk", "id"]),
        code: first_str(data, &["code", "shortcode"]),
        media_type: MediaType::from_upstream(media_type, product_type),
        caption,
        create_time: taken_at,
        create_time_iso: timestamp::iso_opt(taken_at.as_ref()),
        thumbnail_url,
        video_url,
        stats: InstagramMediaStats { likes, comments, views },
        author_username: first_str(object(data, "user"), &["username"]),
    }
}

/// Raw comment dictionary from `media/{pk}/comments/`
pub fn comment_from_raw(data: &Value) -> InstagramComment {
    let created_at = timestamp::optional(first(data, &["created_at", "created_at_utc"]));
    let user = object(data, "user");

    InstagramComment {
        id: first_id(data, &["pk", "id"]),
        text: first_str(data, &["text"]),
        create_time: created_at,
        create_time_iso: timestamp::iso_opt(created_at.as_ref()),
        likes: first_u64(data, &["comment_like_count", "like_count"]),
        author: InstagramCommentAuthor {
            id: first_id(user, &["pk", "id"]),
            username: first_str(user, &["username"]),
            full_name: first_str(user, &["full_name"]),
            avatar: first_opt_str(user, &["profile_pic_url"]),
        },
    }
}

/// `data.user` from `users/web_profile_info/`
///
/// Counts live under GraphQL edges; the flat `*_count` fields are the fallback.
pub fn user_from_web_profile(data: &Value) -> InstagramUser {
    let edge_count = |edge: &str, flat: &str| {
        first_opt_u64(object(data, edge), &["count"]).unwrap_or_else(|| first_u64(data, &[flat]))
    };

    InstagramUser {
        id: first_id(data, &["id", "pk"]),
        username: first_str(data, &["username"]),
        full_name: first_str(data, &["full_name"]),
        bio: first_str(data, &["biography"]),
        avatar: first_opt_str(data, &["profile_pic_url_hd", "profile_pic_url"]),
        is_private: first_bool(data, &["is_private"]),
        is_verified: first_bool(data, &["is_verified"]),
        external_url: first_opt_str(data, &["external_url"]),
        stats: InstagramUserStats {
            followers: edge_count("edge_followed_by", "follower_count"),
            following: edge_count("edge_follow", "following_count"),
            posts_count: edge_count("edge_owner_to_timeline_media", "media_count"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    #[test]
    fn test_media_type_mapping() {
        let typed = |media_type, product_type: Option<&str>| {
            media(&IgMedia {
                media_type,
                product_type: product_type.map(str::to_string),
                ..Default::default()
            })
            .media_type
        };
        assert_eq!(typed(Some(1), None), MediaType::Photo);
        assert_eq!(typed(Some(2), None), MediaType::Video);
        assert_eq!(typed(Some(8), None), MediaType::Album);
        assert_eq!(typed(Some(2), Some("clips")), MediaType::Reel);
        assert_eq!(typed(Some(2), Some("igtv")), MediaType::Igtv);
        assert_eq!(typed(Some(5), None), MediaType::Unknown);
    }

    #[test]
    fn test_typed_media_prefers_play_count() {
        let out = media(&IgMedia {
            pk: "1".to_string(),
            play_count: Some(0),
            ig_play_count: Some(40),
            view_count: Some(7),
            like_count: Some(3),
            taken_at: DateTime::from_timestamp(1_700_000_000, 0),
            user: Some(IgUserShort {
                username: "alice".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(out.stats.views, Some(40));
        assert_eq!(out.stats.likes, 3);
        assert_eq!(out.stats.comments, 0);
        assert_eq!(out.create_time_iso, "2023-11-14T22:13:20Z");
        assert_eq!(out.author_username, "alice");
    }

    #[test]
    fn test_typed_media_without_user_or_time() {
        let out = media(&IgMedia::default());
        assert_eq!(out.author_username, "");
        assert!(out.create_time.is_none());
        assert_eq!(out.create_time_iso, "");
        assert!(out.stats.views.is_none());
    }

    #[test]
    fn test_raw_media_probe_order() {
        let raw = json!({
            "id": "9_1",
            "pk": 9,
            "shortcode": "Cabc",
            "taken_at_timestamp": 1_700_000_000,
            "image_versions2": {"candidates": [{"url": "https://cand/0"}]},
            "display_url": "https://display",
            "video_versions": [{"url": "https://v/0"}],
            "edge_media_preview_like": {"count": 12},
            "edge_media_to_comment": {"count": 4},
            "clips_metadata": {"play_count": 1000},
            "caption": {"text": "cap"},
            "user": {"username": "bob"}
        });
        let out = media_from_raw(&raw);
        assert_eq!(out.id, "9_1");
        assert_eq!(out.pk, "9");
        assert_eq!(out.code, "Cabc");
        assert_eq!(out.media_type, MediaType::Photo);
        assert_eq!(out.thumbnail_url.as_deref(), Some("https://cand/0"));
        assert_eq!(out.video_url.as_deref(), Some("https://v/0"));
        assert_eq!(out.stats.likes, 12);
        assert_eq!(out.stats.comments, 4);
        assert_eq!(out.stats.views, Some(1000));
        assert_eq!(out.caption, "cap");
        assert_eq!(out.create_time_iso, "2023-11-14T22:13:20Z");
        assert_eq!(out.author_username, "bob");
    }

    #[test]
    fn test_raw_media_flat_fields_win() {
        let raw = json!({
            "id": 5,
            "media_type": 2,
            "product_type": "clips",
            "thumbnail_url": "https://thumb",
            "display_url": "https://display",
            "video_url": "https://video",
            "like_count": 1,
            "edge_media_preview_like": {"count": 99},
            "view_count": 30,
            "fb_play_count": 50,
            "caption_text": "flat caption"
        });
        let out = media_from_raw(&raw);
        assert_eq!(out.pk, "5");
        assert_eq!(out.media_type, MediaType::Reel);
        assert_eq!(out.thumbnail_url.as_deref(), Some("https://thumb"));
        assert_eq!(out.video_url.as_deref(), Some("https://video"));
        assert_eq!(out.stats.likes, 1);
        assert_eq!(out.stats.views, Some(30));
        assert_eq!(out.caption, "flat caption");
        assert!(out.create_time.is_none());
    }

    #[test]
    fn test_raw_media_string_caption_and_display_url() {
        let raw = json!({"caption": "plain", "display_url": "https://display", "media_type": null});
        let out = media_from_raw(&raw);
        assert_eq!(out.caption, "plain");
        assert_eq!(out.thumbnail_url.as_deref(), Some("https://display"));
        assert_eq!(out.media_type, MediaType::Unknown);
        assert_eq!(out.stats, InstagramMediaStats::default());
    }

    #[test]
    fn test_raw_comment() {
        let raw = json!({
            "pk": "c1",
            "text": "nice",
            "created_at": 1_600_000_000,
            "comment_like_count": 0,
            "like_count": 6,
            "user": {"id": 77, "username": "eve", "full_name": "Eve", "profile_pic_url": "https://e"}
        });
        let out = comment_from_raw(&raw);
        assert_eq!(out.id, "c1");
        assert_eq!(out.likes, 6);
        assert_eq!(out.create_time_iso, "2020-09-13T12:26:40Z");
        assert_eq!(out.author.id, "77");
        assert_eq!(out.author.avatar.as_deref(), Some("https://e"));
    }

    #[test]
    fn test_raw_comment_without_user() {
        let out = comment_from_raw(&json!({"id": 3, "created_at": "bad"}));
        assert_eq!(out.id, "3");
        assert!(out.create_time.is_none());
        assert_eq!(out.author, InstagramCommentAuthor::default());
    }

    #[test]
    fn test_typed_comment_and_follower() {
        let author = IgUserShort {
            pk: "5".to_string(),
            username: "zed".to_string(),
            full_name: None,
            profile_pic_url: Some("https://z".to_string()),
            is_private: Some(true),
            is_verified: None,
        };
        let out = comment(&IgComment {
            pk: "1".to_string(),
            text: Some("hi".to_string()),
            created_at_utc: None,
            like_count: None,
            user: Some(author.clone()),
        });
        assert_eq!(out.author.username, "zed");
        assert_eq!(out.author.full_name, "");
        assert_eq!(out.likes, 0);
        assert_eq!(out.create_time_iso, "");

        let f = follower(&author);
        assert!(f.is_private);
        assert!(!f.is_verified);
        assert_eq!(f.avatar.as_deref(), Some("https://z"));
    }

    #[test]
    fn test_story() {
        let out = story(&IgStory {
            id: "1_2".to_string(),
            pk: "1".to_string(),
            media_type: Some(2),
            taken_at: DateTime::from_timestamp(1_700_000_000, 0),
            thumbnail_url: None,
            video_url: Some("https://v".to_string()),
        });
        assert_eq!(out.media_type, MediaType::Video);
        assert_eq!(out.taken_at_iso, "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_web_profile_user_edges_then_flat() {
        let raw = json!({
            "id": "42",
            "username": "alice",
            "biography": "hello",
            "edge_followed_by": {"count": 1000},
            "edge_follow": {"count": 0},
            "following_count": 12,
            "media_count": 8,
            "is_verified": true
        });
        let out = user_from_web_profile(&raw);
        assert_eq!(out.id, "42");
        assert_eq!(out.bio, "hello");
        assert_eq!(out.stats.followers, 1000);
        assert_eq!(out.stats.following, 12);
        assert_eq!(out.stats.posts_count, 8);
        assert!(out.is_verified);
        assert!(out.external_url.is_none());
    }

    #[test]
    fn test_typed_user() {
        let out = user(&IgUser {
            pk: "1".to_string(),
            username: "u".to_string(),
            follower_count: Some(3),
            ..Default::default()
        });
        assert_eq!(out.stats.followers, 3);
        assert_eq!(out.stats.posts_count, 0);
        assert_eq!(out.full_name, "");
    }
}
