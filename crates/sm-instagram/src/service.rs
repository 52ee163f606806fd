//! Instagram operations exposed to the HTTP layer
//!
//! Several lookups have two strategies. The typed client call is tried
//! first; when it fails (or omits data) the raw private endpoint is used and
//! normalized with the raw-shape normalizers.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use sm_core::models::{
    InstagramComments, InstagramFollowers, InstagramFollowing, InstagramHashtagPosts,
    InstagramLikers, InstagramMedia, InstagramUser, InstagramUserPosts, InstagramUserStories,
};
use sm_core::probe::{self, first_bool, id_string, path};
use sm_core::{Error, InstagramConfig, Pacer, SessionStatus};

use crate::client::{InstagramClient, InstagramClientFactory};
use crate::error::{InstagramError, Result};
use crate::normalize;
use crate::session::InstagramSessionManager;

/// Per-process Instagram context
pub struct InstagramService {
    sessions: InstagramSessionManager,
    pacer: Arc<Pacer>,
}

/// Purely numeric identifiers are primary keys
fn is_media_pk(media_id: &str) -> bool {
    !media_id.is_empty() && media_id.chars().all(|c| c.is_ascii_digit())
}

/// Numeric id as-is, anything else resolved as a shortcode with one upstream call
async fn resolve_media_pk(client: &dyn InstagramClient, media_id: &str) -> Result<String> {
    if is_media_pk(media_id) {
        Ok(media_id.to_string())
    } else {
        client.media_pk_from_code(media_id).await
    }
}

async fn fetch_user(client: &dyn InstagramClient, username: &str) -> Result<InstagramUser> {
    match client.user_info_by_username_v1(username).await {
        Ok(user) => Ok(normalize::user(&user)),
        Err(e) => {
            warn!("V1 user lookup failed: {}, trying raw API...", e);
            let response = client
                .private_request("users/web_profile_info/", &[("username", username.to_string())])
                .await?;
            match path(&response, &["data", "user"]) {
                Some(user) if probe::is_truthy(user) => Ok(normalize::user_from_web_profile(user)),
                _ => Err(InstagramError::NotFound("User not found".to_string())),
            }
        }
    }
}

async fn fetch_posts(client: &dyn InstagramClient, user_id: &str, count: usize) -> Vec<InstagramMedia> {
    match client.user_medias(user_id, count).await {
        Ok(medias) => return medias.iter().map(normalize::media).collect(),
        Err(e) => warn!("Typed media lookup failed: {}, trying V1 feed...", e),
    }

    let endpoint = format!("feed/user/{}/", user_id);
    match client.private_request(&endpoint, &[("count", count.to_string())]).await {
        Ok(response) => raw_list(&response, "items")
            .take(count)
            .map(normalize::media_from_raw)
            .collect(),
        Err(e) => {
            warn!("V1 feed also failed: {}", e);
            Vec::new()
        }
    }
}

/// Raw `media/{pk}/info/` first, typed `media_info` as the fallback
async fn fetch_media(client: &dyn InstagramClient, pk: &str) -> Result<InstagramMedia> {
    let raw = client.private_request(&format!("media/{}/info/", pk), &[]).await;
    match raw.as_ref().map(|response| path(response, &["items", "0"])) {
        Ok(Some(item)) => return Ok(normalize::media_from_raw(item)),
        Ok(None) => warn!("No media found in raw response, trying standard method..."),
        Err(e) => warn!("Raw media lookup failed: {}, trying standard method...", e),
    }

    let media = client.media_info(pk).await?;
    Ok(normalize::media(&media))
}

async fn fetch_comments(
    client: &dyn InstagramClient,
    pk: &str,
    count: usize,
    cursor: Option<&str>,
) -> InstagramComments {
    let mut result = InstagramComments {
        media_id: pk.to_string(),
        ..Default::default()
    };

    match client.media_comments_chunk(pk, count, cursor).await {
        Ok((comments, end_cursor)) => {
            result.comments = comments.iter().map(normalize::comment).collect();
            result.has_more = end_cursor.is_some();
            result.next_cursor = end_cursor;
        }
        Err(e) => {
            warn!("media_comments_chunk failed: {}, trying raw API...", e);
            let mut params = vec![("count", count.to_string())];
            if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
                params.push(("min_id", cursor.to_string()));
            }

            match client.private_request(&format!("media/{}/comments/", pk), &params).await {
                Ok(response) => {
                    result.comments = raw_list(&response, "comments")
                        .map(normalize::comment_from_raw)
                        .collect();
                    result.next_cursor = probe::first(&response, &["next_min_id", "next_max_id"])
                        .and_then(id_string);
                    result.has_more = first_bool(&response, &["has_more_comments"])
                        || result.next_cursor.is_some();
                }
                Err(e) => warn!("Raw comments API also failed: {}", e),
            }
        }
    }

    result.count = result.comments.len();
    result
}

fn raw_list<'a>(response: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    response.get(key).and_then(Value::as_array).into_iter().flatten()
}

impl InstagramService {
    pub fn new(factory: Arc<dyn InstagramClientFactory>, config: InstagramConfig, pacer: Pacer) -> Self {
        let pacer = Arc::new(pacer);
        Self {
            sessions: InstagramSessionManager::new(factory, config, Arc::clone(&pacer)),
            pacer,
        }
    }

    pub fn credentials_configured(&self) -> bool {
        self.sessions.credentials_configured()
    }

    pub async fn status(&self) -> SessionStatus {
        self.sessions.status().await
    }

    /// Log in ahead of the first request
    pub async fn init(&self) -> sm_core::Result<()> {
        self.sessions.ensure_session().await?;
        Ok(())
    }

    async fn ready(&self) -> sm_core::Result<Arc<dyn InstagramClient>> {
        let client = self.sessions.ensure_session().await?;
        self.pacer.pace().await;
        Ok(client)
    }

    pub async fn user(&self, username: &str) -> sm_core::Result<InstagramUser> {
        let client = self.ready().await?;
        let username = username.trim_start_matches('@');
        fetch_user(client.as_ref(), username)
            .await
            .map_err(|e| Error::upstream("Error fetching Instagram user", e))
    }

    pub async fn user_posts(&self, username: &str, count: usize) -> sm_core::Result<InstagramUserPosts> {
        let client = self.ready().await?;
        let username = username.trim_start_matches('@');
        let user_id = client
            .user_id_from_username(username)
            .await
            .map_err(|e| Error::upstream("Error fetching Instagram posts", e))?;

        let posts = fetch_posts(client.as_ref(), &user_id, count).await;
        Ok(InstagramUserPosts {
            username: username.to_string(),
            count: posts.len(),
            posts,
        })
    }

    pub async fn user_stories(&self, username: &str) -> sm_core::Result<InstagramUserStories> {
        let client = self.ready().await?;
        let username = username.trim_start_matches('@');
        let stories = async {
            let user_id = client.user_id_from_username(username).await?;
            client.user_stories(&user_id).await
        }
        .await
        .map_err(|e| Error::upstream("Error fetching Instagram stories", e))?;

        let stories: Vec<_> = stories.iter().map(normalize::story).collect();
        Ok(InstagramUserStories {
            username: username.to_string(),
            count: stories.len(),
            stories,
        })
    }

    pub async fn user_followers(&self, username: &str, count: usize) -> sm_core::Result<InstagramFollowers> {
        let client = self.ready().await?;
        let username = username.trim_start_matches('@');
        let users = async {
            let user_id = client.user_id_from_username(username).await?;
            client.user_followers(&user_id, count).await
        }
        .await
        .map_err(|e| Error::upstream("Error fetching Instagram followers", e))?;

        let followers: Vec<_> = users.iter().map(normalize::follower).collect();
        Ok(InstagramFollowers {
            username: username.to_string(),
            count: followers.len(),
            followers,
        })
    }

    pub async fn user_following(&self, username: &str, count: usize) -> sm_core::Result<InstagramFollowing> {
        let client = self.ready().await?;
        let username = username.trim_start_matches('@');
        let users = async {
            let user_id = client.user_id_from_username(username).await?;
            client.user_following(&user_id, count).await
        }
        .await
        .map_err(|e| Error::upstream("Error fetching Instagram following", e))?;

        let following: Vec<_> = users.iter().map(normalize::follower).collect();
        Ok(InstagramFollowing {
            username: username.to_string(),
            count: following.len(),
            following,
        })
    }

    /// Post by numeric pk or shortcode
    pub async fn post(&self, media_id: &str) -> sm_core::Result<InstagramMedia> {
        let client = self.ready().await?;
        async {
            let pk = resolve_media_pk(client.as_ref(), media_id).await?;
            fetch_media(client.as_ref(), &pk).await
        }
        .await
        .map_err(|e| Error::upstream("Error fetching Instagram post", e))
    }

    /// Post by its public URL
    pub async fn post_by_url(&self, url: &str) -> sm_core::Result<InstagramMedia> {
        let client = self.ready().await?;
        let pk = client.media_pk_from_url(url).await.map_err(|e| match e {
            e @ (InstagramError::InvalidUrl(_) | InstagramError::InvalidShortcode(_)) => {
                Error::InvalidInput(e.to_string())
            }
            e => Error::upstream("Error fetching Instagram post", e),
        })?;

        fetch_media(client.as_ref(), &pk)
            .await
            .map_err(|e| Error::upstream("Error fetching Instagram post", e))
    }

    /// One page of comments; pass the previous `next_cursor` to continue
    pub async fn comments(
        &self,
        media_id: &str,
        count: usize,
        cursor: Option<&str>,
    ) -> sm_core::Result<InstagramComments> {
        let client = self.ready().await?;
        let pk = resolve_media_pk(client.as_ref(), media_id)
            .await
            .map_err(|e| Error::upstream("Error fetching Instagram comments", e))?;

        Ok(fetch_comments(client.as_ref(), &pk, count, cursor).await)
    }

    pub async fn likers(&self, media_id: &str) -> sm_core::Result<InstagramLikers> {
        let client = self.ready().await?;
        let (pk, users) = async {
            let pk = resolve_media_pk(client.as_ref(), media_id).await?;
            let users = client.media_likers(&pk).await?;
            Ok::<_, InstagramError>((pk, users))
        }
        .await
        .map_err(|e| Error::upstream("Error fetching Instagram likers", e))?;

        let likers: Vec<_> = users.iter().map(normalize::follower).collect();
        Ok(InstagramLikers {
            media_id: pk,
            count: likers.len(),
            likers,
        })
    }

    pub async fn hashtag_posts(&self, name: &str, count: usize) -> sm_core::Result<InstagramHashtagPosts> {
        let client = self.ready().await?;
        let name = name.trim_start_matches('#');
        let medias = client
            .hashtag_medias_top(name, count)
            .await
            .map_err(|e| Error::upstream("Error fetching Instagram hashtag posts", e))?;

        let posts: Vec<_> = medias.iter().map(normalize::media).collect();
        Ok(InstagramHashtagPosts {
            hashtag: name.to_string(),
            count: posts.len(),
            posts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Behavior, MockFactory};
    use crate::types::{IgComment, IgMedia, IgUser, IgUserShort};
    use serde_json::json;
    use sm_core::SessionErrorKind;

    struct Fixture {
        factory: Arc<MockFactory>,
        service: InstagramService,
        _dir: tempfile::TempDir,
    }

    fn fixture(behavior: Behavior) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = InstagramConfig {
            session_id: Some("42%3Aabc".to_string()),
            session_file: dir.path().join("session.json").to_string_lossy().into_owned(),
            ..Default::default()
        };
        let factory = Arc::new(MockFactory::new(behavior));
        let service = InstagramService::new(factory.clone(), config, Pacer::disabled("instagram"));
        Fixture {
            factory,
            service,
            _dir: dir,
        }
    }

    fn alice() -> IgUser {
        IgUser {
            pk: "42".to_string(),
            username: "alice".to_string(),
            follower_count: Some(10),
            ..Default::default()
        }
    }

    fn with_alice(mut behavior: Behavior) -> Behavior {
        behavior.users.insert("alice".to_string(), alice());
        behavior
    }

    fn calls_starting_with(f: &Fixture, prefix: &str) -> Vec<String> {
        f.factory
            .calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    #[tokio::test]
    async fn test_user_v1_lookup() {
        let f = fixture(with_alice(Behavior::default()));
        let user = f.service.user("@alice").await.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.stats.followers, 10);
        assert!(calls_starting_with(&f, "private_request").is_empty());
    }

    #[tokio::test]
    async fn test_user_falls_back_to_web_profile() {
        let mut behavior = Behavior::default();
        behavior.raw.insert(
            "users/web_profile_info/".to_string(),
            json!({"data": {"user": {"id": "7", "username": "bob", "edge_followed_by": {"count": 55}}}}),
        );
        let f = fixture(behavior);

        let user = f.service.user("bob").await.unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.stats.followers, 55);
        assert_eq!(
            calls_starting_with(&f, "private_request"),
            ["private_request:users/web_profile_info/?username=bob"]
        );
    }

    #[tokio::test]
    async fn test_user_not_found_anywhere() {
        let mut behavior = Behavior::default();
        behavior
            .raw
            .insert("users/web_profile_info/".to_string(), json!({"data": {"user": {}}}));
        let f = fixture(behavior);

        let err = f.service.user("ghost").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(err.to_string(), "Error fetching Instagram user: User not found");
    }

    #[tokio::test]
    async fn test_posts_typed_then_raw_then_empty() {
        let typed = with_alice(Behavior {
            medias: Some(vec![IgMedia { pk: "1".to_string(), ..Default::default() }]),
            ..Default::default()
        });
        let f = fixture(typed);
        let posts = f.service.user_posts("alice", 12).await.unwrap();
        assert_eq!(posts.count, 1);
        assert_eq!(posts.posts[0].pk, "1");

        let mut raw = with_alice(Behavior::default());
        raw.raw.insert(
            "feed/user/42/".to_string(),
            json!({"items": [{"pk": 2, "media_type": 2}, {"pk": 3}]}),
        );
        let f = fixture(raw);
        let posts = f.service.user_posts("alice", 12).await.unwrap();
        assert_eq!(posts.count, 2);
        assert_eq!(posts.posts[0].pk, "2");
        assert_eq!(
            calls_starting_with(&f, "private_request"),
            ["private_request:feed/user/42/?count=12"]
        );

        let f = fixture(with_alice(Behavior::default()));
        let posts = f.service.user_posts("alice", 12).await.unwrap();
        assert_eq!(posts.username, "alice");
        assert_eq!(posts.count, 0);
        assert!(posts.posts.is_empty());
    }

    #[tokio::test]
    async fn test_posts_unknown_user_is_an_error() {
        let f = fixture(Behavior::default());
        let err = f.service.user_posts("ghost", 5).await.unwrap_err();
        assert!(err.to_string().starts_with("Error fetching Instagram posts: "));
    }

    #[tokio::test]
    async fn test_post_by_shortcode_resolves_once() {
        let mut behavior = Behavior::default();
        behavior.raw.insert(
            "media/90/info/".to_string(),
            json!({"items": [{"pk": 90, "code": "Ba", "like_count": 3}]}),
        );
        let f = fixture(behavior);

        let post = f.service.post("Ba").await.unwrap();
        assert_eq!(post.pk, "90");
        assert_eq!(post.stats.likes, 3);
        assert_eq!(calls_starting_with(&f, "media_pk_from_code"), ["media_pk_from_code:Ba"]);
        assert!(calls_starting_with(&f, "media_info").is_empty());
    }

    #[tokio::test]
    async fn test_post_by_pk_falls_back_to_media_info() {
        let mut behavior = Behavior::default();
        behavior
            .raw
            .insert("media/123/info/".to_string(), json!({"items": []}));
        behavior.media_info.insert(
            "123".to_string(),
            IgMedia {
                pk: "123".to_string(),
                media_type: Some(8),
                ..Default::default()
            },
        );
        let f = fixture(behavior);

        let post = f.service.post("123").await.unwrap();
        assert_eq!(post.pk, "123");
        assert_eq!(post.media_type, sm_core::models::MediaType::Album);
        assert!(calls_starting_with(&f, "media_pk_from_code").is_empty());
        assert_eq!(calls_starting_with(&f, "media_info"), ["media_info:123"]);
    }

    #[tokio::test]
    async fn test_post_by_url() {
        let mut behavior = Behavior::default();
        behavior
            .raw
            .insert("media/90/info/".to_string(), json!({"items": [{"pk": 90}]}));
        let f = fixture(behavior);

        let post = f
            .service
            .post_by_url("https://www.instagram.com/reel/Ba/")
            .await
            .unwrap();
        assert_eq!(post.pk, "90");

        let err = f.service.post_by_url("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_comments_typed_with_cursor() {
        let behavior = Behavior {
            comments: Some((
                vec![IgComment {
                    pk: "c1".to_string(),
                    text: Some("hi".to_string()),
                    ..Default::default()
                }],
                Some("next".to_string()),
            )),
            ..Default::default()
        };
        let f = fixture(behavior);

        let page = f.service.comments("Ba", 50, Some("prev")).await.unwrap();
        assert_eq!(page.media_id, "90");
        assert_eq!(page.count, 1);
        assert_eq!(page.next_cursor.as_deref(), Some("next"));
        assert!(page.has_more);
        assert_eq!(
            calls_starting_with(&f, "media_comments_chunk"),
            ["media_comments_chunk:90:prev"]
        );
    }

    #[tokio::test]
    async fn test_comments_raw_fallback() {
        let mut behavior = Behavior::default();
        behavior.raw.insert(
            "media/123/comments/".to_string(),
            json!({
                "comments": [{"pk": 1, "text": "a"}, {"pk": 2, "text": "b"}],
                "next_max_id": "cursor-2",
                "has_more_comments": false
            }),
        );
        let f = fixture(behavior);

        let page = f.service.comments("123", 20, Some("c1")).await.unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));
        assert!(page.has_more);
        assert_eq!(
            calls_starting_with(&f, "private_request"),
            ["private_request:media/123/comments/?count=20&min_id=c1"]
        );
    }

    #[tokio::test]
    async fn test_comments_both_strategies_fail() {
        let f = fixture(Behavior::default());
        let page = f.service.comments("123", 20, None).await.unwrap();
        assert_eq!(page.media_id, "123");
        assert_eq!(page.count, 0);
        assert!(page.next_cursor.is_none());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_followers_stories_likers_and_hashtag() {
        let short = |pk: &str| IgUserShort {
            pk: pk.to_string(),
            username: format!("user{}", pk),
            ..Default::default()
        };
        let behavior = with_alice(Behavior {
            followers: vec![short("1"), short("2"), short("3")],
            likers: vec![short("9")],
            hashtag: vec![IgMedia::default(), IgMedia::default()],
            ..Default::default()
        });
        let f = fixture(behavior);

        let followers = f.service.user_followers("alice", 2).await.unwrap();
        assert_eq!(followers.count, 2);
        let following = f.service.user_following("alice", 50).await.unwrap();
        assert_eq!(following.following[0].id, "3");
        let stories = f.service.user_stories("alice").await.unwrap();
        assert_eq!(stories.count, 0);

        let likers = f.service.likers("Ba").await.unwrap();
        assert_eq!(likers.media_id, "90");
        assert_eq!(likers.likers[0].username, "user9");

        let tagged = f.service.hashtag_posts("#rust", 20).await.unwrap();
        assert_eq!(tagged.hashtag, "rust");
        assert_eq!(tagged.count, 2);
        assert_eq!(
            calls_starting_with(&f, "hashtag_medias_top"),
            ["hashtag_medias_top:rust"]
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_surface_as_session_error() {
        let factory = Arc::new(MockFactory::new(Behavior::default()));
        let service = InstagramService::new(
            factory,
            InstagramConfig::default(),
            Pacer::disabled("instagram"),
        );

        match service.user("alice").await {
            Err(Error::Session(e)) => assert_eq!(e.kind, SessionErrorKind::NotConfigured),
            other => panic!("expected session error, got {:?}", other.map(|u| u.id)),
        }
        assert!(!service.credentials_configured());
    }
}
