//! TikTok video URL parsing

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TikTokError};

/// Canonical video URL pattern
static CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tiktok\.com/@[\w.-]+/video/(\d+)").expect("valid regex"));
/// vm.tiktok.com/XXXX short links
static VM_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vm\.tiktok\.com/(\w+)").expect("valid regex"));
/// tiktok.com/t/XXXX short links
static T_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tiktok\.com/t/(\w+)").expect("valid regex"));
/// Any other path ending in /video/<id>
static BARE_VIDEO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/video/(\d+)").expect("valid regex"));

/// What a submitted video URL points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRef {
    /// Numeric video id
    Id(String),
    /// Short link that must be followed to learn the id
    ShortLink(String),
}

/// Extract a video reference from a TikTok URL or bare id
pub fn parse_video_url(url: &str) -> Result<VideoRef> {
    let url = url.trim();

    if let Some(caps) = CANONICAL.captures(url) {
        return Ok(VideoRef::Id(caps[1].to_string()));
    }

    if VM_SHORT.is_match(url) || T_SHORT.is_match(url) {
        let link = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };
        return Ok(VideoRef::ShortLink(link));
    }

    if let Some(caps) = BARE_VIDEO.captures(url) {
        return Ok(VideoRef::Id(caps[1].to_string()));
    }

    if is_video_id(url) {
        return Ok(VideoRef::Id(url.to_string()));
    }

    Err(TikTokError::InvalidUrl(url.to_string()))
}

/// Extract the numeric id from a resolved (canonical) URL
pub fn video_id_from_resolved(url: &str) -> Option<String> {
    CANONICAL
        .captures(url)
        .or_else(|| BARE_VIDEO.captures(url))
        .map(|caps| caps[1].to_string())
}

pub fn is_video_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}
