//! Shortcode ↔ media pk conversion and post URL parsing

use url::Url;

use crate::error::{InstagramError, Result};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Longer codes (private posts) carry a suffix after the pk part
const PK_CODE_LEN: usize = 11;

/// Path prefixes that precede a shortcode
const POST_PREFIXES: &[&str] = &["p", "reel", "reels", "tv"];

/// Decode a shortcode into its numeric media pk
pub fn pk_from_code(code: &str) -> Result<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(InstagramError::InvalidShortcode(code.to_string()));
    }

    let mut pk: u128 = 0;
    for byte in code.bytes().take(PK_CODE_LEN) {
        let digit = ALPHABET
            .iter()
            .position(|&c| c == byte)
            .ok_or_else(|| InstagramError::InvalidShortcode(code.to_string()))?;
        pk = pk * 64 + digit as u128;
    }

    Ok(pk.to_string())
}

/// Extract the shortcode from a post, reel or IGTV URL
pub fn code_from_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&with_scheme).map_err(|_| InstagramError::InvalidUrl(raw.to_string()))?;

    let is_instagram = url
        .host_str()
        .is_some_and(|host| host == "instagram.com" || host.ends_with(".instagram.com") || host == "instagr.am");
    if !is_instagram {
        return Err(InstagramError::InvalidUrl(raw.to_string()));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    segments
        .windows(2)
        .find(|pair| POST_PREFIXES.contains(&pair[0]))
        .map(|pair| pair[1].to_string())
        .ok_or_else(|| InstagramError::InvalidUrl(raw.to_string()))
}

/// URL → media pk
pub fn pk_from_url(url: &str) -> Result<String> {
    pk_from_code(&code_from_url(url)?)
}
