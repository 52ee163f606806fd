//! Prioritized field lookup over loosely-shaped JSON
//!
//! Upstream clients return the same entity with different field names
//! (camelCase vs snake_case) and nesting depending on which internal API
//! served it. Normalizers describe each field as an ordered list of
//! candidate keys; the helpers here return the first candidate holding a
//! *truthy* value, so `0`, `""`, `false`, `null` and empty containers fall
//! through to the next key.
//!
//! None of these functions fail. Missing data becomes the type's default.

use serde_json::Value;

static NULL: Value = Value::Null;

/// Truthiness used when probing candidates
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First truthy value among `keys`
pub fn first<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| is_truthy(v))
}

/// Walk nested objects/arrays; numeric segments index into arrays
pub fn path<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Object under `key`, or `Value::Null` so chained lookups stay total
pub fn object<'a>(value: &'a Value, key: &str) -> &'a Value {
    match value.get(key) {
        Some(v) if v.is_object() => v,
        _ => &NULL,
    }
}

/// First non-empty string among `keys`
pub fn first_opt_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// First non-empty string among `keys`, or `""`
pub fn first_str(value: &Value, keys: &[&str]) -> String {
    first_opt_str(value, keys).unwrap_or_default()
}

/// Lenient unsigned integer: JSON numbers (floats truncated) or numeric strings
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First non-zero count among `keys`
pub fn first_opt_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(as_u64)
        .find(|n| *n != 0)
}

/// First non-zero count among `keys`, or `0`
pub fn first_u64(value: &Value, keys: &[&str]) -> u64 {
    first_opt_u64(value, keys).unwrap_or(0)
}

/// Identifier rendered as a string; upstream ids arrive as numbers or strings
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First identifier among `keys`, or `""`
pub fn first_id(value: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter(|v| is_truthy(v))
        .find_map(id_string)
        .unwrap_or_default()
}

/// First boolean flag among `keys`, or `false`
pub fn first_bool(value: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(Value::as_bool)
        .unwrap_or(false)
}

/// URL from either a plain string or a nested `{uri|url|url_list}` object
pub fn avatar_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(_) => first_opt_str(value, &["uri", "url"])
            .or_else(|| path(value, &["url_list", "0"]).and_then(Value::as_str).map(str::to_string)),
        _ => None,
    }
}

/// First avatar-like value among `keys`
pub fn first_avatar(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(avatar_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_skips_falsy_candidates() {
        let v = json!({"a": 0, "b": "", "c": null, "d": "x"});
        assert_eq!(first(&v, &["a", "b", "c", "d"]), Some(&json!("x")));
        assert_eq!(first(&v, &["a", "b"]), None);
    }

    #[test]
    fn test_first_str_priority() {
        let v = json!({"uniqueId": "", "unique_id": "bob"});
        assert_eq!(first_str(&v, &["uniqueId", "unique_id"]), "bob");
        assert_eq!(first_str(&v, &["missing"]), "");
        assert_eq!(first_opt_str(&v, &["missing"]), None);
    }

    #[test]
    fn test_first_u64_lenient() {
        let v = json!({"followerCount": 0, "follower_count": "12", "f": 3.9});
        assert_eq!(first_u64(&v, &["followerCount", "follower_count"]), 12);
        assert_eq!(first_u64(&v, &["f"]), 3);
        assert_eq!(first_u64(&v, &["nope"]), 0);
        assert_eq!(first_u64(&json!({"x": "abc"}), &["x"]), 0);
        assert_eq!(first_u64(&json!({"x": -5}), &["x"]), 0);
    }

    #[test]
    fn test_first_id_accepts_numbers() {
        let v = json!({"cid": "", "id": 7012345678901234567u64});
        assert_eq!(first_id(&v, &["cid", "id"]), "7012345678901234567");
        assert_eq!(first_id(&json!({}), &["id"]), "");
    }

    #[test]
    fn test_path_walks_objects_and_arrays() {
        let v = json!({"image_versions2": {"candidates": [{"url": "u0"}, {"url": "u1"}]}});
        assert_eq!(
            path(&v, &["image_versions2", "candidates", "1", "url"]),
            Some(&json!("u1"))
        );
        assert_eq!(path(&v, &["image_versions2", "candidates", "9"]), None);
        assert_eq!(path(&v, &["image_versions2", "missing", "0"]), None);
    }

    #[test]
    fn test_object_is_total() {
        let v = json!({"stats": 5, "author": {"uniqueId": "a"}});
        assert!(object(&v, "stats").is_null());
        assert!(object(&v, "missing").is_null());
        assert_eq!(first_str(object(&v, "author"), &["uniqueId"]), "a");
    }

    #[test]
    fn test_avatar_url_shapes() {
        assert_eq!(avatar_url(&json!("https://a")), Some("https://a".to_string()));
        assert_eq!(
            avatar_url(&json!({"uri": "", "url": "https://b"})),
            Some("https://b".to_string())
        );
        assert_eq!(
            avatar_url(&json!({"url_list": ["https://c"]})),
            Some("https://c".to_string())
        );
        assert_eq!(avatar_url(&json!(42)), None);
        assert_eq!(avatar_url(&json!({})), None);
    }

    #[test]
    fn test_first_avatar_first_match_wins() {
        let v = json!({"avatarThumb": null, "avatar_thumb": {"uri": "x"}, "avatar": "y"});
        assert_eq!(
            first_avatar(&v, &["avatarThumb", "avatar_thumb", "avatar"]),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_first_bool() {
        let v = json!({"is_private": true, "is_verified": "yes"});
        assert!(first_bool(&v, &["is_private"]));
        assert!(!first_bool(&v, &["is_verified"]));
        assert!(!first_bool(&v, &["missing"]));
    }
}
