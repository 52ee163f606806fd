//! Epoch timestamp normalization
//!
//! Upstream timestamps are epoch seconds, sometimes as strings. Conversion
//! never fails: mandatory fields degrade to a fallback instant, optional
//! fields degrade to `None`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Outcome of reading a raw epoch value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Epoch {
    /// Absent, null, empty or zero
    Missing,
    Valid(DateTime<Utc>),
    /// Present but not convertible
    Invalid,
}

/// Interpret a raw JSON value as epoch seconds
pub fn epoch(raw: Option<&Value>) -> Epoch {
    let seconds = match raw {
        None | Some(Value::Null) => return Epoch::Missing,
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) if s.trim().is_empty() => return Epoch::Missing,
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match seconds {
        Some(0) => Epoch::Missing,
        Some(secs) => DateTime::from_timestamp(secs, 0).map_or(Epoch::Invalid, Epoch::Valid),
        None => Epoch::Invalid,
    }
}

/// Mandatory timestamp: Unix epoch when missing, the current time when unparseable
pub fn mandatory(raw: Option<&Value>) -> DateTime<Utc> {
    match epoch(raw) {
        Epoch::Valid(dt) => dt,
        Epoch::Missing => DateTime::<Utc>::UNIX_EPOCH,
        Epoch::Invalid => Utc::now(),
    }
}

/// Optional timestamp: `None` unless the raw value converts cleanly
pub fn optional(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    match epoch(raw) {
        Epoch::Valid(dt) => Some(dt),
        Epoch::Missing | Epoch::Invalid => None,
    }
}

/// ISO-8601 rendering used in every `*_iso` field
pub fn iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// ISO-8601 rendering, `""` when absent
pub fn iso_opt(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(iso).unwrap_or_default()
}
