//! Serde support for backend timestamps.
//!
//! The backend writes `2024-05-01 12:30:45.123Z`; RFC 3339 is accepted too so
//! records produced by other tooling still decode.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const BACKEND_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";

/// Parse a backend timestamp. Empty strings yield `None`.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.fZ") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp the way the backend does.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.format(BACKEND_FORMAT).to_string()
}

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(dt))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_backend_format() {
        let dt = parse("2025-02-05 17:30:41.123Z").unwrap();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.hour(), 17);
        assert_eq!(dt.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn parses_rfc3339() {
        let dt = parse("2025-02-05T17:30:41Z").unwrap();
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn empty_is_none() {
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
    }

    #[test]
    fn format_matches_backend() {
        let dt = parse("2025-02-05 17:30:41.120Z").unwrap();
        assert_eq!(format(&dt), "2025-02-05 17:30:41.120Z");
    }
}
