//! Timestamp parsing shared by record fields.
//!
//! Records are written with RFC 3339 UTC timestamps. Older tooling wrote naive
//! ISO-8601 local times without an offset; those are accepted and read as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Seconds since the Unix epoch for 2025-01-01T00:00:00Z.
const LEGACY_EPOCH_SECS: i64 = 1_735_689_600;

/// Creation time assumed for records that carry none.
pub fn legacy_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(LEGACY_EPOCH_SECS, 0).unwrap_or_default()
}

/// Parse an RFC 3339 or naive ISO-8601 timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a timestamp the way record files store it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter for optional record timestamps.
pub(crate) mod optional {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}
