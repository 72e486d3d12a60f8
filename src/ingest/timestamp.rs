//! Serde helpers for the `timestamp` field of shipped log lines.
//!
//! The shipper emits RFC 3339 timestamps. Other ISO-8601 extended forms are
//! accepted too: seconds may be omitted, and values without an offset (or bare
//! dates) are interpreted as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("unrecognized timestamp '{0}'")]
    Unrecognized(String),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Minute precision with a numeric offset; full precision is covered by RFC 3339
const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// Parse an ISO-8601 date-time into UTC.
///
/// The date and time must be joined by `T`, and no whitespace is allowed
/// anywhere in the value.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let unrecognized = || TimestampError::Unrecognized(value.to_string());

    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(unrecognized());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(value, OFFSET_FORMAT) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = value.strip_suffix('Z').unwrap_or(value);
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(unrecognized)
}

pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_utc() {
        let dt = parse_timestamp("2025-07-15T12:30:45.123Z").unwrap();
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_parse_rfc3339_with_offset_normalizes_to_utc() {
        let dt = parse_timestamp("2025-07-15T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_without_offset_is_utc() {
        let dt = parse_timestamp("2025-07-15T08:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 7, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_timestamp("2000-07-15").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2000, 7, 15));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_without_seconds() {
        let dt = parse_timestamp("2025-07-15T10:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 7, 15, 10, 0, 0).unwrap());

        let dt = parse_timestamp("2025-07-15T10:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 7, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_without_seconds_with_offset() {
        let dt = parse_timestamp("2025-07-15T10:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 7, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_space_separator() {
        assert!(parse_timestamp("2025-07-15 10:00:00").is_err());
        assert!(parse_timestamp("2025-07-15 10:00:00Z").is_err());
        assert!(parse_timestamp("2025-07-15 10:00").is_err());
    }

    #[test]
    fn test_rejects_surrounding_whitespace() {
        assert!(parse_timestamp("  2025-07-15T10:00:00Z ").is_err());
        assert!(parse_timestamp("2025-07-15T10:00:00Z\n").is_err());
        assert!(parse_timestamp(" 2025-07-15").is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }
}
