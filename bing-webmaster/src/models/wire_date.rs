//! Decoding of the service's date representations.
//!
//! The JSON API emits Microsoft-style `/Date(1700000000000)/` values,
//! optionally with a `+hhmm`/`-hhmm` offset suffix. RFC 3339 strings are
//! accepted as well so that re-serialized models decode again.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Parses a wire date into UTC.
pub fn parse_wire_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        // The offset only describes the producer's zone; the millis are UTC.
        let millis_end = inner
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '+' || *c == '-')
            .map_or(inner.len(), |(i, _)| i);
        let millis: i64 = inner[..millis_end]
            .parse()
            .map_err(|_| format!("invalid date millis in '{raw}'"))?;
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| format!("date out of range: '{raw}'"));
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid date '{raw}': {e}"))
}

/// Serde adapter for [`parse_wire_date`].
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_microsoft_date() {
        let dt = parse_wire_date("/Date(1700000000000)/").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_parse_microsoft_date_with_offset() {
        let dt = parse_wire_date("/Date(1700000000000-0800)/").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);

        let dt = parse_wire_date("/Date(1700000000000+0200)/").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_parse_negative_millis() {
        let dt = parse_wire_date("/Date(-86400000)/").unwrap();
        assert_eq!(dt.year(), 1969);
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_wire_date("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_wire_date("/Date(abc)/").is_err());
        assert!(parse_wire_date("yesterday").is_err());
    }
}
