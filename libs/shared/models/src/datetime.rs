//! Wire format for timestamps: UTC, second precision, trailing `Z`
//! (`YYYY-MM-DDTHH:MM:SSZ`).

use chrono::{DateTime, NaiveDateTime, SubsecRound, Timelike, Utc};

pub const STRICT_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses a client-supplied timestamp. Only the exact strict form is accepted:
/// no offsets, no fractional seconds, no padding other than zeros, no
/// surrounding whitespace and no leap seconds.
pub fn parse_strict_utc(value: &str) -> Option<DateTime<Utc>> {
    if value.len() != 20 {
        return None;
    }

    let parsed = NaiveDateTime::parse_from_str(value, STRICT_UTC_FORMAT)
        .ok()?
        .and_utc();

    // chrono represents second 60 as an overflowing nanosecond field.
    if parsed.nanosecond() >= 1_000_000_000 {
        return None;
    }

    // chrono accepts space padding and signed years; the canonical rendering
    // must match the input byte for byte.
    if format_strict_utc(&parsed) != value {
        return None;
    }

    Some(parsed)
}

pub fn format_strict_utc(value: &DateTime<Utc>) -> String {
    value.trunc_subsecs(0).format(STRICT_UTC_FORMAT).to_string()
}

/// Serde codec: writes the strict form, reads any RFC 3339 timestamp
/// (PostgREST returns `+00:00` offsets and microseconds).
pub mod strict_utc {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_strict_utc(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}
