//! The logical clock carried by every record in the `tmstmp` field.
//!
//! Both stores resolve time at millisecond granularity, so a
//! [`LogicalTimestamp`] is always truncated to whole milliseconds. This keeps
//! a value stable across a round trip through either store: what one store
//! hands out is exactly what the other one stores and hands back.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fmt;

/// Canonical rendering: fixed width, so lexical order equals time order.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A point in time used both as version key and as conflict-resolution clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalTimestamp(DateTime<Utc>);

impl LogicalTimestamp {
    /// The Unix epoch, used as the lower bound of a first run.
    pub const EPOCH: LogicalTimestamp = LogicalTimestamp(DateTime::<Utc>::UNIX_EPOCH);

    /// Truncates `datetime` to millisecond resolution.
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        let millis = datetime.timestamp_millis();
        // Truncation can only move the instant closer to the epoch, which is
        // always representable.
        Self(DateTime::from_timestamp_millis(millis).unwrap_or(datetime))
    }

    /// Builds a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Renders as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format(ISO_FORMAT).to_string()
    }

    /// Parses a string that looks like an ISO-8601 timestamp.
    ///
    /// Returns `None` when the string does not start with
    /// `YYYY-MM-DDTHH:MM:SS` or when the remainder cannot be parsed. Offsets
    /// are honored; a string without an offset is taken as UTC.
    pub fn parse_iso8601(s: &str) -> Option<Self> {
        if !looks_like_iso8601(s) {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Self::from_datetime(Utc.from_utc_datetime(&naive)));
        }
        None
    }
}

impl From<DateTime<Utc>> for LogicalTimestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

impl fmt::Display for LogicalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Checks the `YYYY-MM-DDTHH:MM:SS` prefix without allocating.
pub fn looks_like_iso8601(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 19 {
        return false;
    }
    bytes[..19].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b'T',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_truncates_to_millis() {
        let dt = Utc
            .with_ymd_and_hms(2021, 1, 15, 10, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let ts = LogicalTimestamp::from_datetime(dt);
        assert_eq!(ts.as_datetime().nanosecond(), 123_000_000);
        assert_eq!(ts.to_iso8601(), "2021-01-15T10:00:00.123Z");
    }

    #[test]
    fn test_pattern_detection() {
        assert!(looks_like_iso8601("2021-01-15T10:00:00"));
        assert!(looks_like_iso8601("2021-01-15T10:00:00.5+02:00"));
        assert!(!looks_like_iso8601("2021-01-15 10:00:00"));
        assert!(!looks_like_iso8601("2021-01-15"));
        assert!(!looks_like_iso8601("Mari"));
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let ts = LogicalTimestamp::parse_iso8601("2021-01-15T10:00:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2021-01-15T10:00:00.000Z");
    }

    #[test]
    fn test_parse_with_offset() {
        let ts = LogicalTimestamp::parse_iso8601("2021-01-15T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2021-01-15T10:00:00.000Z");
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        assert!(LogicalTimestamp::parse_iso8601("2021-13-45T99:00:00").is_none());
    }

    #[test]
    fn test_canonical_rendering_round_trips() {
        let ts = LogicalTimestamp::from_millis(1_610_704_800_250).unwrap();
        let parsed = LogicalTimestamp::parse_iso8601(&ts.to_iso8601()).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn test_lexical_order_matches_time_order() {
        let a = LogicalTimestamp::from_millis(1_000).unwrap();
        let b = LogicalTimestamp::from_millis(999_999_999_999).unwrap();
        assert!(a < b);
        assert!(a.to_iso8601() < b.to_iso8601());
    }
}
