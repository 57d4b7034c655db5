//! Canonical values bridging the two stores' native type systems.
//!
//! Every value that leaves a store adapter is one of the five kinds below.
//! Store-specific types (time-based UUIDs, driver date types, numeric
//! subtypes) are folded into these by the store's normalizer and unfolded
//! again by the other store's converter.

use crate::timestamp::LogicalTimestamp;
use std::fmt;

/// A store-agnostic field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalValue {
    /// Opaque, stable entity key in its canonical string form.
    Identifier(String),

    /// A point in time (the `tmstmp` clock, or any other datetime field).
    Timestamp(LogicalTimestamp),

    /// Signed integer of any native width.
    Integer(i64),

    /// Plain text.
    Text(String),

    /// String encoding of a native value with no canonical counterpart.
    Raw(String),
}

/// The discriminant of a [`CanonicalValue`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Identifier,
    Timestamp,
    Integer,
    Text,
    Raw,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Identifier => "identifier",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Integer => "integer",
            ValueKind::Text => "text",
            ValueKind::Raw => "raw",
        };
        f.write_str(name)
    }
}

impl CanonicalValue {
    pub fn identifier(value: impl Into<String>) -> Self {
        Self::Identifier(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }

    /// Text that is promoted to a timestamp when it parses as ISO-8601.
    pub fn text_or_timestamp(value: impl Into<String>) -> Self {
        let value = value.into();
        match LogicalTimestamp::parse_iso8601(&value) {
            Some(ts) => Self::Timestamp(ts),
            None => Self::Text(value),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Identifier(_) => ValueKind::Identifier,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Integer(_) => ValueKind::Integer,
            Self::Text(_) => ValueKind::Text,
            Self::Raw(_) => ValueKind::Raw,
        }
    }

    pub fn as_timestamp(&self) -> Option<LogicalTimestamp> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Borrow the string payload of the string-carrying kinds.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Identifier(s) | Self::Text(s) | Self::Raw(s) => Some(s),
            _ => None,
        }
    }
}

/// The string form every converter falls back to.
impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) | Self::Text(s) | Self::Raw(s) => f.write_str(s),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<LogicalTimestamp> for CanonicalValue {
    fn from(ts: LogicalTimestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<i64> for CanonicalValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}
