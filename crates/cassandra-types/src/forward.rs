//! Forward conversion: canonical value → CQL value.
//!
//! This is the wide-column store's converter. The target column's declared
//! type decides the native representation; a value that does not fit the
//! column is written in its string form.

use crate::kind::CqlKind;
use crate::timeuuid;
use scylla::value::{Counter, CqlTimestamp, CqlTimeuuid, CqlValue};
use sync_core::{CanonicalValue, LogicalTimestamp, Record};
use uuid::Uuid;

/// Converts `value` for a column of type `kind`.
pub fn convert(value: &CanonicalValue, kind: &CqlKind) -> CqlValue {
    match kind {
        CqlKind::Uuid => match parse_uuid(value) {
            Some(uuid) => CqlValue::Uuid(uuid),
            None => text(value),
        },
        CqlKind::Timeuuid => match to_timeuuid(value) {
            Some(uuid) => CqlValue::Timeuuid(CqlTimeuuid::from(uuid)),
            None => text(value),
        },
        CqlKind::Timestamp => match to_instant(value) {
            Some(ts) => CqlValue::Timestamp(CqlTimestamp(ts.as_millis())),
            None => text(value),
        },
        CqlKind::TinyInt => to_integer(value)
            .and_then(|i| i8::try_from(i).ok())
            .map_or_else(|| text(value), CqlValue::TinyInt),
        CqlKind::SmallInt => to_integer(value)
            .and_then(|i| i16::try_from(i).ok())
            .map_or_else(|| text(value), CqlValue::SmallInt),
        CqlKind::Int => to_integer(value)
            .and_then(|i| i32::try_from(i).ok())
            .map_or_else(|| text(value), CqlValue::Int),
        CqlKind::BigInt => match value {
            CanonicalValue::Timestamp(ts) => CqlValue::BigInt(ts.as_millis()),
            _ => to_integer(value).map_or_else(|| text(value), CqlValue::BigInt),
        },
        CqlKind::Counter => {
            to_integer(value).map_or_else(|| text(value), |i| CqlValue::Counter(Counter(i)))
        }
        CqlKind::Float => value
            .to_string()
            .parse::<f32>()
            .map_or_else(|_| text(value), CqlValue::Float),
        CqlKind::Double => value
            .to_string()
            .parse::<f64>()
            .map_or_else(|_| text(value), CqlValue::Double),
        CqlKind::Boolean => value
            .to_string()
            .parse::<bool>()
            .map_or_else(|_| text(value), CqlValue::Boolean),
        CqlKind::Text | CqlKind::Other(_) => text(value),
    }
}

/// Converts the fields of `record` in iteration order.
///
/// `kinds` must hold the column type of each field in the same order as
/// [`Record::fields`].
pub fn to_parameters<'r>(record: &'r Record, kinds: &[CqlKind]) -> Vec<(&'r str, CqlValue)> {
    record
        .fields()
        .zip(kinds)
        .map(|((name, value), kind)| (name, convert(value, kind)))
        .collect()
}

fn text(value: &CanonicalValue) -> CqlValue {
    match value {
        CanonicalValue::Timestamp(ts) => CqlValue::Text(ts.to_iso8601()),
        other => CqlValue::Text(other.to_string()),
    }
}

fn parse_uuid(value: &CanonicalValue) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}

fn to_timeuuid(value: &CanonicalValue) -> Option<Uuid> {
    match value {
        CanonicalValue::Timestamp(ts) => timeuuid::min_timeuuid(*ts),
        other => parse_uuid(other).filter(|uuid| uuid.get_version_num() == 1),
    }
}

fn to_instant(value: &CanonicalValue) -> Option<LogicalTimestamp> {
    match value {
        CanonicalValue::Timestamp(ts) => Some(*ts),
        CanonicalValue::Integer(millis) => LogicalTimestamp::from_millis(*millis),
        other => other.as_str().and_then(LogicalTimestamp::parse_iso8601),
    }
}

fn to_integer(value: &CanonicalValue) -> Option<i64> {
    match value {
        CanonicalValue::Integer(i) => Some(*i),
        other => other.as_str().and_then(|s| s.parse().ok()),
    }
}
