//! Reverse conversion: JSON value → canonical value.
//!
//! This is the document store's normalizer. JSON has no identifier or
//! datetime type, so the field name and an ISO-8601 check on strings decide
//! the canonical kind.

use serde_json::{Map, Number, Value};
use sync_core::{CanonicalValue, LogicalTimestamp, Record, RecordError, ID_FIELD, TIMESTAMP_FIELD};

/// Normalizes the value of `field`. Returns `None` for JSON `null`.
pub fn normalize(field: &str, value: &Value) -> Option<CanonicalValue> {
    let canonical = match (field, value) {
        (_, Value::Null) => return None,

        (ID_FIELD, Value::String(s)) => CanonicalValue::identifier(s.as_str()),
        (ID_FIELD, other) => CanonicalValue::identifier(other.to_string()),

        // A numeric version counts milliseconds since the epoch.
        (TIMESTAMP_FIELD, Value::Number(n)) => {
            match n.as_i64().and_then(LogicalTimestamp::from_millis) {
                Some(ts) => CanonicalValue::Timestamp(ts),
                None => CanonicalValue::raw(n.to_string()),
            }
        }

        (_, Value::String(s)) => CanonicalValue::text_or_timestamp(s.as_str()),
        (_, Value::Number(n)) => number(n),
        (_, Value::Bool(b)) => CanonicalValue::raw(b.to_string()),
        (_, other @ (Value::Array(_) | Value::Object(_))) => {
            CanonicalValue::raw(other.to_string())
        }
    };
    Some(canonical)
}

fn number(n: &Number) -> CanonicalValue {
    match n.as_i64() {
        Some(i) => CanonicalValue::Integer(i),
        None => CanonicalValue::raw(n.to_string()),
    }
}

/// Normalizes a search hit.
///
/// The record id comes from `_source.id` when present, otherwise from the
/// document's `_id`.
pub fn hit_to_record(doc_id: &str, source: &Map<String, Value>) -> Result<Record, RecordError> {
    let mut fields: Vec<(String, CanonicalValue)> = source
        .iter()
        .filter_map(|(name, value)| normalize(name, value).map(|v| (name.clone(), v)))
        .collect();
    if !fields.iter().any(|(name, _)| name == ID_FIELD) {
        fields.push((ID_FIELD.to_string(), CanonicalValue::identifier(doc_id)));
    }
    Record::try_from_fields(fields)
}
