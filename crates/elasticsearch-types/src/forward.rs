//! Forward conversion: canonical value → JSON value and painless literal.

use serde_json::{json, Map, Value};
use sync_core::{CanonicalValue, Record};

/// Wrapper for JSON values.
#[derive(Debug, Clone)]
pub struct JsonValue(pub Value);

impl JsonValue {
    /// Get the inner JSON value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<&CanonicalValue> for JsonValue {
    fn from(value: &CanonicalValue) -> Self {
        match value {
            CanonicalValue::Integer(i) => JsonValue(json!(*i)),
            CanonicalValue::Timestamp(ts) => JsonValue(json!(ts.to_iso8601())),
            CanonicalValue::Identifier(s) | CanonicalValue::Text(s) | CanonicalValue::Raw(s) => {
                JsonValue(json!(s))
            }
        }
    }
}

/// Builds the document stored for `record`, including `id` and `tmstmp`.
pub fn record_to_document(record: &Record) -> Value {
    let doc: Map<String, Value> = record
        .fields()
        .map(|(name, value)| (name.to_string(), JsonValue::from(value).into_inner()))
        .collect();
    Value::Object(doc)
}

/// Renders `value` as a painless literal.
///
/// Integers are unquoted, with an `L` suffix outside the `int` range;
/// everything else, timestamps included, is a double-quoted string.
pub fn painless_literal(value: &CanonicalValue) -> String {
    match value {
        CanonicalValue::Integer(i) if i32::try_from(*i).is_ok() => i.to_string(),
        CanonicalValue::Integer(i) => format!("{i}L"),
        CanonicalValue::Timestamp(ts) => quote_painless(&ts.to_iso8601()),
        CanonicalValue::Identifier(s) | CanonicalValue::Text(s) | CanonicalValue::Raw(s) => {
            quote_painless(s)
        }
    }
}

/// Double-quotes `s`, escaping backslashes and double quotes.
pub fn quote_painless(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
