//! Conditional update built from painless literals.

use crate::query::VersionMapping;
use elasticsearch_types::{painless_literal, quote_painless, record_to_document};
use serde_json::{json, Value};
use sync_core::{CanonicalValue, Record, TIMESTAMP_FIELD};
use sync_store::WriteOutcome;

/// Reads the stored `tmstmp` as epoch milliseconds into `current`.
///
/// Numbers are taken as milliseconds. Strings are parsed with an offset
/// first and then as a naive UTC date-time; anything else leaves `known`
/// false and the stored document is overwritten.
const STORED_VERSION: &str = "def stored = ctx._source.tmstmp; \
long current = 0L; boolean known = false; \
if (stored instanceof Number) { current = ((Number) stored).longValue(); known = true; } \
else if (stored instanceof String) { \
try { current = ZonedDateTime.parse((String) stored).toInstant().toEpochMilli(); known = true; } \
catch (Exception e1) { \
try { current = LocalDateTime.parse((String) stored).toInstant(ZoneOffset.UTC).toEpochMilli(); known = true; } \
catch (Exception e2) { known = false; } } }";

/// Script that keeps the stored document when its `tmstmp` is at least as
/// new as `params.tmstmp`, and otherwise overwrites every incoming field.
pub fn update_script(record: &Record, mapping: VersionMapping) -> String {
    let mut script = format!(
        "{STORED_VERSION} \
         if (known && current >= ((Number) params.{TIMESTAMP_FIELD}).longValue()) \
         {{ ctx.op = 'none'; }} else {{"
    );
    for (name, value) in record.fields() {
        script.push_str(&format!(
            " ctx._source[{}] = {};",
            quote_painless(name),
            field_literal(name, value, mapping)
        ));
    }
    script.push_str(" }");
    script
}

fn field_literal(name: &str, value: &CanonicalValue, mapping: VersionMapping) -> String {
    match (name, value, mapping) {
        (TIMESTAMP_FIELD, CanonicalValue::Timestamp(ts), VersionMapping::EpochMillis) => {
            format!("{}L", ts.as_millis())
        }
        _ => painless_literal(value),
    }
}

/// Document created when the id does not exist yet.
pub fn upsert_document(record: &Record, mapping: VersionMapping) -> Value {
    let mut doc = record_to_document(record);
    if mapping == VersionMapping::EpochMillis {
        doc[TIMESTAMP_FIELD] = json!(record.tmstmp().as_millis());
    }
    doc
}

/// Body of `POST /<index>/_update/<id>`: the script with the incoming
/// version as epoch milliseconds, plus the upsert document.
pub fn update_body(record: &Record, mapping: VersionMapping) -> Value {
    json!({
        "script": {
            "source": update_script(record, mapping),
            "lang": "painless",
            "params": {
                TIMESTAMP_FIELD: record.tmstmp().as_millis(),
            },
        },
        "upsert": upsert_document(record, mapping),
    })
}

/// Maps the `result` of an update response.
pub fn parse_outcome(result: &str) -> Option<WriteOutcome> {
    match result {
        "created" | "updated" => Some(WriteOutcome::Applied),
        "noop" => Some(WriteOutcome::NoOp),
        _ => None,
    }
}
