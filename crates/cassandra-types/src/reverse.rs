//! Reverse conversion: CQL value → canonical value.
//!
//! This is the wide-column store's normalizer. It is total: values without a
//! canonical counterpart are stringified into [`CanonicalValue::Raw`] so an
//! unanticipated column type never fails a sync.

use crate::timeuuid;
use scylla::value::{CqlValue, Row};
use sync_core::{CanonicalValue, LogicalTimestamp, Record, RecordError, ID_FIELD, TIMESTAMP_FIELD};
use uuid::Uuid;

/// Normalizes the value of `column`.
///
/// `id` is always an identifier and `tmstmp` a timestamp whenever the native
/// value can represent an instant; other columns map by their CQL type.
pub fn normalize(column: &str, value: CqlValue) -> CanonicalValue {
    match (column, value) {
        (ID_FIELD, value) => CanonicalValue::Identifier(identifier_string(value)),

        (TIMESTAMP_FIELD, CqlValue::Timeuuid(t)) => {
            let uuid = Uuid::from(t);
            match timeuuid::to_timestamp(&uuid) {
                Some(ts) => CanonicalValue::Timestamp(ts),
                None => CanonicalValue::Identifier(uuid.to_string()),
            }
        }

        (_, CqlValue::Uuid(uuid)) => CanonicalValue::Identifier(uuid.to_string()),
        (_, CqlValue::Timeuuid(t)) => CanonicalValue::Identifier(Uuid::from(t).to_string()),
        (_, CqlValue::Timestamp(ts)) => millis_to_value(ts.0),

        (_, CqlValue::TinyInt(i)) => CanonicalValue::Integer(i as i64),
        (_, CqlValue::SmallInt(i)) => CanonicalValue::Integer(i as i64),
        (_, CqlValue::Int(i)) => CanonicalValue::Integer(i as i64),
        (_, CqlValue::BigInt(i)) => CanonicalValue::Integer(i),
        (_, CqlValue::Counter(c)) => CanonicalValue::Integer(c.0),

        (_, CqlValue::Text(s)) | (_, CqlValue::Ascii(s)) => CanonicalValue::text_or_timestamp(s),

        (_, CqlValue::Boolean(b)) => CanonicalValue::Raw(b.to_string()),
        (_, CqlValue::Float(f)) => CanonicalValue::Raw(f.to_string()),
        (_, CqlValue::Double(f)) => CanonicalValue::Raw(f.to_string()),
        (_, other) => CanonicalValue::Raw(format!("{other:?}")),
    }
}

fn millis_to_value(millis: i64) -> CanonicalValue {
    match LogicalTimestamp::from_millis(millis) {
        Some(ts) => CanonicalValue::Timestamp(ts),
        None => CanonicalValue::Raw(millis.to_string()),
    }
}

fn identifier_string(value: CqlValue) -> String {
    match value {
        CqlValue::Uuid(uuid) => uuid.to_string(),
        CqlValue::Timeuuid(t) => Uuid::from(t).to_string(),
        CqlValue::Text(s) | CqlValue::Ascii(s) => s,
        CqlValue::TinyInt(i) => i.to_string(),
        CqlValue::SmallInt(i) => i.to_string(),
        CqlValue::Int(i) => i.to_string(),
        CqlValue::BigInt(i) => i.to_string(),
        other => format!("{other:?}"),
    }
}

/// Normalizes a whole row. `columns` holds the result set's column names in
/// row order. Null cells are left out of the record.
pub fn row_to_record(columns: &[String], row: Row) -> Result<Record, RecordError> {
    let fields = columns
        .iter()
        .zip(row.columns)
        .filter_map(|(name, cell)| match cell {
            None | Some(CqlValue::Empty) => None,
            Some(value) => Some((name.clone(), normalize(name, value))),
        });
    Record::try_from_fields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scylla::value::{Counter, CqlTimestamp, CqlTimeuuid};
    use sync_core::ValueKind;

    fn ts(iso: &str) -> LogicalTimestamp {
        LogicalTimestamp::parse_iso8601(iso).unwrap()
    }

    fn timeuuid_at(iso: &str) -> CqlTimeuuid {
        CqlTimeuuid::from(timeuuid::min_timeuuid(ts(iso)).unwrap())
    }

    #[test]
    fn test_uuid_id_is_identifier() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let v = normalize("id", CqlValue::Uuid(uuid));
        assert_eq!(
            v,
            CanonicalValue::identifier("550e8400-e29b-41d4-a716-446655440000")
        );
    }

    #[test]
    fn test_text_id_is_identifier_not_text() {
        let v = normalize("id", CqlValue::Text("u1".to_string()));
        assert_eq!(v, CanonicalValue::identifier("u1"));
    }

    #[test]
    fn test_integer_id_is_identifier() {
        let v = normalize("id", CqlValue::Int(42));
        assert_eq!(v, CanonicalValue::identifier("42"));
    }

    #[test]
    fn test_version_timeuuid_becomes_timestamp() {
        let v = normalize("tmstmp", CqlValue::Timeuuid(timeuuid_at("2021-01-15T10:00:00")));
        assert_eq!(v, CanonicalValue::Timestamp(ts("2021-01-15T10:00:00")));
    }

    #[test]
    fn test_other_timeuuid_stays_identifier() {
        let v = normalize("session", CqlValue::Timeuuid(timeuuid_at("2021-01-15T10:00:00")));
        assert_eq!(v.kind(), ValueKind::Identifier);
    }

    #[test]
    fn test_timestamp_column() {
        let millis = ts("2021-01-20T00:00:00").as_millis();
        let v = normalize("tmstmp", CqlValue::Timestamp(CqlTimestamp(millis)));
        assert_eq!(v, CanonicalValue::Timestamp(ts("2021-01-20T00:00:00")));

        let v = normalize("created", CqlValue::Timestamp(CqlTimestamp(millis)));
        assert_eq!(v.kind(), ValueKind::Timestamp);
    }

    #[test]
    fn test_bigint_version_is_not_a_clock() {
        // Only timeuuid and timestamp columns can bound a window.
        let v = normalize("tmstmp", CqlValue::BigInt(1_610_704_800_000));
        assert_eq!(v, CanonicalValue::Integer(1_610_704_800_000));

        let columns = vec!["id".to_string(), "tmstmp".to_string()];
        let row = Row {
            columns: vec![
                Some(CqlValue::Text("u1".to_string())),
                Some(CqlValue::BigInt(1_610_704_800_000)),
            ],
        };
        assert!(matches!(
            row_to_record(&columns, row),
            Err(RecordError::WrongKind { field: "tmstmp", .. })
        ));
    }

    #[test]
    fn test_integers_of_every_width() {
        assert_eq!(normalize("a", CqlValue::TinyInt(-3)), CanonicalValue::Integer(-3));
        assert_eq!(normalize("a", CqlValue::SmallInt(300)), CanonicalValue::Integer(300));
        assert_eq!(normalize("a", CqlValue::Int(70_000)), CanonicalValue::Integer(70_000));
        assert_eq!(
            normalize("a", CqlValue::BigInt(9_876_543_210)),
            CanonicalValue::Integer(9_876_543_210)
        );
        assert_eq!(normalize("a", CqlValue::Counter(Counter(7))), CanonicalValue::Integer(7));
    }

    #[test]
    fn test_text_with_iso_prefix_is_promoted() {
        let v = normalize("seen", CqlValue::Text("2021-01-15T10:00:00Z".to_string()));
        assert_eq!(v, CanonicalValue::Timestamp(ts("2021-01-15T10:00:00")));

        let v = normalize("name", CqlValue::Text("Mari".to_string()));
        assert_eq!(v, CanonicalValue::text("Mari"));
    }

    #[test]
    fn test_unrecognized_types_are_raw() {
        assert_eq!(normalize("ok", CqlValue::Boolean(true)), CanonicalValue::raw("true"));
        assert_eq!(normalize("score", CqlValue::Double(1.5)), CanonicalValue::raw("1.5"));
        let v = normalize("blob", CqlValue::Blob(vec![1, 2, 3]));
        assert_eq!(v.kind(), ValueKind::Raw);
    }

    #[test]
    fn test_row_to_record_skips_nulls() {
        let columns = vec!["id".to_string(), "name".to_string(), "tmstmp".to_string()];
        let row = Row {
            columns: vec![
                Some(CqlValue::Text("u1".to_string())),
                None,
                Some(CqlValue::Timeuuid(timeuuid_at("2021-01-15T10:00:00"))),
            ],
        };
        let record = row_to_record(&columns, row).unwrap();
        assert_eq!(record.id(), "u1");
        assert_eq!(record.tmstmp(), ts("2021-01-15T10:00:00"));
        assert_eq!(record.get("name"), None);
    }

    #[test]
    fn test_row_without_version_is_malformed() {
        let columns = vec!["id".to_string(), "tmstmp".to_string()];
        let row = Row {
            columns: vec![Some(CqlValue::Text("u1".to_string())), None],
        };
        assert_eq!(
            row_to_record(&columns, row).unwrap_err(),
            RecordError::MissingField("tmstmp")
        );
    }
}
