//! CQL statement text.

use cassandra_types::CqlKind;
use sync_core::{CanonicalValue, LogicalTimestamp, ID_FIELD, TIMESTAMP_FIELD};

/// Quotes a table or column name so its case is preserved.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Range query over the version column of `table`.
///
/// Both bounds bind as `timestamp`. A `timeuuid` column compares against
/// `maxTimeuuid()` of each bound so the filter is exact at millisecond
/// resolution. Returns `None` when `version` cannot act as a clock.
pub fn select_window(table: &str, version: &CqlKind) -> Option<String> {
    if !version.is_version_column() {
        return None;
    }
    let (lower, upper) = match version {
        CqlKind::Timeuuid => ("maxTimeuuid(?)", "maxTimeuuid(?)"),
        _ => ("?", "?"),
    };
    let column = quote_identifier(TIMESTAMP_FIELD);
    Some(format!(
        "SELECT * FROM {} WHERE {column} > {lower} AND {column} <= {upper} ALLOW FILTERING",
        quote_identifier(table),
    ))
}

/// Every stored version of one id.
pub fn select_versions(table: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ? ALLOW FILTERING",
        quote_identifier(TIMESTAMP_FIELD),
        quote_identifier(table),
        quote_identifier(ID_FIELD),
    )
}

/// Parameterized insert over `columns`, in the given order.
pub fn insert<'c>(table: &str, columns: impl IntoIterator<Item = &'c str>) -> String {
    let columns: Vec<String> = columns.into_iter().map(quote_identifier).collect();
    let markers = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({markers})",
        quote_identifier(table),
        columns.join(", "),
    )
}

/// The newest instant among normalized `tmstmp` values. Values that are not
/// timestamps are ignored.
pub fn newest_version<'v>(
    versions: impl IntoIterator<Item = &'v CanonicalValue>,
) -> Option<LogicalTimestamp> {
    versions
        .into_iter()
        .filter_map(CanonicalValue::as_timestamp)
        .max()
}
