//! Search requests and the response shapes read back.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use sync_core::{Window, TIMESTAMP_FIELD};

/// How an index maps `tmstmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMapping {
    /// A `date` field, or not mapped yet. Versions are ISO-8601 strings.
    Date,
    /// A numeric field holding milliseconds since the epoch.
    EpochMillis,
}

impl VersionMapping {
    /// Reads the response of `GET /<index>/_mapping/field/tmstmp`.
    pub fn from_field_mapping(response: &Value) -> Self {
        let field_type = response
            .as_object()
            .into_iter()
            .flat_map(|indices| indices.values())
            .find_map(|index| {
                index["mappings"][TIMESTAMP_FIELD]["mapping"][TIMESTAMP_FIELD]["type"].as_str()
            });
        match field_type {
            Some(
                "long" | "integer" | "short" | "byte" | "unsigned_long" | "double" | "float"
                | "half_float" | "scaled_float",
            ) => VersionMapping::EpochMillis,
            _ => VersionMapping::Date,
        }
    }
}

/// Lucene range over `tmstmp`: exclusive lower bound, inclusive upper bound.
pub fn window_query(window: &Window, mapping: VersionMapping) -> String {
    match mapping {
        VersionMapping::Date => format!(
            "{TIMESTAMP_FIELD}:{{\"{}\" TO \"{}\"]",
            window.begin().to_iso8601(),
            window.end().to_iso8601()
        ),
        VersionMapping::EpochMillis => format!(
            "{TIMESTAMP_FIELD}:{{{} TO {}]",
            window.begin().as_millis(),
            window.end().as_millis()
        ),
    }
}

/// Body of the initial scroll search.
pub fn search_body(window: &Window, mapping: VersionMapping, page_size: usize) -> Value {
    json!({
        "size": page_size,
        "query": {
            "query_string": {
                "query": window_query(window, mapping),
            }
        },
        "sort": ["_doc"],
    })
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    pub hits: Hits,
}

#[derive(Debug, Deserialize)]
pub struct Hits {
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct CatIndex {
    pub index: String,
}

/// Table names of the indices listed by `_cat/indices/<prefix>-*`.
pub fn tables_from_indices(prefix: &str, indices: Vec<CatIndex>) -> Vec<String> {
    let prefix = format!("{prefix}-");
    indices
        .into_iter()
        .filter_map(|cat| cat.index.strip_prefix(&prefix).map(str::to_string))
        .filter(|table| !table.is_empty())
        .collect()
}
