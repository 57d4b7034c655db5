//! JSON type conversions for sync-core canonical values.
//!
//! This crate provides bidirectional conversions between sync-core's
//! [`CanonicalValue`](sync_core::CanonicalValue) and the JSON documents
//! stored in Elasticsearch, plus the painless literals used by scripted
//! updates.
//!
//! # Modules
//!
//! - [`forward`] - Canonical value → JSON value / painless literal (Converter)
//! - [`reverse`] - JSON value → canonical value (Normalizer)
//!
//! # Example
//!
//! ```ignore
//! use elasticsearch_types::{forward, reverse};
//! use sync_core::CanonicalValue;
//!
//! let json = forward::JsonValue::from(&CanonicalValue::Integer(42)).into_inner();
//! assert_eq!(json, serde_json::json!(42));
//!
//! let back = reverse::normalize("n", &json);
//! assert_eq!(back, Some(CanonicalValue::Integer(42)));
//! ```

pub mod forward;
pub mod reverse;

pub use forward::{painless_literal, quote_painless, record_to_document, JsonValue};
pub use reverse::{hit_to_record, normalize};
