//! Canonical data model for synced.
//!
//! This crate provides the store-agnostic types every store adapter
//! normalizes into and converts out of:
//!
//! - [`CanonicalValue`] - Closed set of value kinds shared by all stores
//! - [`LogicalTimestamp`] - Millisecond-resolution version clock
//! - [`Record`] - Field map with a mandatory `id` and `tmstmp`
//! - [`Window`] - The `(begin, end]` interval a run synchronizes
//! - [`resolve`] - The last-write-wins rule
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── sync-store            (store capability traits)
//!    ├─── cassandra-types       (CQL values <-> canonical values)
//!    └─── elasticsearch-types   (JSON / painless <-> canonical values)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::{CanonicalValue, LogicalTimestamp, Record};
//!
//! let tmstmp = LogicalTimestamp::parse_iso8601("2021-01-15T10:00:00").unwrap();
//! let record = Record::builder("u1", tmstmp).text("name", "Mari").build().unwrap();
//! assert_eq!(record.get("name"), Some(&CanonicalValue::text("Mari")));
//! ```

pub mod conflict;
pub mod record;
pub mod timestamp;
pub mod values;
pub mod window;

pub use conflict::{resolve, Resolution};
pub use record::{Record, RecordBuilder, RecordError, ID_FIELD, TIMESTAMP_FIELD};
pub use timestamp::{looks_like_iso8601, LogicalTimestamp};
pub use values::{CanonicalValue, ValueKind};
pub use window::{Window, WindowError};
