//! CQL type conversions for sync-core canonical values.
//!
//! This crate provides bidirectional conversions between sync-core's
//! [`CanonicalValue`](sync_core::CanonicalValue) and the CQL values handled
//! by the Cassandra / ScyllaDB driver.
//!
//! # Modules
//!
//! - [`forward`] - Canonical value → CQL value (Converter)
//! - [`reverse`] - CQL value → canonical value (Normalizer)
//! - [`kind`] - Column types that drive the forward conversion
//! - [`timeuuid`] - Version-1 UUID ↔ logical timestamp
//!
//! # Example
//!
//! ```ignore
//! use cassandra_types::{forward, CqlKind};
//! use sync_core::CanonicalValue;
//!
//! let cql = forward::convert(&CanonicalValue::Integer(42), &CqlKind::Int);
//! assert_eq!(cql, scylla::value::CqlValue::Int(42));
//! ```

pub mod forward;
pub mod kind;
pub mod reverse;
pub mod timeuuid;

pub use kind::CqlKind;
pub use reverse::{normalize, row_to_record};
