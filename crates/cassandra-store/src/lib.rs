//! Cassandra / ScyllaDB store adapter.
//!
//! Exposes a keyspace as a [`sync_store::Store`]: tables are CQL tables,
//! records are rows keyed by their `id` column and versioned by `tmstmp`
//! (`timeuuid` or `timestamp`).
//!
//! CQL has no compare-and-set on a non-key column, so
//! [`upsert_if_newer`](sync_store::Store::upsert_if_newer) reads every stored
//! version of the id first and only inserts when the incoming record is
//! strictly newer. A concurrent writer between the read and the insert can
//! still win; the next run converges again.

pub mod cql;
mod store;

pub use store::{CassandraConnector, CassandraOpts, CassandraStore};
