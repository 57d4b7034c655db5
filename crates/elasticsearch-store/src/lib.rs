//! Elasticsearch store adapter.
//!
//! Exposes a family of indices sharing a prefix as a [`sync_store::Store`]:
//! table `t` is index `<prefix>-t` and a record is a document whose `_id` is
//! the record id.
//!
//! Loading runs a scroll search over a `query_string` range on `tmstmp`.
//! Conditional writes are a single scripted update with an `upsert`
//! document, so the comparison against the stored version happens on the
//! server.

pub mod query;
pub mod script;
mod store;

pub use store::{ElasticsearchConnector, ElasticsearchOpts, ElasticsearchStore};
