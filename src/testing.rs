//! Test infrastructure for synchronization runs
//!
//! Provides an in-memory store that honors the same last-write-wins contract
//! as the real adapters, plus helpers to build records and observe a run
//! without a live Cassandra or Elasticsearch.
//!

pub mod memory;
pub mod reporter;

pub use memory::MemoryStore;
pub use reporter::{RecordingReporter, ReportEvent};

use sync_core::LogicalTimestamp;

/// Parses an ISO-8601 instant. Panics on malformed input.
pub fn ts(iso: &str) -> LogicalTimestamp {
    LogicalTimestamp::parse_iso8601(iso).unwrap_or_else(|| panic!("invalid timestamp '{iso}'"))
}
