//! Synced Library
//!
//! Keeps a Cassandra keyspace and a family of Elasticsearch indices
//! mutually consistent over a time window.
//!
//! # Features
//!
//! - Bidirectional synchronization: every run copies Cassandra into
//!   Elasticsearch, then Elasticsearch back into Cassandra
//! - Last-write-wins: a record only replaces a stored version with a
//!   strictly older `tmstmp`, so repeated or reordered runs converge
//! - Watermarks: each completed run records the end of its window so the
//!   next run picks up where it stopped
//!
//! # Store Crates
//!
//! - `cassandra_store` - CQL session with read-before-write upserts
//! - `elasticsearch_store` - REST client with scripted conditional upserts
//!
//! Both implement [`sync_store::Store`], which is all the engine in [`sync`]
//! depends on.
//!
//! # CLI Usage
//!
//! ```bash
//! # Sync everything newer than the stored watermark
//! synced --keyspace app --index-name people
//!
//! # Sync an explicit window
//! synced -k app -i people --begin 1609459200 --end 1612137600
//! ```

use checkpoint::{Checkpoint, Watermark};
use clap::Parser;
use std::path::PathBuf;
use sync_core::{LogicalTimestamp, Window};

pub mod reporter;
pub mod sync;
pub mod testing;

pub use reporter::{SyncReporter, TracingReporter};
pub use sync::{PassReport, SyncConfig, SyncReport, SyncState, Synchronizer, TableReport};

/// Bounds of the window to synchronize.
#[derive(Parser, Clone, Debug)]
pub struct WindowOpts {
    /// Exclusive lower bound, seconds since the epoch (default: the stored watermark)
    #[arg(long, value_parser = parse_epoch_seconds)]
    pub begin: Option<LogicalTimestamp>,

    /// Inclusive upper bound, seconds since the epoch (default: now)
    #[arg(long, value_parser = parse_epoch_seconds)]
    pub end: Option<LogicalTimestamp>,

    /// File holding the end of the last completed window
    #[arg(long, default_value = "last", env = "SYNCED_WATERMARK_FILE")]
    pub watermark_file: PathBuf,
}

impl WindowOpts {
    /// Resolves the window of this run.
    ///
    /// `begin` falls back to the previous watermark, then to the epoch;
    /// `end` falls back to `now`.
    pub fn resolve(
        &self,
        previous: Option<Watermark>,
        now: LogicalTimestamp,
    ) -> anyhow::Result<Window> {
        let begin = self
            .begin
            .or_else(|| previous.map(|w| LogicalTimestamp::from_datetime(w.end)))
            .unwrap_or(LogicalTimestamp::EPOCH);
        let end = self.end.unwrap_or(now);
        Ok(Window::new(begin, end)?)
    }
}

/// Parses decimal seconds since the epoch, e.g. `1612137600` or `1612137600.5`.
pub fn parse_epoch_seconds(s: &str) -> Result<LogicalTimestamp, String> {
    Watermark::from_cli_string(s)
        .map(|w| LogicalTimestamp::from_datetime(w.end))
        .map_err(|e| e.to_string())
}

#[derive(Parser, Clone, Debug)]
pub struct CassandraCliOpts {
    /// Contact point as host:port (repeatable)
    #[arg(
        long = "cassandra-node",
        default_value = "127.0.0.1:9042",
        env = "CASSANDRA_NODES",
        value_delimiter = ','
    )]
    pub cassandra_nodes: Vec<String>,

    /// Keyspace holding the synchronized tables
    #[arg(short = 'k', long, env = "CASSANDRA_KEYSPACE")]
    pub keyspace: String,
}

// CLI type -> Cassandra store library type conversions
impl From<&CassandraCliOpts> for cassandra_store::CassandraOpts {
    fn from(opts: &CassandraCliOpts) -> Self {
        Self {
            nodes: opts.cassandra_nodes.clone(),
            keyspace: opts.keyspace.clone(),
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct ElasticsearchCliOpts {
    /// Elasticsearch endpoint URL
    #[arg(
        long,
        default_value = "http://localhost:9200",
        env = "ELASTICSEARCH_URL"
    )]
    pub elasticsearch_url: String,

    /// Index prefix; table `t` is stored in index `<index-name>-t`
    #[arg(short = 'i', long, env = "ELASTICSEARCH_INDEX")]
    pub index_name: String,

    /// Hits fetched per scroll page
    #[arg(long, default_value = "500")]
    pub page_size: usize,

    /// Scroll context keep-alive between pages
    #[arg(long, default_value = "1m")]
    pub scroll_keep_alive: String,
}

// CLI type -> Elasticsearch store library type conversions
impl From<&ElasticsearchCliOpts> for elasticsearch_store::ElasticsearchOpts {
    fn from(opts: &ElasticsearchCliOpts) -> Self {
        Self {
            url: opts.elasticsearch_url.clone(),
            index_prefix: opts.index_name.clone(),
            page_size: opts.page_size,
            scroll_keep_alive: opts.scroll_keep_alive.clone(),
        }
    }
}
