//! Command-line interface for synced
//!
//! # Usage Examples
//!
//! ```bash
//! # Continue from the watermark in ./last
//! synced --keyspace app --index-name people
//!
//! # Re-sync January 2021 with the watermark kept elsewhere
//! synced -k app -i people \
//!   --begin 1609459200 --end 1612137600 \
//!   --watermark-file /var/lib/synced/last
//!
//! # Several contact points
//! synced -k app -i people --cassandra-node 10.0.0.1:9042 --cassandra-node 10.0.0.2:9042
//! ```
//!
//! The run copies Cassandra into Elasticsearch, then Elasticsearch into
//! Cassandra. The watermark file is only rewritten when both passes succeed.

use anyhow::Context;
use cassandra_store::{CassandraConnector, CassandraOpts};
use checkpoint::{SyncManager, Watermark};
use clap::Parser;
use elasticsearch_store::{ElasticsearchConnector, ElasticsearchOpts};
use sync_core::LogicalTimestamp;
use synced::{
    CassandraCliOpts, ElasticsearchCliOpts, SyncConfig, Synchronizer, TracingReporter, WindowOpts,
};

#[derive(Parser)]
#[command(name = "synced")]
#[command(about = "Bidirectional last-write-wins sync between Cassandra and Elasticsearch")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    window: WindowOpts,

    /// Source store (A)
    #[command(flatten)]
    cassandra: CassandraCliOpts,

    /// Target store (B)
    #[command(flatten)]
    elasticsearch: ElasticsearchCliOpts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let watermarks = SyncManager::filesystem(&cli.window.watermark_file);
    let previous = if cli.window.begin.is_none() {
        watermarks
            .read_checkpoint::<Watermark>()
            .await
            .with_context(|| {
                format!(
                    "Failed to read watermark from {:?}",
                    cli.window.watermark_file
                )
            })?
    } else {
        None
    };
    let window = cli.window.resolve(previous, LogicalTimestamp::now())?;
    tracing::info!("Starting synchronization of {}", window);
    if window.is_empty() {
        tracing::warn!("Window {} is empty, no record can match it", window);
    }

    let config = SyncConfig {
        window,
        source: CassandraConnector::new(CassandraOpts::from(&cli.cassandra)),
        target: ElasticsearchConnector::new(ElasticsearchOpts::from(&cli.elasticsearch)),
    };
    let mut synchronizer = Synchronizer::new(config, TracingReporter);
    let report = synchronizer
        .run()
        .await
        .with_context(|| format!("Synchronization of {window} failed"))?;

    tracing::info!(
        "Cassandra -> Elasticsearch: {} applied, {} unchanged",
        report.forward.applied(),
        report.forward.unchanged()
    );
    tracing::info!(
        "Elasticsearch -> Cassandra: {} applied, {} unchanged",
        report.backward.applied(),
        report.backward.unchanged()
    );

    watermarks
        .emit_checkpoint(&Watermark::new(window.end().as_datetime()))
        .await
        .with_context(|| {
            format!(
                "Failed to write watermark to {:?}",
                cli.window.watermark_file
            )
        })?;

    Ok(())
}
