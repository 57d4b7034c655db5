//! Progress reporting for synchronization runs.

use crate::sync::{PassReport, SyncReport};
use sync_core::Record;
use sync_store::{SyncError, WriteOutcome};

/// Observer of a run's progress.
///
/// Every hook defaults to doing nothing, so an implementation only overrides
/// what it cares about.
pub trait SyncReporter: Send + Sync {
    fn pass_started(&self, _source: &str, _target: &str) {}

    /// `table` exists in `source` but not in `target`.
    fn table_skipped(&self, _source: &str, _target: &str, _table: &str) {}

    fn table_started(&self, _table: &str) {}

    fn record_written(&self, _table: &str, _record: &Record, _outcome: WriteOutcome) {}

    fn pass_finished(&self, _report: &PassReport) {}

    fn run_finished(&self, _report: &SyncReport) {}

    fn run_failed(&self, _error: &SyncError) {}
}

/// Reporter that forwards progress to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl SyncReporter for TracingReporter {
    fn pass_started(&self, source: &str, target: &str) {
        tracing::info!("Syncing {} -> {}", source, target);
    }

    fn table_skipped(&self, source: &str, target: &str, table: &str) {
        tracing::warn!(
            "Skipping table '{}' of {}: not present in {}",
            table,
            source,
            target
        );
    }

    fn table_started(&self, table: &str) {
        tracing::info!("Syncing table: {}", table);
    }

    fn record_written(&self, table: &str, record: &Record, outcome: WriteOutcome) {
        tracing::debug!(
            "{}/{} @ {}: {:?}",
            table,
            record.id(),
            record.tmstmp(),
            outcome
        );
    }

    fn pass_finished(&self, report: &PassReport) {
        tracing::info!(
            "Finished {} -> {}: {} applied, {} unchanged, {} tables skipped",
            report.source,
            report.target,
            report.applied(),
            report.unchanged(),
            report.skipped.len()
        );
    }

    fn run_finished(&self, report: &SyncReport) {
        tracing::info!(
            "Synchronization of {} completed: {} records applied",
            report.window,
            report.forward.applied() + report.backward.applied()
        );
    }

    fn run_failed(&self, error: &SyncError) {
        tracing::error!("Synchronization failed: {}", error);
    }
}
