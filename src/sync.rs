//! Bidirectional synchronization between two stores.
//!
//! # Design Overview
//!
//! A run covers one window `(begin, end]` and consists of two passes:
//! 1. Every table of the source store (A) is loaded and each record is
//!    upserted into the same table of the target store (B)
//! 2. The same happens in the opposite direction, B into A
//!
//! Each upsert is conditional on the record being strictly newer than what
//! the receiving store holds, so records copied in pass 1 come back as
//! no-ops in pass 2, and the final state of both stores does not depend on
//! the order in which records are applied.
//!
//! Passes are sequential and records are applied one at a time. The first
//! error aborts the run. Both stores are closed on every exit path.

use crate::reporter::SyncReporter;
use futures::TryStreamExt;
use std::collections::HashSet;
use sync_core::Window;
use sync_store::{Connect, Store, SyncError, WriteOutcome};

/// What to synchronize.
#[derive(Debug, Clone)]
pub struct SyncConfig<A, B> {
    pub window: Window,
    /// Store A, loaded first.
    pub source: A,
    /// Store B.
    pub target: B,
}

/// Lifecycle of a [`Synchronizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Counters for one table of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    /// Records written into the target.
    pub applied: u64,
    /// Records the target already held at an equal or newer version.
    pub unchanged: u64,
}

impl TableReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            applied: 0,
            unchanged: 0,
        }
    }

    fn count(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Applied => self.applied += 1,
            WriteOutcome::NoOp => self.unchanged += 1,
        }
    }
}

/// Outcome of one directional pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub source: String,
    pub target: String,
    pub tables: Vec<TableReport>,
    /// Source tables the target does not have.
    pub skipped: Vec<String>,
}

impl PassReport {
    pub fn applied(&self) -> u64 {
        self.tables.iter().map(|t| t.applied).sum()
    }

    pub fn unchanged(&self) -> u64 {
        self.tables.iter().map(|t| t.unchanged).sum()
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub window: Window,
    /// A into B.
    pub forward: PassReport,
    /// B into A.
    pub backward: PassReport,
}

/// Drives a single run over a [`SyncConfig`].
pub struct Synchronizer<A, B, R> {
    config: SyncConfig<A, B>,
    reporter: R,
    state: SyncState,
}

impl<A, B, R> Synchronizer<A, B, R>
where
    A: Connect,
    B: Connect,
    R: SyncReporter,
{
    pub fn new(config: SyncConfig<A, B>, reporter: R) -> Self {
        Self {
            config,
            reporter,
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Runs both passes. May only be called once.
    pub async fn run(&mut self) -> Result<SyncReport, SyncError> {
        if self.state != SyncState::Idle {
            return Err(SyncError::State(format!(
                "run() requires an idle synchronizer, found {:?}",
                self.state
            )));
        }
        self.state = SyncState::Running;

        let result = self.run_connected().await;
        match &result {
            Ok(report) => {
                self.state = SyncState::Completed;
                self.reporter.run_finished(report);
            }
            Err(e) => {
                self.state = SyncState::Failed;
                self.reporter.run_failed(e);
            }
        }
        result
    }

    async fn run_connected(&self) -> Result<SyncReport, SyncError> {
        let a = self.config.source.connect().await?;
        let b = match self.config.target.connect().await {
            Ok(b) => b,
            Err(e) => {
                close_after_failure(&a).await;
                return Err(e);
            }
        };

        let result = self.both_passes(&a, &b).await;
        match result {
            Ok(report) => {
                let closed_a = a.close().await;
                let closed_b = b.close().await;
                closed_a?;
                closed_b?;
                Ok(report)
            }
            Err(e) => {
                close_after_failure(&a).await;
                close_after_failure(&b).await;
                Err(e)
            }
        }
    }

    async fn both_passes(&self, a: &A::Store, b: &B::Store) -> Result<SyncReport, SyncError> {
        let window = self.config.window;
        let forward = sync_pass(a, b, window, &self.reporter).await?;
        let backward = sync_pass(b, a, window, &self.reporter).await?;
        Ok(SyncReport {
            window,
            forward,
            backward,
        })
    }
}

/// Closes `store` after the run already failed; the original error wins.
async fn close_after_failure<S: Store>(store: &S) {
    if let Err(e) = store.close().await {
        tracing::warn!("Failed to close {}: {}", store.name(), e);
    }
}

/// Copies every record of `source` within `window` into `target`.
///
/// Tables are matched by name; a source table the target does not expose is
/// skipped. Stops at the first error.
pub async fn sync_pass<S, T, R>(
    source: &S,
    target: &T,
    window: Window,
    reporter: &R,
) -> Result<PassReport, SyncError>
where
    S: Store,
    T: Store,
    R: SyncReporter,
{
    reporter.pass_started(source.name(), target.name());

    let mut tables = source.list_tables().await?;
    tables.sort();
    let target_tables: HashSet<String> = target.list_tables().await?.into_iter().collect();

    let mut report = PassReport {
        source: source.name().to_string(),
        target: target.name().to_string(),
        tables: Vec::new(),
        skipped: Vec::new(),
    };

    for table in tables {
        if !target_tables.contains(&table) {
            reporter.table_skipped(source.name(), target.name(), &table);
            report.skipped.push(table);
            continue;
        }

        reporter.table_started(&table);
        let mut table_report = TableReport::new(&table);
        let mut records = source.load(&table, window).await?;
        while let Some(record) = records.try_next().await? {
            let outcome = target.upsert_if_newer(&table, &record).await?;
            reporter.record_written(&table, &record, outcome);
            table_report.count(outcome);
        }
        report.tables.push(table_report);
    }

    reporter.pass_finished(&report);
    Ok(report)
}
