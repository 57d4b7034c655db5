//! Reporter that records every hook call.

use crate::reporter::SyncReporter;
use crate::sync::{PassReport, SyncReport};
use std::sync::Mutex;
use sync_core::Record;
use sync_store::{SyncError, WriteOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    PassStarted { source: String, target: String },
    TableSkipped { table: String },
    TableStarted { table: String },
    RecordWritten { table: String, id: String, outcome: WriteOutcome },
    PassFinished,
    RunFinished,
    RunFailed(String),
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, event: ReportEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

impl SyncReporter for RecordingReporter {
    fn pass_started(&self, source: &str, target: &str) {
        self.push(ReportEvent::PassStarted {
            source: source.to_string(),
            target: target.to_string(),
        });
    }

    fn table_skipped(&self, _source: &str, _target: &str, table: &str) {
        self.push(ReportEvent::TableSkipped {
            table: table.to_string(),
        });
    }

    fn table_started(&self, table: &str) {
        self.push(ReportEvent::TableStarted {
            table: table.to_string(),
        });
    }

    fn record_written(&self, table: &str, record: &Record, outcome: WriteOutcome) {
        self.push(ReportEvent::RecordWritten {
            table: table.to_string(),
            id: record.id().to_string(),
            outcome,
        });
    }

    fn pass_finished(&self, _report: &PassReport) {
        self.push(ReportEvent::PassFinished);
    }

    fn run_finished(&self, _report: &SyncReport) {
        self.push(ReportEvent::RunFinished);
    }

    fn run_failed(&self, error: &SyncError) {
        self.push(ReportEvent::RunFailed(error.to_string()));
    }
}
