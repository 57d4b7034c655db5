//! Failure kinds of a synchronization run.
//!
//! Every kind is fatal to the run that raises it; there is no per-record
//! retry or skip. The driver error that caused the failure is kept as the
//! source so it can be reported with full context.

use thiserror::Error;

/// Boxed driver error kept as the source of a [`SyncError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The store could not be opened, closed, or used because it is closed.
    #[error("connection to {store} failed: {source}")]
    Connection {
        store: String,
        #[source]
        source: BoxError,
    },

    /// A table could not be queried, or a row could not be read or
    /// normalized while the cursor advanced.
    #[error("loading table '{table}' from {store} failed: {source}")]
    Load {
        store: String,
        table: String,
        #[source]
        source: BoxError,
    },

    /// An upsert could not be performed.
    #[error("writing record '{id}' into {store} table '{table}' failed: {source}")]
    Write {
        store: String,
        table: String,
        id: String,
        #[source]
        source: BoxError,
    },

    /// The orchestrator was driven out of order.
    #[error("invalid run state: {0}")]
    State(String),
}

impl SyncError {
    pub fn connection(store: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            store: store.into(),
            source: source.into(),
        }
    }

    pub fn load(
        store: impl Into<String>,
        table: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Load {
            store: store.into(),
            table: table.into(),
            source: source.into(),
        }
    }

    pub fn write(
        store: impl Into<String>,
        table: impl Into<String>,
        id: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Write {
            store: store.into(),
            table: table.into(),
            id: id.into(),
            source: source.into(),
        }
    }
}
