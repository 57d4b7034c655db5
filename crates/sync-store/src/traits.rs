//! Store capability trait definitions.
//!
//! These traits abstract over the differences between the stores, allowing
//! the orchestrator to be compiled against a single interface that works
//! with any pairing of source and target.

use crate::SyncError;
use futures::stream::BoxStream;
use sync_core::{Record, Resolution, Window};

/// Single-pass, forward-only stream of records backed by a live cursor.
///
/// The stream suspends the caller whenever the cursor fetches the next page.
/// It cannot be restarted; loading the same table again issues a new query.
pub type RecordStream<'a> = BoxStream<'a, Result<Record, SyncError>>;

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was created or overwrote an older version.
    Applied,
    /// A version at least as new was already stored; nothing changed.
    NoOp,
}

impl From<Resolution> for WriteOutcome {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Apply => WriteOutcome::Applied,
            Resolution::Keep => WriteOutcome::NoOp,
        }
    }
}

/// Opens a [`Store`].
///
/// Implemented by each store's addressing handle (contact points and
/// keyspace, endpoint and index). The orchestrator opens both stores at the
/// start of a run and owns them exclusively until it closes them.
///
/// # Usage Pattern
///
/// The orchestrator uses generics for zero-cost dispatch:
///
/// ```ignore
/// pub async fn run<A: Connect, B: Connect>(source: &A, target: &B) -> Result<(), SyncError> {
///     let a = source.connect().await?;
///     let b = target.connect().await?;
///     // All calls here are statically dispatched after monomorphization
/// }
/// ```
#[async_trait::async_trait]
pub trait Connect: Send + Sync {
    type Store: Store;

    /// Opens a connection or session.
    ///
    /// Fails with [`SyncError::Connection`] when the store is unreachable.
    async fn connect(&self) -> Result<Self::Store, SyncError>;
}

/// The contract every store adapter satisfies.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Human-readable address used in logs and error messages.
    fn name(&self) -> &str;

    /// Enumerates the tables currently visible in the store.
    ///
    /// The result is fetched fresh on every call and carries no ordering
    /// guarantee.
    async fn list_tables(&self) -> Result<Vec<String>, SyncError>;

    /// Streams the records of `table` whose `tmstmp` lies in `window`.
    ///
    /// Fails with [`SyncError::Load`] when the table does not exist or the
    /// query cannot be built. Cursor failures surface as `Err` items.
    async fn load<'a>(
        &'a self,
        table: &'a str,
        window: Window,
    ) -> Result<RecordStream<'a>, SyncError>;

    /// Writes `record` unless a version with the same `id` and an equal or
    /// newer `tmstmp` is already stored.
    ///
    /// Creates the record when its `id` does not exist yet. Fails with
    /// [`SyncError::Write`] on any transport or serialization failure.
    async fn upsert_if_newer(&self, table: &str, record: &Record)
        -> Result<WriteOutcome, SyncError>;

    /// Releases the connection. Calling it more than once is harmless.
    async fn close(&self) -> Result<(), SyncError>;
}
