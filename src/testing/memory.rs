//! In-memory [`Store`] with failure injection.

use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use sync_core::{resolve, Record, Window};
use sync_store::{Connect, RecordStream, Store, SyncError, WriteOutcome};

type Tables = BTreeMap<String, BTreeMap<String, Record>>;

#[derive(Debug, Default)]
struct Faults {
    connect: bool,
    list_tables: bool,
    load: Option<String>,
    write: Option<String>,
    close: bool,
}

#[derive(Debug, Default)]
struct Inner {
    name: String,
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    writes: AtomicUsize,
}

/// A store kept in process memory.
///
/// Clones share the same data, so a test keeps one handle for inspection
/// while the orchestrator connects and closes another. Records of a table are
/// loaded in id order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                ..Inner::default()
            }),
        }
    }

    /// Adds an empty table.
    pub fn with_table(self, table: &str) -> Self {
        lock(&self.inner.tables).entry(table.to_string()).or_default();
        self
    }

    /// Writes `record` unconditionally, as a native client of the store
    /// would. Creates the table if needed.
    pub fn insert(&self, table: &str, record: Record) {
        lock(&self.inner.tables)
            .entry(table.to_string())
            .or_default()
            .insert(record.id().to_string(), record);
    }

    pub fn get(&self, table: &str, id: &str) -> Option<Record> {
        lock(&self.inner.tables).get(table)?.get(id).cloned()
    }

    /// All records of `table`, in id order.
    pub fn records(&self, table: &str) -> Vec<Record> {
        lock(&self.inner.tables)
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Full contents, for comparing two stores.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<Record>> {
        lock(&self.inner.tables)
            .iter()
            .map(|(table, rows)| (table.clone(), rows.values().cloned().collect()))
            .collect()
    }

    pub fn fail_connect(&self) {
        lock(&self.inner.faults).connect = true;
    }

    pub fn fail_list_tables(&self) {
        lock(&self.inner.faults).list_tables = true;
    }

    /// Makes `load` of `table` fail.
    pub fn fail_load(&self, table: &str) {
        lock(&self.inner.faults).load = Some(table.to_string());
    }

    /// Makes the upsert of the record with `id` fail.
    pub fn fail_write(&self, id: &str) {
        lock(&self.inner.faults).write = Some(id.to_string());
    }

    pub fn fail_close(&self) {
        lock(&self.inner.faults).close = true;
    }

    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    /// Number of upserts that changed the store.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connect for MemoryStore {
    type Store = MemoryStore;

    async fn connect(&self) -> Result<MemoryStore, SyncError> {
        if lock(&self.inner.faults).connect {
            return Err(SyncError::connection(&self.inner.name, "injected failure"));
        }
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.clone())
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &str {
        &self.inner.name
    }

    async fn list_tables(&self) -> Result<Vec<String>, SyncError> {
        if lock(&self.inner.faults).list_tables {
            return Err(SyncError::connection(&self.inner.name, "injected failure"));
        }
        Ok(lock(&self.inner.tables).keys().cloned().collect())
    }

    async fn load<'a>(
        &'a self,
        table: &'a str,
        window: Window,
    ) -> Result<RecordStream<'a>, SyncError> {
        if lock(&self.inner.faults).load.as_deref() == Some(table) {
            return Err(SyncError::load(&self.inner.name, table, "injected failure"));
        }
        let records: Vec<Record> = lock(&self.inner.tables)
            .get(table)
            .ok_or_else(|| SyncError::load(&self.inner.name, table, "table does not exist"))?
            .values()
            .filter(|record| window.contains(record.tmstmp()))
            .cloned()
            .collect();
        Ok(futures::stream::iter(records.into_iter().map(Ok)).boxed())
    }

    async fn upsert_if_newer(
        &self,
        table: &str,
        record: &Record,
    ) -> Result<WriteOutcome, SyncError> {
        if lock(&self.inner.faults).write.as_deref() == Some(record.id()) {
            return Err(SyncError::write(
                &self.inner.name,
                table,
                record.id(),
                "injected failure",
            ));
        }
        let mut tables = lock(&self.inner.tables);
        let rows = tables.entry(table.to_string()).or_default();
        let existing = rows.get(record.id()).map(Record::tmstmp);
        let outcome = WriteOutcome::from(resolve(existing, record.tmstmp()));
        if outcome == WriteOutcome::Applied {
            rows.insert(record.id().to_string(), record.clone());
            self.inner.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(outcome)
    }

    async fn close(&self) -> Result<(), SyncError> {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
        if lock(&self.inner.faults).close {
            return Err(SyncError::connection(&self.inner.name, "injected failure"));
        }
        Ok(())
    }
}
