//! [`Store`] over a CQL session.

use crate::cql;
use cassandra_types::{forward, normalize, row_to_record, CqlKind};
use futures::{StreamExt, TryStreamExt};
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::prepared::PreparedStatement;
use scylla::value::{CqlTimestamp, CqlValue, Row};
use std::sync::{Arc, Mutex};
use sync_core::{
    resolve, LogicalTimestamp, Record, Resolution, Window, ID_FIELD, TIMESTAMP_FIELD,
};
use sync_store::{BoxError, Connect, RecordStream, Store, SyncError, WriteOutcome};

/// Connection options (library type without clap).
#[derive(Clone, Debug)]
pub struct CassandraOpts {
    /// Contact points as `host:port`.
    pub nodes: Vec<String>,
    pub keyspace: String,
}

/// Addressing handle for a keyspace.
#[derive(Clone, Debug)]
pub struct CassandraConnector {
    opts: CassandraOpts,
}

impl CassandraConnector {
    pub fn new(opts: CassandraOpts) -> Self {
        Self { opts }
    }

    fn name(&self) -> String {
        format!(
            "cassandra://{}/{}",
            self.opts.nodes.join(","),
            self.opts.keyspace
        )
    }
}

#[async_trait::async_trait]
impl Connect for CassandraConnector {
    type Store = CassandraStore;

    async fn connect(&self) -> Result<CassandraStore, SyncError> {
        let name = self.name();
        tracing::debug!("Connecting to {}", name);
        let session = SessionBuilder::new()
            .known_nodes(&self.opts.nodes)
            .use_keyspace(&self.opts.keyspace, false)
            .build()
            .await
            .map_err(|e| SyncError::connection(&name, e))?;
        tracing::info!("Connected to {}", name);
        Ok(CassandraStore {
            name,
            keyspace: self.opts.keyspace.clone(),
            session: Mutex::new(Some(Arc::new(session))),
        })
    }
}

/// An open session bound to one keyspace.
pub struct CassandraStore {
    name: String,
    keyspace: String,
    session: Mutex<Option<Arc<Session>>>,
}

impl CassandraStore {
    fn session(&self) -> Result<Arc<Session>, SyncError> {
        let guard = self.session.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .clone()
            .ok_or_else(|| SyncError::connection(&self.name, "session is closed"))
    }

    /// Type of the version column of `table`, from cluster metadata.
    async fn version_kind(&self, session: &Session, table: &str) -> Result<CqlKind, SyncError> {
        session
            .refresh_metadata()
            .await
            .map_err(|e| SyncError::load(&self.name, table, e))?;
        let cluster = session.get_cluster_state();
        let column = cluster
            .get_keyspace(&self.keyspace)
            .and_then(|ks| ks.tables.get(table))
            .ok_or_else(|| SyncError::load(&self.name, table, "table does not exist"))?
            .columns
            .get(TIMESTAMP_FIELD)
            .ok_or_else(|| SyncError::load(&self.name, table, "table has no tmstmp column"))?;
        Ok(CqlKind::from(&column.typ))
    }

    async fn prepare(
        &self,
        session: &Session,
        statement: String,
    ) -> Result<PreparedStatement, scylla::errors::PrepareError> {
        tracing::trace!("Preparing: {}", statement);
        session.prepare(statement).await
    }

    /// Newest stored version of `id`, if any.
    async fn stored_version(
        &self,
        session: &Session,
        table: &str,
        record: &Record,
    ) -> Result<Option<LogicalTimestamp>, SyncError> {
        let write_err = |e: BoxError| SyncError::write(&self.name, table, record.id(), e);

        let prepared = self
            .prepare(session, cql::select_versions(table))
            .await
            .map_err(|e| write_err(e.into()))?;
        let id_kind = bind_kinds(&prepared).into_iter().next().unwrap_or(CqlKind::Text);
        let id = record
            .get(ID_FIELD)
            .map(|v| forward::convert(v, &id_kind))
            .unwrap_or(CqlValue::Empty);

        let rows = session
            .execute_unpaged(&prepared, (id,))
            .await
            .map_err(|e| write_err(e.into()))?
            .into_rows_result()
            .map_err(|e| write_err(e.into()))?;
        let mut versions = Vec::new();
        for row in rows.rows::<Row>().map_err(|e| write_err(e.into()))? {
            let row = row.map_err(|e| write_err(e.into()))?;
            if let Some(Some(value)) = row.columns.into_iter().next() {
                versions.push(normalize(TIMESTAMP_FIELD, value));
            }
        }
        Ok(cql::newest_version(&versions))
    }
}

fn bind_kinds(prepared: &PreparedStatement) -> Vec<CqlKind> {
    prepared
        .get_variable_col_specs()
        .iter()
        .map(|spec| CqlKind::from(spec.typ()))
        .collect()
}

#[async_trait::async_trait]
impl Store for CassandraStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tables(&self) -> Result<Vec<String>, SyncError> {
        let session = self.session()?;
        session
            .refresh_metadata()
            .await
            .map_err(|e| SyncError::connection(&self.name, e))?;
        let cluster = session.get_cluster_state();
        let keyspace = cluster.get_keyspace(&self.keyspace).ok_or_else(|| {
            SyncError::connection(
                &self.name,
                format!("keyspace '{}' does not exist", self.keyspace),
            )
        })?;
        let tables: Vec<String> = keyspace.tables.keys().cloned().collect();
        tracing::debug!("Found {} tables in {}", tables.len(), self.name);
        Ok(tables)
    }

    async fn load<'a>(
        &'a self,
        table: &'a str,
        window: Window,
    ) -> Result<RecordStream<'a>, SyncError> {
        let session = self.session()?;
        let version = self.version_kind(&session, table).await?;
        let statement = cql::select_window(table, &version).ok_or_else(|| {
            SyncError::load(
                &self.name,
                table,
                format!("tmstmp column of type {version:?} cannot bound a window"),
            )
        })?;
        let prepared = self
            .prepare(&session, statement)
            .await
            .map_err(|e| SyncError::load(&self.name, table, e))?;

        tracing::debug!("Loading {} from {} in {}", table, self.name, window);
        let bounds = (
            CqlTimestamp(window.begin().as_millis()),
            CqlTimestamp(window.end().as_millis()),
        );
        let pager = session
            .execute_iter(prepared, bounds)
            .await
            .map_err(|e| SyncError::load(&self.name, table, e))?;
        let columns: Vec<String> = pager
            .column_specs()
            .iter()
            .map(|spec| spec.name().to_string())
            .collect();
        let rows = pager
            .rows_stream::<Row>()
            .map_err(|e| SyncError::load(&self.name, table, e))?;

        let name = self.name.as_str();
        let records = rows
            .map_err(move |e| SyncError::load(name, table, e))
            .and_then(move |row| {
                let record =
                    row_to_record(&columns, row).map_err(|e| SyncError::load(name, table, e));
                futures::future::ready(record)
            });
        Ok(records.boxed())
    }

    async fn upsert_if_newer(
        &self,
        table: &str,
        record: &Record,
    ) -> Result<WriteOutcome, SyncError> {
        let session = self.session()?;
        let stored = self.stored_version(&session, table, record).await?;
        if resolve(stored, record.tmstmp()) == Resolution::Keep {
            tracing::trace!(
                "Keeping {}/{} at {:?} over {}",
                table,
                record.id(),
                stored,
                record.tmstmp()
            );
            return Ok(WriteOutcome::NoOp);
        }

        let write_err = |e: BoxError| SyncError::write(&self.name, table, record.id(), e);
        let statement = cql::insert(table, record.fields().map(|(name, _)| name));
        let prepared = self
            .prepare(&session, statement)
            .await
            .map_err(|e| write_err(e.into()))?;
        let values: Vec<CqlValue> = forward::to_parameters(record, &bind_kinds(&prepared))
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        session
            .execute_unpaged(&prepared, values)
            .await
            .map_err(|e| write_err(e.into()))?;
        Ok(WriteOutcome::Applied)
    }

    async fn close(&self) -> Result<(), SyncError> {
        let session = self
            .session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if session.is_some() {
            tracing::debug!("Closed {}", self.name);
        }
        Ok(())
    }
}
