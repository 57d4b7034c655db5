//! Generic sync manager for checkpoint operations.

use std::path::PathBuf;

use crate::{Checkpoint, CheckpointStore, FilesystemStore};

/// Manager for handling sync operations with checkpoint tracking.
///
/// # Example
///
/// ```rust,ignore
/// use checkpoint::{SyncManager, Watermark};
///
/// let manager = SyncManager::filesystem("last");
///
/// // Load the previous watermark, if any
/// let previous: Option<Watermark> = manager.read_checkpoint().await?;
///
/// // Save a new one
/// manager.emit_checkpoint(&Watermark::new(end)).await?;
/// ```
pub struct SyncManager {
    store: Box<dyn CheckpointStore>,
}

impl SyncManager {
    /// Create a new sync manager backed by `store`.
    pub fn new(store: Box<dyn CheckpointStore>) -> Self {
        Self { store }
    }

    /// Create a sync manager storing its checkpoint in the file at `path`.
    pub fn filesystem(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FilesystemStore::new(path)))
    }

    /// Emit a checkpoint, replacing the stored one.
    ///
    /// This is a **SAVING** operation.
    pub async fn emit_checkpoint<C: Checkpoint>(&self, checkpoint: &C) -> anyhow::Result<()> {
        let line = checkpoint.to_cli_string();
        self.store.store_checkpoint(line.clone()).await?;
        tracing::info!("Emitted {} checkpoint: {}", C::CHECKPOINT_TYPE, line);
        Ok(())
    }

    /// Read and parse the stored checkpoint.
    ///
    /// This is a **LOADING** operation. Returns `None` when nothing has been
    /// stored yet; a stored checkpoint that cannot be parsed is an error.
    pub async fn read_checkpoint<C: Checkpoint>(&self) -> anyhow::Result<Option<C>> {
        let Some(line) = self.store.read_checkpoint().await? else {
            return Ok(None);
        };
        let checkpoint = C::from_cli_string(&line).map_err(|e| {
            anyhow::anyhow!("Invalid {} checkpoint '{line}': {e}", C::CHECKPOINT_TYPE)
        })?;
        tracing::debug!("Read {} checkpoint: {}", C::CHECKPOINT_TYPE, line);
        Ok(Some(checkpoint))
    }
}
