//! Checkpoint storage trait.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for checkpoint storage operations.
///
/// A store holds at most one checkpoint; storing replaces it.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Store a checkpoint in the storage backend.
    async fn store_checkpoint(&self, checkpoint_data: String) -> Result<()>;

    /// Read the checkpoint from the storage backend.
    ///
    /// Returns None if no checkpoint has been stored yet.
    async fn read_checkpoint(&self) -> Result<Option<String>>;
}
