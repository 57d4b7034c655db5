//! Filesystem-based checkpoint storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::store::CheckpointStore;

/// Filesystem implementation of CheckpointStore trait.
///
/// Stores the checkpoint as a single line in one file. Writes go to a
/// sibling temporary file that is then renamed over the target, so a reader
/// never sees a partial checkpoint.
pub struct FilesystemStore {
    path: PathBuf,
}

impl FilesystemStore {
    /// Create a new FilesystemStore writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CheckpointStore for FilesystemStore {
    async fn store_checkpoint(&self, checkpoint_data: String) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let temp = self.temp_path();
        std::fs::write(&temp, format!("{checkpoint_data}\n"))
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        std::fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        tracing::debug!("Stored checkpoint to {}", self.path.display());
        Ok(())
    }

    async fn read_checkpoint(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(content.to_string()))
    }
}
