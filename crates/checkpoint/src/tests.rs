//! Unit tests for the checkpoint crate.

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use crate::{Checkpoint, CheckpointStore, FilesystemStore, SyncManager, Watermark};

/// Test checkpoint type that exercises the trait without the watermark
/// encoding.
#[derive(Clone, Debug, PartialEq)]
struct TestCheckpoint {
    value: i64,
}

impl Checkpoint for TestCheckpoint {
    const CHECKPOINT_TYPE: &'static str = "test";

    fn to_cli_string(&self) -> String {
        format!("test:{}", self.value)
    }

    fn from_cli_string(s: &str) -> anyhow::Result<Self> {
        let value = s
            .strip_prefix("test:")
            .ok_or_else(|| anyhow::anyhow!("Invalid test checkpoint format: expected 'test:N'"))?;
        Ok(Self {
            value: value.parse()?,
        })
    }
}

// ============================================================================
// FilesystemStore Tests
// ============================================================================

#[tokio::test]
async fn test_filesystem_store_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path().join("last"));
    assert_eq!(store.read_checkpoint().await.unwrap(), None);
}

#[tokio::test]
async fn test_filesystem_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last");
    let store = FilesystemStore::new(&path);

    store.store_checkpoint("42".to_string()).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "42\n");
    assert_eq!(store.read_checkpoint().await.unwrap(), Some("42".to_string()));

    // Storing replaces, and leaves no temporary file behind.
    store.store_checkpoint("43".to_string()).await.unwrap();
    assert_eq!(store.read_checkpoint().await.unwrap(), Some("43".to_string()));
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_filesystem_store_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("synced").join("last");
    let store = FilesystemStore::new(&path);
    store.store_checkpoint("1".to_string()).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_filesystem_store_blank_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last");
    std::fs::write(&path, "  \n").unwrap();
    let store = FilesystemStore::new(&path);
    assert_eq!(store.read_checkpoint().await.unwrap(), None);
}

// ============================================================================
// SyncManager Tests
// ============================================================================

#[tokio::test]
async fn test_sync_manager_typed_roundtrip() {
    let dir = TempDir::new().unwrap();
    let manager = SyncManager::filesystem(dir.path().join("last"));

    let none: Option<TestCheckpoint> = manager.read_checkpoint().await.unwrap();
    assert!(none.is_none());

    manager
        .emit_checkpoint(&TestCheckpoint { value: 7 })
        .await
        .unwrap();
    let loaded: Option<TestCheckpoint> = manager.read_checkpoint().await.unwrap();
    assert_eq!(loaded, Some(TestCheckpoint { value: 7 }));
}

#[tokio::test]
async fn test_sync_manager_watermark_file_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last");
    let manager = SyncManager::filesystem(&path);

    let end = Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap();
    manager.emit_checkpoint(&Watermark::new(end)).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "1612137600.000\n");

    let loaded: Option<Watermark> = manager.read_checkpoint().await.unwrap();
    assert_eq!(loaded, Some(Watermark::new(end)));
}

#[tokio::test]
async fn test_sync_manager_reads_legacy_watermark() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last");
    std::fs::write(&path, "1612137600.0").unwrap();

    let manager = SyncManager::filesystem(&path);
    let loaded: Watermark = manager.read_checkpoint().await.unwrap().unwrap();
    assert_eq!(loaded.end, Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn test_sync_manager_rejects_corrupt_checkpoint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("last");
    std::fs::write(&path, "not a number").unwrap();

    let manager = SyncManager::filesystem(&path);
    let err = manager.read_checkpoint::<Watermark>().await.unwrap_err();
    assert!(err.to_string().contains("Invalid watermark checkpoint"));
}
