use crate::{january, user};
use sync_store::SyncError;
use synced::testing::{MemoryStore, RecordingReporter, ReportEvent};
use synced::{SyncConfig, SyncState, Synchronizer};

fn stores() -> (MemoryStore, MemoryStore) {
    let a = MemoryStore::new("a").with_table("users");
    let b = MemoryStore::new("b").with_table("users");
    a.insert("users", user("u0", "2021-01-14T10:00:00", "Ada"));
    a.insert("users", user("u1", "2021-01-15T10:00:00", "Mari"));
    a.insert("users", user("u2", "2021-01-16T10:00:00", "Jon"));
    (a, b)
}

fn synchronizer(
    a: &MemoryStore,
    b: &MemoryStore,
) -> Synchronizer<MemoryStore, MemoryStore, RecordingReporter> {
    Synchronizer::new(
        SyncConfig {
            window: january(),
            source: a.clone(),
            target: b.clone(),
        },
        RecordingReporter::default(),
    )
}

#[tokio::test]
async fn test_target_connect_failure_closes_source() {
    let (a, b) = stores();
    b.fail_connect();

    let mut sync = synchronizer(&a, &b);
    let err = sync.run().await.unwrap_err();

    assert!(matches!(err, SyncError::Connection { .. }));
    assert_eq!(sync.state(), SyncState::Failed);
    assert_eq!(a.connect_count(), 1);
    assert_eq!(a.close_count(), 1);
    assert_eq!(b.close_count(), 0);
}

#[tokio::test]
async fn test_source_connect_failure_opens_nothing() {
    let (a, b) = stores();
    a.fail_connect();

    let mut sync = synchronizer(&a, &b);
    assert!(sync.run().await.is_err());
    assert_eq!(b.connect_count(), 0);
    assert_eq!(a.close_count() + b.close_count(), 0);
}

#[tokio::test]
async fn test_load_failure_aborts_and_closes_both() {
    let (a, b) = stores();
    a.fail_load("users");

    let mut sync = synchronizer(&a, &b);
    let err = sync.run().await.unwrap_err();

    assert!(matches!(err, SyncError::Load { ref table, .. } if table == "users"));
    assert_eq!(sync.state(), SyncState::Failed);
    assert_eq!(a.close_count(), 1);
    assert_eq!(b.close_count(), 1);
    assert!(b.records("users").is_empty());
    assert!(matches!(
        sync.reporter().events().last(),
        Some(ReportEvent::RunFailed(_))
    ));
}

#[tokio::test]
async fn test_write_failure_stops_at_failing_record() {
    let (a, b) = stores();
    b.fail_write("u1");

    let mut sync = synchronizer(&a, &b);
    let err = sync.run().await.unwrap_err();

    assert!(matches!(err, SyncError::Write { ref id, .. } if id == "u1"));
    assert_eq!(sync.state(), SyncState::Failed);
    // Applied before the failure, never reached after it.
    assert!(b.get("users", "u0").is_some());
    assert!(b.get("users", "u2").is_none());
    assert_eq!(a.close_count(), 1);
    assert_eq!(b.close_count(), 1);
}

#[tokio::test]
async fn test_failure_in_second_pass_keeps_first_pass_writes() {
    let (a, b) = stores();
    b.insert("users", user("u9", "2021-01-20T10:00:00", "Eve"));
    a.fail_write("u9");

    let mut sync = synchronizer(&a, &b);
    assert!(sync.run().await.is_err());
    assert_eq!(b.records("users").len(), 4);
    assert!(a.get("users", "u9").is_none());
}

#[tokio::test]
async fn test_list_tables_failure_is_connection_error() {
    let (a, b) = stores();
    b.fail_list_tables();

    let err = synchronizer(&a, &b).run().await.unwrap_err();
    assert!(matches!(err, SyncError::Connection { .. }));
    assert_eq!(a.close_count(), 1);
    assert_eq!(b.close_count(), 1);
}

#[tokio::test]
async fn test_close_failure_after_success_fails_the_run() {
    let (a, b) = stores();
    a.fail_close();

    let mut sync = synchronizer(&a, &b);
    let err = sync.run().await.unwrap_err();

    assert!(matches!(err, SyncError::Connection { .. }));
    assert_eq!(sync.state(), SyncState::Failed);
    // Both passes finished and both stores were still closed.
    assert_eq!(b.records("users").len(), 3);
    assert_eq!(b.close_count(), 1);
}

#[tokio::test]
async fn test_close_failure_after_failure_keeps_original_error() {
    let (a, b) = stores();
    a.fail_load("users");
    b.fail_close();

    let err = synchronizer(&a, &b).run().await.unwrap_err();
    assert!(matches!(err, SyncError::Load { .. }));
    assert_eq!(b.close_count(), 1);
}

#[tokio::test]
async fn test_run_is_single_use() {
    let (a, b) = stores();
    let mut sync = synchronizer(&a, &b);
    sync.run().await.unwrap();

    let err = sync.run().await.unwrap_err();
    assert!(matches!(err, SyncError::State(_)));
    assert_eq!(sync.state(), SyncState::Completed);
    assert_eq!(a.connect_count(), 1);
}
