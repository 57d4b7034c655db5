use crate::{init_tracing, january, user};
use sync_core::CanonicalValue;
use synced::sync::sync_pass;
use synced::testing::{MemoryStore, RecordingReporter, ReportEvent};
use synced::{SyncConfig, SyncState, Synchronizer, TracingReporter};
use sync_store::WriteOutcome;

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

fn name_of(store: &MemoryStore, id: &str) -> Option<CanonicalValue> {
    store.get("users", id)?.get("name").cloned()
}

#[tokio::test]
async fn test_record_only_in_source_is_copied() {
    init_tracing();
    let a = MemoryStore::new("cassandra").with_table("users");
    let b = MemoryStore::new("elasticsearch").with_table("users");
    a.insert("users", user("u1", "2021-01-15T10:00:00", "Mari"));

    let mut sync = synchronizer(&a, &b);
    let report = sync.run().await.unwrap();

    assert_eq!(sync.state(), SyncState::Completed);
    assert_eq!(name_of(&b, "u1"), Some(CanonicalValue::text("Mari")));
    assert_eq!(b.get("users", "u1"), a.get("users", "u1"));

    let forward = report.forward.table("users").unwrap();
    assert_eq!((forward.applied, forward.unchanged), (1, 0));
    // The copy comes straight back in the second pass and changes nothing.
    let backward = report.backward.table("users").unwrap();
    assert_eq!((backward.applied, backward.unchanged), (0, 1));

    let report = synchronizer(&a, &b).run().await.unwrap();
    assert_eq!(report.forward.applied(), 0);
    assert_eq!(report.forward.unchanged(), 1);
    assert_eq!(report.backward.applied(), 0);
}

#[tokio::test]
async fn test_newer_target_version_flows_back() {
    init_tracing();
    let a = MemoryStore::new("cassandra").with_table("users");
    let b = MemoryStore::new("elasticsearch").with_table("users");
    a.insert("users", user("u1", "2021-01-15T10:00:00", "Mari"));
    synchronizer(&a, &b).run().await.unwrap();

    b.insert("users", user("u1", "2021-01-20T00:00:00", "Mariana"));
    let mut sync = synchronizer(&a, &b);
    let report = sync.run().await.unwrap();

    assert_eq!(report.forward.table("users").unwrap().unchanged, 1);
    assert_eq!(report.backward.table("users").unwrap().applied, 1);
    assert_eq!(name_of(&a, "u1"), Some(CanonicalValue::text("Mariana")));
    assert_eq!(
        a.get("users", "u1").unwrap().tmstmp(),
        synced::testing::ts("2021-01-20T00:00:00")
    );

    let events = sync.reporter().events();
    assert!(events.contains(&ReportEvent::RecordWritten {
        table: "users".to_string(),
        id: "u1".to_string(),
        outcome: WriteOutcome::NoOp,
    }));
    assert!(events.contains(&ReportEvent::RecordWritten {
        table: "users".to_string(),
        id: "u1".to_string(),
        outcome: WriteOutcome::Applied,
    }));

    let pass = sync_pass(&a, &b, january(), &TracingReporter).await.unwrap();
    assert_eq!(pass.applied(), 0);
    assert_eq!(pass.unchanged(), 1);
}

#[tokio::test]
async fn test_reporter_sees_both_passes_in_order() {
    let a = MemoryStore::new("a").with_table("users");
    let b = MemoryStore::new("b").with_table("users");
    a.insert("users", user("u1", "2021-01-15T10:00:00", "Mari"));

    let mut sync = synchronizer(&a, &b);
    sync.run().await.unwrap();

    let written = |outcome| ReportEvent::RecordWritten {
        table: "users".to_string(),
        id: "u1".to_string(),
        outcome,
    };
    assert_eq!(
        sync.reporter().events(),
        vec![
            ReportEvent::PassStarted {
                source: "a".to_string(),
                target: "b".to_string()
            },
            ReportEvent::TableStarted {
                table: "users".to_string()
            },
            written(WriteOutcome::Applied),
            ReportEvent::PassFinished,
            ReportEvent::PassStarted {
                source: "b".to_string(),
                target: "a".to_string()
            },
            ReportEvent::TableStarted {
                table: "users".to_string()
            },
            written(WriteOutcome::NoOp),
            ReportEvent::PassFinished,
            ReportEvent::RunFinished,
        ]
    );
}

#[tokio::test]
async fn test_tables_missing_in_target_are_skipped() {
    let a = MemoryStore::new("a").with_table("users").with_table("orders");
    let b = MemoryStore::new("b").with_table("users").with_table("audit");
    a.insert("orders", user("o1", "2021-01-10T00:00:00", "order"));
    b.insert("audit", user("x1", "2021-01-10T00:00:00", "entry"));

    let mut sync = synchronizer(&a, &b);
    let report = sync.run().await.unwrap();

    assert_eq!(report.forward.skipped, vec!["orders".to_string()]);
    assert_eq!(report.backward.skipped, vec!["audit".to_string()]);
    assert!(b.records("orders").is_empty());
    assert!(a.records("audit").is_empty());
    assert!(sync.reporter().events().contains(&ReportEvent::TableSkipped {
        table: "orders".to_string()
    }));
}
