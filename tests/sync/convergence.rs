use crate::{january, user};
use sync_core::{CanonicalValue, Window};
use sync_store::{Store, WriteOutcome};
use synced::sync::sync_pass;
use synced::testing::{ts, MemoryStore};
use synced::{SyncConfig, Synchronizer, TracingReporter};

#[tokio::test]
async fn test_second_identical_upsert_is_noop() {
    let store = MemoryStore::new("b").with_table("users");
    let record = user("u1", "2021-01-15T10:00:00", "Mari");

    assert_eq!(
        store.upsert_if_newer("users", &record).await.unwrap(),
        WriteOutcome::Applied
    );
    assert_eq!(
        store.upsert_if_newer("users", &record).await.unwrap(),
        WriteOutcome::NoOp
    );
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_equal_timestamps_keep_the_stored_version() {
    let store = MemoryStore::new("b").with_table("users");
    store
        .upsert_if_newer("users", &user("u1", "2021-01-15T10:00:00", "first"))
        .await
        .unwrap();

    let outcome = store
        .upsert_if_newer("users", &user("u1", "2021-01-15T10:00:00", "second"))
        .await
        .unwrap();

    assert_eq!(outcome, WriteOutcome::NoOp);
    assert_eq!(
        store.get("users", "u1").unwrap().get("name"),
        Some(&CanonicalValue::text("first"))
    );
}

#[tokio::test]
async fn test_application_order_does_not_matter() {
    let older = user("u1", "2021-01-15T10:00:00", "Mari");
    let newer = user("u1", "2021-01-20T00:00:00", "Mariana");

    let forward = MemoryStore::new("forward").with_table("users");
    forward.upsert_if_newer("users", &older).await.unwrap();
    forward.upsert_if_newer("users", &newer).await.unwrap();

    let reverse = MemoryStore::new("reverse").with_table("users");
    reverse.upsert_if_newer("users", &newer).await.unwrap();
    let outcome = reverse.upsert_if_newer("users", &older).await.unwrap();

    assert_eq!(outcome, WriteOutcome::NoOp);
    assert_eq!(forward.snapshot(), reverse.snapshot());
    assert_eq!(forward.get("users", "u1"), Some(newer));
}

#[tokio::test]
async fn test_load_honors_window_bounds() {
    let a = MemoryStore::new("a").with_table("users");
    let b = MemoryStore::new("b").with_table("users");
    a.insert("users", user("at-begin", "2021-01-01T00:00:00", "excluded"));
    a.insert("users", user("after-begin", "2021-01-01T00:00:00.001", "included"));
    a.insert("users", user("inside", "2021-01-15T10:00:00", "included"));
    a.insert("users", user("at-end", "2021-02-01T00:00:00", "included"));
    a.insert("users", user("after-end", "2021-02-01T00:00:00.001", "excluded"));

    let report = sync_pass(&a, &b, january(), &TracingReporter).await.unwrap();

    let ids: Vec<String> = b
        .records("users")
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    assert_eq!(ids, vec!["after-begin", "at-end", "inside"]);
    assert_eq!(report.applied(), 3);
}

#[tokio::test]
async fn test_empty_window_copies_nothing() {
    let a = MemoryStore::new("a").with_table("users");
    let b = MemoryStore::new("b").with_table("users");
    a.insert("users", user("u1", "2021-01-15T10:00:00", "Mari"));

    let instant = ts("2021-01-15T10:00:00");
    let window = Window::new(instant, instant).unwrap();
    let report = sync_pass(&a, &b, window, &TracingReporter).await.unwrap();

    assert_eq!(report.applied() + report.unchanged(), 0);
    assert!(b.records("users").is_empty());
}

#[tokio::test]
async fn test_second_run_without_external_writes_changes_nothing() {
    let a = MemoryStore::new("a").with_table("users").with_table("posts");
    let b = MemoryStore::new("b").with_table("users").with_table("posts");
    a.insert("users", user("u1", "2021-01-15T10:00:00", "Mari"));
    a.insert("users", user("u2", "2021-01-16T10:00:00", "Jon"));
    a.insert("posts", user("p1", "2021-01-17T10:00:00", "hello"));
    b.insert("users", user("u3", "2021-01-18T10:00:00", "Ana"));
    // Conflicting versions of u2; B's is newer.
    b.insert("users", user("u2", "2021-01-19T10:00:00", "Jonathan"));

    let run = || {
        Synchronizer::new(
            SyncConfig {
                window: january(),
                source: a.clone(),
                target: b.clone(),
            },
            TracingReporter,
        )
    };

    let first = run().run().await.unwrap();
    assert_eq!(first.forward.applied(), 2);
    assert_eq!(first.forward.unchanged(), 1);
    assert_eq!(first.backward.applied(), 2);
    assert_eq!(first.backward.unchanged(), 2);
    assert_eq!(a.snapshot(), b.snapshot());

    let second = run().run().await.unwrap();
    assert_eq!(second.forward.applied(), 0);
    assert_eq!(second.backward.applied(), 0);
    assert_eq!(second.forward.unchanged(), 4);
    assert_eq!(second.backward.unchanged(), 4);
    assert_eq!(
        a.get("users", "u2").unwrap().get("name"),
        Some(&CanonicalValue::text("Jonathan"))
    );
}
