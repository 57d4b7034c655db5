//! Synchronization engine tests
//!
//! Drive full runs over in-memory stores, covering convergence, the
//! two-pass scenarios and failure handling.

mod convergence;
mod failures;
mod scenarios;

use sync_core::{Record, Window};
use synced::testing::ts;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("synced=debug")
        .try_init()
        .ok();
}

pub fn user(id: &str, tmstmp: &str, name: &str) -> Record {
    Record::builder(id, ts(tmstmp))
        .text("name", name)
        .build()
        .unwrap()
}

/// `(2021-01-01T00:00:00, 2021-02-01T00:00:00]`
pub fn january() -> Window {
    Window::new(ts("2021-01-01T00:00:00"), ts("2021-02-01T00:00:00")).unwrap()
}
