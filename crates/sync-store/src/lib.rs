//! Store capability abstraction.
//!
//! This crate defines the [`Store`] and [`Connect`] traits every store
//! adapter implements. The sync engine is written entirely against these
//! traits, so the wide-column and the document store are interchangeable
//! as source or target.
//!
//! The traits exchange sync-core canonical types ([`sync_core::Record`],
//! [`sync_core::Window`]) to avoid coupling the engine to any driver.

mod error;
mod traits;

pub use error::{BoxError, SyncError};
pub use traits::{Connect, RecordStream, Store, WriteOutcome};
