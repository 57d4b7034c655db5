//! Last-write-wins.
//!
//! Each store enforces this rule with its own conditional-write primitive,
//! but the decision itself is shared: a write is applied only when no stored
//! version exists or the stored version is strictly older. Ties keep the
//! stored value, so re-delivering a record is always a no-op and the order
//! in which versions arrive does not affect the final state.

use crate::timestamp::LogicalTimestamp;

/// What a conditional write must do with an incoming record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Write the incoming record.
    Apply,
    /// Leave the stored record untouched.
    Keep,
}

pub fn resolve(existing: Option<LogicalTimestamp>, incoming: LogicalTimestamp) -> Resolution {
    match existing {
        Some(stored) if stored >= incoming => Resolution::Keep,
        _ => Resolution::Apply,
    }
}
