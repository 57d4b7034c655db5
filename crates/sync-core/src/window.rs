//! The half-open synchronization window `(begin, end]`.

use crate::timestamp::LogicalTimestamp;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("window begin {begin} is after its end {end}")]
pub struct WindowError {
    pub begin: LogicalTimestamp,
    pub end: LogicalTimestamp,
}

/// Bounds which records a load returns: `begin < tmstmp <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    begin: LogicalTimestamp,
    end: LogicalTimestamp,
}

impl Window {
    pub fn new(begin: LogicalTimestamp, end: LogicalTimestamp) -> Result<Self, WindowError> {
        if begin > end {
            return Err(WindowError { begin, end });
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> LogicalTimestamp {
        self.begin
    }

    pub fn end(&self) -> LogicalTimestamp {
        self.end
    }

    pub fn contains(&self, ts: LogicalTimestamp) -> bool {
        self.begin < ts && ts <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.begin, self.end)
    }
}
