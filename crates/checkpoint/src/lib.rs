//! Checkpoint management for synced
//!
//! Persists the watermark that bounds the next run's window.
//!
//! # Architecture
//!
//! - The `Checkpoint` trait defines how a checkpoint is rendered to and
//!   parsed from a single line of text
//! - `Watermark` is the checkpoint written after a completed run
//! - `CheckpointStore` abstracts where that line is kept
//! - `SyncManager` ties a store to typed reads and writes
//!
//! ## Storage Backends
//!
//! - `FilesystemStore` - Stores the checkpoint as a one-line text file

mod filesystem;
mod manager;
pub mod store;
mod watermark;

#[cfg(test)]
mod tests;

pub use filesystem::FilesystemStore;
pub use manager::SyncManager;
pub use store::CheckpointStore;
pub use watermark::Watermark;

/// Trait that checkpoint types must implement.
///
/// # Example
///
/// ```rust
/// use checkpoint::Checkpoint;
///
/// #[derive(Debug, Clone)]
/// pub struct Offset(u64);
///
/// impl Checkpoint for Offset {
///     const CHECKPOINT_TYPE: &'static str = "offset";
///
///     fn to_cli_string(&self) -> String {
///         self.0.to_string()
///     }
///
///     fn from_cli_string(s: &str) -> anyhow::Result<Self> {
///         Ok(Self(s.trim().parse()?))
///     }
/// }
/// ```
pub trait Checkpoint: Clone {
    /// Checkpoint type identifier, used in log messages.
    const CHECKPOINT_TYPE: &'static str;

    /// Convert to CLI-friendly string format.
    ///
    /// The returned string should be parseable by `from_cli_string()`.
    /// This format is used for:
    /// - The persisted checkpoint file
    /// - Command-line arguments (e.g., `--begin`)
    fn to_cli_string(&self) -> String;

    /// Parse from CLI string format.
    ///
    /// Should parse the format produced by `to_cli_string()`.
    fn from_cli_string(s: &str) -> anyhow::Result<Self>
    where
        Self: Sized;
}
