//! Data source abstraction for receiving replica-set snapshots.
//!
//! Snapshots arrive from files written by a capture decoder or from a
//! live newline-delimited JSON stream. Every source decodes and validates
//! its input before handing snapshots out.

mod file;
mod stream;

pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

use replset_types::ReplSetStatusDoc;

/// Trait for receiving snapshots from various sources.
///
/// # Example
///
/// ```
/// use replset_doctor::{FileSource, SnapshotSource};
///
/// let mut source = FileSource::new("replset.json");
/// while let Some(snapshot) = source.poll() {
///     println!("{}: {} members", snapshot.date, snapshot.len());
/// }
/// ```
pub trait SnapshotSource: Send + Debug {
    /// Poll for the next snapshot.
    ///
    /// Returns `Some(snapshot)` if one is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<ReplSetStatusDoc>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The error from the most recent read or decode, if any.
    fn error(&self) -> Option<String>;
}
