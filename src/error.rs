//! Error types for decoding and assembling snapshots.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while turning raw input into trusted snapshots.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Reading the input failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not valid JSON, or its fields have the wrong types.
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input parsed but does not look like a replica-set snapshot.
    #[error("Unrecognized snapshot shape: {0}")]
    UnrecognizedShape(String),

    /// A member has an empty name.
    #[error("Member #{index} has an empty name")]
    EmptyMemberName { index: usize },

    /// Two members share a name.
    #[error("Duplicate member: {name}")]
    DuplicateMember { name: String },

    /// A member reports a state code outside the known range.
    #[error("Member {name} has unrecognized state code {code}")]
    UnknownState { name: String, code: i32 },

    /// A member's optime has no recognizable timestamp.
    #[error("Member {name} has an unrecognized optime")]
    UnrecognizedOptime { name: String },

    /// A snapshot is older than the one before it.
    #[error("Snapshot dated {current} precedes previous snapshot dated {previous}")]
    OutOfOrder {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

impl DecodeError {
    /// Whether this error concerns the content of an otherwise readable
    /// snapshot, as opposed to I/O or syntax.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DecodeError::EmptyMemberName { .. }
                | DecodeError::DuplicateMember { .. }
                | DecodeError::UnknownState { .. }
                | DecodeError::UnrecognizedOptime { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
