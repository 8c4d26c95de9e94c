//! Error types for the storage abstraction layer

use crate::session::{SessionId, SessionStatus};
use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored record could not be read back
    #[error("Corrupted record: {0}")]
    Corrupted(String),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(SessionId),

    /// Another running or paused session occupies the same slot
    #[error("Active session already exists: {existing}")]
    ActiveSessionExists { existing: SessionId },

    /// Conditional update rejected because the record moved on
    #[error("Status mismatch: expected one of {expected:?}, found {actual}")]
    StatusMismatch {
        expected: Vec<SessionStatus>,
        actual: SessionStatus,
    },

    /// Generic error wrapper
    #[error("Storage error: {0}")]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}
