//! Error types for the deptcal engine.

use thiserror::Error;

/// Errors that can occur while persisting or deleting events.
#[derive(Error, Debug)]
pub enum DeptCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound { collection: String, id: String },

    #[error("Batch of {size} operations exceeds the store limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Chunk {chunk} failed after {committed_ops} operations were committed: {source}")]
    ChunkFailed {
        chunk: usize,
        committed_ops: usize,
        source: Box<DeptCalError>,
    },

    #[error("Departments '{first}' and '{second}' map to the same document id suffix '{suffix}'")]
    DepartmentIdCollision {
        first: String,
        second: String,
        suffix: String,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for deptcal operations.
pub type DeptCalResult<T> = Result<T, DeptCalError>;
