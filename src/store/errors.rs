//! # Store Errors
//!
//! Infrastructure failures of the document store. These are distinct from
//! the caller-input failures of the promotion lifecycle and may be retried.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store could not be reached or failed mid-operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A lock guarding a collection was poisoned by a panicking writer
    #[error("Store lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Unique key already present
    #[error("Duplicate key in {collection}: {key}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },
}

impl StoreError {
    /// Whether a caller may retry with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
