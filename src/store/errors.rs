//! # Document Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    // Caller input
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    // Lookup
    #[error("Document not found: {0}")]
    NotFound(String),

    // Stored data
    #[error("Malformed blob {key}: {reason}")]
    Parse { key: String, reason: String },

    #[error("Storage key already taken: {0}")]
    KeyConflict(String),

    // Backing store
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl StoreError {
    /// Build a parse error for the blob at `key`
    pub fn parse(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Parse {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 400,
            StoreError::InvalidIdentifier(_) => 400,
            StoreError::NotFound(_) => 404,
            StoreError::KeyConflict(_) => 409,
            StoreError::Parse { .. } => 500,
            StoreError::StorageUnavailable(_) => 503,
        }
    }

    /// True when the requested document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// True when the backing store could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::StorageUnavailable(e.to_string())
    }
}
