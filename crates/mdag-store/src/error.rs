use mdag_types::ObjectId;

/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested key is not present.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored key could not be mapped back to an object ID.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
