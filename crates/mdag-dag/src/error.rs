//! Error types for DAG construction and resolution.

use mdag_store::StoreError;
use mdag_types::ObjectId;

use crate::object::LinkType;

/// Errors that can occur while building or resolving the DAG.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// The backing store failed. Carried unchanged.
    #[error("storage error: {0}")]
    Storage(#[source] StoreError),

    /// No object is stored under the requested identifier.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// A path segment names no link in its parent tree.
    #[error("no such entry: {path:?}")]
    PathNotFound { path: String },

    /// The path continues below a file.
    #[error("not a directory: {path:?}")]
    NotADirectory { path: String },

    /// The path names a directory where file content was expected.
    #[error("is a directory: {path:?}")]
    IsADirectory { path: String },

    /// Stored bytes do not digest to the key they were fetched by.
    #[error("integrity check failed for {expected}: stored bytes digest to {computed}")]
    Integrity {
        expected: ObjectId,
        computed: ObjectId,
    },

    /// A link's declared type disagrees with the object it points to.
    #[error("link {path:?} is declared {declared} but points to a {found}")]
    LinkTypeMismatch {
        path: String,
        declared: LinkType,
        found: LinkType,
    },

    /// Bytes could not be encoded or decoded as a well-formed object.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Two links in one tree share a name.
    #[error("duplicate link name: {0:?}")]
    DuplicateLink(String),

    /// A link name is empty, `.`, `..`, or contains `/` or NUL.
    #[error("invalid link name: {0:?}")]
    InvalidLinkName(String),

    /// Traversal went deeper than the configured limit.
    #[error("maximum traversal depth {max_depth} exceeded")]
    DepthExceeded { max_depth: usize },

    /// Local filesystem error during import.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`DagError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Storage,
    NotFound,
    NotADirectory,
    IsADirectory,
    Integrity,
    Serialization,
    /// Invalid input to the builder.
    Construction,
    /// A traversal limit was hit.
    Limit,
    Io,
    Config,
}

impl DagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::Storage,
            Self::NotFound(_) | Self::PathNotFound { .. } => ErrorKind::NotFound,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::IsADirectory { .. } => ErrorKind::IsADirectory,
            Self::Integrity { .. } | Self::LinkTypeMismatch { .. } => ErrorKind::Integrity,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::DuplicateLink(_) | Self::InvalidLinkName(_) => ErrorKind::Construction,
            Self::DepthExceeded { .. } => ErrorKind::Limit,
            Self::Io(_) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// A missing key becomes [`DagError::NotFound`]; every other store failure is
/// wrapped as [`DagError::Storage`].
impl From<StoreError> for DagError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
