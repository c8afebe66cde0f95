//! Error types for the persistence layer.
//!
//! Errors are organized by kind rather than by message: validation,
//! not-found, conflict, search-index, and backend failures are separate
//! enums folded into [`StorageError`]. The REST layer translates kinds into
//! the transport envelope in exactly one place, so nothing here carries
//! HTTP semantics.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Document or field validation errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested document was not found in the primary store.
    #[error("{collection} không tồn tại")]
    NotFound { collection: String, id: String },

    /// A uniqueness constraint was violated.
    #[error("{message}")]
    Conflict { collection: String, message: String },

    /// Search index errors, including the dual-write sync path.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Backend connectivity or driver errors.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors raised while validating a document against its collection schema.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field is absent on insert.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A field value has the wrong type or violates a constraint.
    #[error("invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// The document carries a field the schema does not declare.
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// A string is not a valid 24-character hex entity identifier.
    #[error("ID không hợp lệ: {value}")]
    InvalidIdentifier { value: String },
}

/// Errors from the search index collaborator.
///
/// `NotFoundInIndex` is deliberately its own variant: callers of the mirror
/// delete path treat a missing index document differently from a failed
/// write (see the sync module).
#[derive(Error, Debug)]
pub enum IndexError {
    /// The index has no document under the given id.
    #[error("{entity} không tồn tại trong Elasticsearch")]
    NotFoundInIndex { index: String, entity: String, id: String },

    /// An index or delete call failed for any reason other than a 404.
    #[error("index write failed for {index}/{id}: {message}")]
    WriteFailed { index: String, id: String, message: String },

    /// A search call failed.
    #[error("search failed on index {index}: {message}")]
    SearchFailed { index: String, message: String },

    /// The index is unreachable.
    #[error("search index unreachable: {message}")]
    Unavailable { message: String },
}

/// Errors from the primary store driver.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connecting to the backend failed.
    #[error("failed to connect to {backend_name}: {message}")]
    ConnectionFailed { backend_name: String, message: String },

    /// Any other driver-level failure.
    #[error("{backend_name} error: {message}")]
    Internal { backend_name: String, message: String },
}

impl StorageError {
    /// Convenience constructor for a primary-store not-found.
    pub fn not_found(collection: &str, id: impl Into<String>) -> Self {
        StorageError::NotFound {
            collection: collection.to_string(),
            id: id.into(),
        }
    }

    /// True when the error is the distinct index-404 condition.
    pub fn is_not_found_in_index(&self) -> bool {
        matches!(
            self,
            StorageError::Index(IndexError::NotFoundInIndex { .. })
        )
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
