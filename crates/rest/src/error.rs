//! Error types for the REST API.
//!
//! Handlers return `Result<Envelope, ApiError>`; the single
//! [`IntoResponse`] impl here is the boundary where every error becomes an
//! envelope. Storage and validation errors carry user-facing messages (many
//! in Vietnamese, matching the deployed clients) and map to the 400
//! envelope; anything unexpected maps to 500.

use axum::response::{IntoResponse, Response};
use scifun_persistence::error::StorageError;
use thiserror::Error;
use tracing::error;

use crate::envelope::Envelope;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Storage-layer failure, including validation and index errors.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A handled failure with a client-facing message.
    #[error("{0}")]
    Message(String),

    /// An unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// A handled failure from any displayable message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

// Index errors reach handlers directly from search calls; fold them into
// the storage kind so the envelope translation below stays in one place.
impl From<scifun_persistence::error::IndexError> for ApiError {
    fn from(e: scifun_persistence::error::IndexError) -> Self {
        ApiError::Storage(StorageError::Index(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Storage(StorageError::Backend(e)) => {
                error!(error = %e, "backend failure");
                Envelope::error(e.to_string()).into_response()
            }
            ApiError::Storage(e) => Envelope::fail(e.to_string()).into_response(),
            ApiError::Message(message) => Envelope::fail(message).into_response(),
            ApiError::Internal(message) => {
                error!(%message, "internal error");
                Envelope::error(message).into_response()
            }
        }
    }
}
