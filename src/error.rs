//! Error types for the data access layer and the HTTP boundary
//!
//! `StoreError` carries the two domain failures (missing input, missing
//! entity) alongside wrapped storage errors. `ApiError` is what handlers
//! return; it decides the status code and keeps internal detail out of the
//! response body.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised by [`crate::store::RecipeStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required input was missing or empty
    #[error("{0}")]
    Validation(&'static str),

    /// The referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// A stored document could not be encoded or decoded
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Errors returned by HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request shape problem detected in the handler itself
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Writing an uploaded file failed
    #[error("upload error: {0}")]
    Upload(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Store(StoreError::Validation(msg)) | ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Store(err @ StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string()).into_response()
            }
            ApiError::Multipart(err) => err.into_response(),
            err => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

/// Result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;
