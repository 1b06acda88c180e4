// src/error.rs
use crate::quotes::QuoteError;
use crate::storage::StorageError;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;

/// Errors surfaced to HTTP clients of the dashboard.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("holding not found: {id}")]
    NotFound { id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Quote(#[from] QuoteError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Quote(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl Reject for ApiError {}
