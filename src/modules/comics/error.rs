use axum::response::{IntoResponse, Response};
use longbox_db::StorageError;
use longbox_http::error::AppError;
use serde_json::json;
use thiserror::Error;

use super::validation::ValidationError;

pub const NOT_FOUND_MESSAGE: &str = "Comic book not found";
pub const MISSING_ID_MESSAGE: &str = "Comic book ID not provided";

/// Failures of a comic-book operation.
#[derive(Error, Debug)]
pub enum ComicError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Comic book not found")]
    NotFound(String),

    #[error("Comic book ID not provided")]
    MissingIdentifier,

    /// The path or query string could not be decoded.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("storage operation failed: {0}")]
    Storage(#[from] StorageError),
}

impl From<ComicError> for AppError {
    fn from(err: ComicError) -> Self {
        match err {
            ComicError::Validation(ValidationError::NoFieldsProvided) => AppError::bad_request_with_code(
                "no_fields_provided",
                ValidationError::NoFieldsProvided.to_string(),
            ),
            ComicError::Validation(validation) => {
                let details = match (validation.field(), validation.rule()) {
                    (Some(field), Some(rule)) => vec![json!({ "field": field, "rule": rule })],
                    _ => Vec::new(),
                };
                AppError::validation(details, validation.to_string())
            }
            ComicError::NotFound(_) => AppError::not_found(NOT_FOUND_MESSAGE),
            ComicError::MissingIdentifier => {
                AppError::bad_request_with_code("missing_identifier", MISSING_ID_MESSAGE)
            }
            ComicError::InvalidRequest(message) => AppError::validation(Vec::new(), message),
            ComicError::Storage(storage) => AppError::Internal(anyhow::Error::new(storage)),
        }
    }
}

impl IntoResponse for ComicError {
    fn into_response(self) -> Response {
        if let ComicError::NotFound(id) = &self {
            tracing::debug!(comic_id = %id, "comic book lookup missed");
        }
        AppError::from(self).into_response()
    }
}
