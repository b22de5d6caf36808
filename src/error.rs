//! Error types for the library server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const BOOK_NOT_FOUND: &str = "Book not found";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const INVALID_JSON: &str = "Invalid JSON body";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cast to ObjectId failed for value {0:?}")]
    MalformedId(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn book_not_found() -> Self {
        AppError::NotFound(BOOK_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MalformedId(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON whose values cannot be cast to the book fields
            JsonRejection::JsonDataError(e) => AppError::Internal(e.body_text()),
            other => {
                tracing::debug!("Rejected request body: {}", other.body_text());
                AppError::BadRequest(INVALID_JSON.to_string())
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Every server-side failure looks the same to the client
        let error = match self {
            AppError::Validation(msg) | AppError::BadRequest(msg) | AppError::NotFound(msg) => msg,
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                INTERNAL_ERROR.to_string()
            }
            other => {
                tracing::error!("Request failed: {}", other);
                INTERNAL_ERROR.to_string()
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
