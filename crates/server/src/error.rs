//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always JSON
//! `{"error": ..., "details"?: ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rollcall_core::RegistrationError;
use serde::Serialize;
use thiserror::Error;

use crate::spreadsheet::SpreadsheetError;
use crate::storage::StorageError;

/// Client-facing message for unreadable uploads.
pub const SPREADSHEET_FAILED_MESSAGE: &str = "Failed to process Excel file";

/// Application-level error type for the HTTP surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// A registration request failed validation.
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Reading an upload or writing a report failed.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] SpreadsheetError),

    /// Report or import file storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Registration(_)
            | Self::Spreadsheet(SpreadsheetError::Malformed(_))
            | Self::Storage(StorageError::InvalidName(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Spreadsheet(SpreadsheetError::Encode(_))
            | Self::Storage(StorageError::AlreadyExists(_) | StorageError::Io(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            Self::Registration(err) => (err.to_string(), None),
            Self::Spreadsheet(SpreadsheetError::Malformed(reason)) => {
                (SPREADSHEET_FAILED_MESSAGE.to_string(), Some(reason.clone()))
            }
            Self::Storage(err @ (StorageError::NotFound(_) | StorageError::InvalidName(_))) => {
                (err.to_string(), None)
            }
            Self::NotFound(msg) | Self::BadRequest(msg) => (msg.clone(), None),
            // Don't expose internal error details to clients
            Self::Spreadsheet(SpreadsheetError::Encode(_))
            | Self::Storage(StorageError::AlreadyExists(_) | StorageError::Io(_)) => {
                ("Internal server error".to_string(), None)
            }
        };
        ErrorBody { error, details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
