//! Saved report downloads.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::{AppError, Result};
use crate::spreadsheet::XLSX_CONTENT_TYPE;
use crate::state::AppState;
use crate::storage::StorageError;

/// `GET /reports/{file_name}`
pub async fn download(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse> {
    let bytes = state
        .reports()
        .load(&file_name)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => {
                AppError::NotFound(format!("Report not found: {file_name}"))
            }
            other => other.into(),
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}
