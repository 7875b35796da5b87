//! Bulk import endpoints.
//!
//! Both endpoints decode a workbook, run the importer, encode the report and
//! save it to the report store. They differ in where the workbook comes from
//! and in what they return.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::{HeaderName, header},
    response::IntoResponse,
};
use rollcall_core::RegisteredUser;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::{BulkImporter, BulkResult, generate_report, save_report};
use crate::spreadsheet::{self, XLSX_CONTENT_TYPE};
use crate::state::AppState;
use crate::storage::StorageError;

/// Response header carrying the number of registered users.
pub const REGISTERED_COUNT_HEADER: &str = "x-registered-count";

/// Multipart field the upload is expected in.
pub const UPLOAD_FIELD: &str = "excelFile";

/// File imported by `POST /register-bulk/local` when none is named.
pub const DEFAULT_LOCAL_FILE: &str = "DEMO.xlsx";

const LOCAL_IMPORT_MESSAGE: &str = "Bulk registration from local file completed";

/// Body of `POST /register-bulk/local`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalImportRequest {
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Response of `POST /register-bulk/local`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalImportResponse {
    pub message: &'static str,
    pub registered_count: usize,
    pub saved_to_file: String,
    pub registered_users: Vec<RegisteredUser>,
}

/// A finished import with its encoded, saved report.
struct ImportRun {
    result: BulkResult,
    report: Vec<u8>,
}

/// `POST /register-bulk`
///
/// Takes the workbook from the `excelFile` field, or failing that from the
/// first field that carries a file name, and answers with the report as an
/// attachment.
#[tracing::instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (file_name, bytes) = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    tracing::info!(
        file_name = file_name.as_deref().unwrap_or_default(),
        bytes = bytes.len(),
        "Bulk upload received"
    );

    let run = run_import(&state, &bytes).await?;
    let artifact = run.result.output_artifact_name;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{artifact}\""),
            ),
            (
                HeaderName::from_static(REGISTERED_COUNT_HEADER),
                run.result.registered_count.to_string(),
            ),
        ],
        run.report,
    ))
}

/// `POST /register-bulk/local`
///
/// Imports a workbook already present in the import directory. An empty body
/// imports [`DEFAULT_LOCAL_FILE`].
#[tracing::instrument(skip_all)]
pub async fn local(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LocalImportResponse>> {
    let request: LocalImportRequest = if body.trim_ascii().is_empty() {
        LocalImportRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?
    };

    let file_name = request
        .file_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_LOCAL_FILE.to_string());

    let bytes = state
        .imports()
        .load(&file_name)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) | StorageError::InvalidName(_) => {
                AppError::BadRequest(format!("File not found: {file_name}"))
            }
            other => other.into(),
        })?;

    tracing::info!(file_name = %file_name, bytes = bytes.len(), "Local bulk import started");

    let run = run_import(&state, &bytes).await?;

    Ok(Json(LocalImportResponse {
        message: LOCAL_IMPORT_MESSAGE,
        registered_count: run.result.registered_count,
        saved_to_file: run.result.output_artifact_name,
        registered_users: run.result.registered_users,
    }))
}

/// Find the uploaded file among the multipart fields.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<(Option<String>, Bytes)>> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let is_upload_field = field.name() == Some(UPLOAD_FIELD);
        let file_name = field.file_name().map(ToString::to_string);

        if !is_upload_field && (file_name.is_none() || fallback.is_some()) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if is_upload_field {
            return Ok(Some((file_name, bytes)));
        }
        fallback = Some((file_name, bytes));
    }

    Ok(fallback)
}

/// Decode, import, report and save.
async fn run_import(state: &AppState, workbook: &[u8]) -> Result<ImportRun> {
    let rows = spreadsheet::decode_rows(workbook)?;

    let mut result = BulkImporter::new(state.registrar())
        .with_concurrency(state.config().import_concurrency)
        .import(&rows)
        .await;

    let report = spreadsheet::encode_report(&generate_report(&result.registered_users))?;
    let saved_to = save_report(state.reports(), &mut result, &report).await?;

    tracing::info!(
        registered = result.registered_count,
        saved_to = %saved_to.display(),
        "Report saved"
    );

    Ok(ImportRun { result, report })
}
