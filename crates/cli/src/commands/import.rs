//! Offline bulk import.
//!
//! Registers every valid row, either into a throwaway in-process store or
//! through a remote `registerUser` endpoint, then writes the report to the
//! output directory.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use rollcall_server::services::{
    BulkImporter, BulkResult, Registrars, RegistrationService, RemoteRegistrar, UserStore,
    generate_report, save_report,
};
use rollcall_server::spreadsheet;
use rollcall_server::storage::FileStore;
use url::Url;

/// Import `file` and save the report under `out_dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, the remote
/// registrar client cannot be built, or the report cannot be written.
pub async fn run(
    file: &Path,
    out_dir: &Path,
    registrar_url: Option<Url>,
    concurrency: NonZeroUsize,
) -> Result<(BulkResult, PathBuf), Box<dyn std::error::Error>> {
    let rows: Vec<_> = super::read_rows(file)
        .await?
        .into_iter()
        .map(|(_, row)| row)
        .collect();

    let registrar = match registrar_url {
        Some(url) => {
            tracing::info!(registrar_url = %url, "Registering through remote endpoint");
            Registrars::Remote(RemoteRegistrar::new(url)?)
        }
        None => Registrars::Local(RegistrationService::new(UserStore::new())),
    };

    let mut result = BulkImporter::new(&registrar)
        .with_concurrency(concurrency)
        .import(&rows)
        .await;

    let report = spreadsheet::encode_report(&generate_report(&result.registered_users))?;
    let saved_to = save_report(&FileStore::new(out_dir), &mut result, &report).await?;

    tracing::info!(
        registered = result.registered_count,
        rows = rows.len(),
        report = %saved_to.display(),
        "Import complete"
    );

    Ok((result, saved_to))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;

    fn write_workbook(path: &Path, rows: &[[&str; 3]]) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col, header) in (0u16..).zip(["Name", "Email", "Phone"]) {
            worksheet.write_string(0, col, header).unwrap();
        }
        for (row_num, row) in (1u32..).zip(rows) {
            for (col, cell) in (0u16..).zip(row) {
                if !cell.is_empty() {
                    worksheet.write_string(row_num, col, *cell).unwrap();
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_import_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("users.xlsx");
        write_workbook(
            &input,
            &[
                ["Alice", "alice@example.com", ""],
                ["Bob", "bob@", "12"],
                ["Dana", "dana@example.com", "5551234"],
            ],
        );
        let out_dir = dir.path().join("out");

        let (result, saved_to) = run(&input, &out_dir, None, NonZeroUsize::MIN)
            .await
            .unwrap();

        assert_eq!(result.registered_count, 2);
        assert_eq!(saved_to, out_dir.join(&result.output_artifact_name));
        let sheet = spreadsheet::decode_sheet(&std::fs::read(&saved_to).unwrap()).unwrap();
        assert_eq!(sheet.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let err = run(
            &dir.path().join("missing.xlsx"),
            dir.path(),
            None,
            NonZeroUsize::MIN,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().starts_with("File not found:"));
    }
}
