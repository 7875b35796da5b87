//! CLI subcommands.

pub mod import;
pub mod preview;

use std::path::Path;

use rollcall_core::InputRow;
use rollcall_server::spreadsheet;

/// Read and decode a workbook from disk, keeping sheet row numbers.
async fn read_rows(file: &Path) -> Result<Vec<(u32, InputRow)>, Box<dyn std::error::Error>> {
    if !file.is_file() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let bytes = tokio::fs::read(file).await?;
    let rows = spreadsheet::decode_numbered_rows(&bytes)?;

    tracing::info!(path = %file.display(), rows = rows.len(), "Workbook decoded");
    Ok(rows)
}
