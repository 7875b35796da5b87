//! Dry-run import: decode and plan every row without registering.

use std::path::Path;

use rollcall_core::{Email, Phone};
use rollcall_server::services::{RowPlan, import::preview};

/// Log the plan for each row of `file` and return it, keyed by sheet row
/// number (the header is usually row 1; blank rows are skipped but counted).
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub async fn run(file: &Path) -> Result<Vec<(u32, RowPlan)>, Box<dyn std::error::Error>> {
    let (numbers, rows): (Vec<u32>, Vec<_>) = super::read_rows(file).await?.into_iter().unzip();
    let plans: Vec<_> = numbers.into_iter().zip(preview(&rows)).collect();

    let mut would_register = 0usize;
    for (row, plan) in &plans {
        let row = *row;
        match plan {
            RowPlan::Register(payload) => {
                would_register += 1;
                tracing::info!(
                    row,
                    name = payload.name(),
                    email = payload.email().map_or("", Email::as_str),
                    phone = payload.phone().map_or("", Phone::as_str),
                    "Would register"
                );
            }
            RowPlan::Skip(reason) => tracing::info!(row, %reason, "Would skip"),
        }
    }

    tracing::info!(
        rows = plans.len(),
        would_register,
        would_skip = plans.len() - would_register,
        "Preview complete"
    );

    Ok(plans)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rollcall_server::services::SkipReason;
    use rust_xlsxwriter::Workbook;

    use super::*;

    #[tokio::test]
    async fn test_preview_plans_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.xlsx");
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (row, cells) in (0u32..).zip([
            ["Name", "Email", "Phone"],
            ["Alice", "alice@example.com", "abc"],
            ["", "", ""],
            ["", "ghost@example.com", "5551234"],
            ["Bob", "bob@", "12"],
        ]) {
            for (col, cell) in (0u16..).zip(cells) {
                if !cell.is_empty() {
                    worksheet.write_string(row, col, cell).unwrap();
                }
            }
        }
        workbook.save(&path).unwrap();

        let plans = run(&path).await.unwrap();

        assert_eq!(plans.len(), 3);
        let (2, RowPlan::Register(payload)) = &plans[0] else {
            panic!("expected Alice to be registered from row 2");
        };
        assert_eq!(payload.email().map(Email::as_str), Some("alice@example.com"));
        assert!(payload.phone().is_none());
        assert_eq!(plans[1], (4, RowPlan::Skip(SkipReason::MissingName)));
        assert_eq!(plans[2], (5, RowPlan::Skip(SkipReason::NoValidContact)));
    }
}
