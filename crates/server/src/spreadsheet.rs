//! Spreadsheet codec.
//!
//! Decoding reads the first sheet of an uploaded workbook (`.xlsx`, `.xls`,
//! `.xlsb` or `.ods`) into [`InputRow`]s. Encoding writes a [`Report`] as a
//! single-sheet `.xlsx` workbook.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use rollcall_core::InputRow;
use rust_xlsxwriter::Workbook;
use thiserror::Error;

use crate::services::Report;

/// Name of the only sheet in a generated report.
pub const REPORT_SHEET_NAME: &str = "RegisteredUsers";

/// MIME type of generated reports.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Input header names (case-sensitive).
mod headers {
    pub const NAME: &str = "Name";
    pub const EMAIL: &str = "Email";
    pub const PHONE: &str = "Phone";
}

/// Errors raised by the spreadsheet codec.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    /// The input cannot be read as a workbook at all.
    #[error("malformed spreadsheet: {0}")]
    Malformed(String),

    /// Writing the report failed.
    #[error("failed to write spreadsheet: {0}")]
    Encode(#[from] rust_xlsxwriter::XlsxError),
}

/// A decoded sheet: every cell rendered as text, empty cells as `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    /// 1-based sheet row number of `rows[0]`. Leading empty rows are not
    /// part of `rows`.
    pub first_row: u32,
    pub rows: Vec<Vec<String>>,
}

/// Decode the first sheet of a workbook.
///
/// # Errors
///
/// Returns `SpreadsheetError::Malformed` if the bytes are not a readable
/// workbook, the workbook has no sheets, or the first sheet cannot be read.
pub fn decode_sheet(bytes: &[u8]) -> Result<Sheet, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SpreadsheetError::Malformed(e.to_string()))?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SpreadsheetError::Malformed("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| SpreadsheetError::Malformed(format!("cannot read sheet {name}: {e}")))?;

    let first_row = range.start().map_or(1, |(row, _)| row + 1);
    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell_text(cell).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(Sheet {
        name,
        first_row,
        rows,
    })
}

/// Decode the first sheet of a workbook into input rows.
///
/// The first non-empty row is the header. Columns are located by exact header
/// text (`Name`, `Email`, `Phone`); the first occurrence of a duplicated header
/// wins and a missing column leaves that field empty on every row. Entirely
/// blank data rows are dropped.
///
/// # Errors
///
/// Returns `SpreadsheetError::Malformed` if the workbook cannot be read.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<InputRow>, SpreadsheetError> {
    Ok(decode_numbered_rows(bytes)?
        .into_iter()
        .map(|(_, row)| row)
        .collect())
}

/// Like [`decode_rows`], with each row paired with its 1-based sheet row
/// number. Numbers keep counting across dropped blank rows.
///
/// # Errors
///
/// Returns `SpreadsheetError::Malformed` if the workbook cannot be read.
pub fn decode_numbered_rows(bytes: &[u8]) -> Result<Vec<(u32, InputRow)>, SpreadsheetError> {
    let sheet = decode_sheet(bytes)?;
    let mut rows = sheet.rows.into_iter();

    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = HeaderColumns::parse(&header);

    Ok((sheet.first_row + 1..)
        .zip(rows)
        .map(|(number, row)| {
            let input = InputRow {
                name: columns.name.and_then(|col| cell_at(&row, col)),
                email: columns.email.and_then(|col| cell_at(&row, col)),
                phone: columns.phone.and_then(|col| cell_at(&row, col)),
            };
            (number, input)
        })
        .filter(|(_, row)| !row.is_blank())
        .collect())
}

/// Encode a report as an `.xlsx` workbook.
///
/// # Errors
///
/// Returns `SpreadsheetError::Encode` if the workbook cannot be written.
pub fn encode_report(report: &Report) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET_NAME)?;

    for (col, header) in (0u16..).zip(Report::HEADERS) {
        worksheet.write_string(0, col, header)?;
    }

    for (row_num, row) in (1u32..).zip(report.rows()) {
        for (col, cell) in (0u16..).zip(row.cells()) {
            worksheet.write_string(row_num, col, cell)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[derive(Debug, Default)]
struct HeaderColumns {
    name: Option<usize>,
    email: Option<usize>,
    phone: Option<usize>,
}

impl HeaderColumns {
    fn parse(header: &[String]) -> Self {
        let mut columns = Self::default();
        for (col, title) in header.iter().enumerate() {
            let slot = match title.as_str() {
                headers::NAME => &mut columns.name,
                headers::EMAIL => &mut columns.email,
                headers::PHONE => &mut columns.phone,
                _ => continue,
            };
            slot.get_or_insert(col);
        }
        columns
    }
}

fn cell_at(row: &[String], col: usize) -> Option<String> {
    row.get(col).filter(|text| !text.is_empty()).cloned()
}

/// Render a cell as text. Integral numbers lose their fractional part, so a
/// phone number stored as a number reads back as its digits.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) if !s.is_empty() => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::String(_) | Data::Error(_) | Data::Empty => None,
    }
}
