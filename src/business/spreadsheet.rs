//! Spreadsheet Writer
//!
//! Serializes a [`GeneratedTable`] into an in-memory single-sheet xlsx file.

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::data::{GeneratedTable, RowPolicy};

/// MIME type of the produced workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// Excel sheet limits
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Rows {rows:?} do not match the {expected} header columns")]
    RowMismatch { rows: Vec<usize>, expected: usize },
    #[error("Table exceeds sheet limits ({rows} rows, {cols} columns)")]
    TooLarge { rows: usize, cols: usize },
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Apply `policy` to rows whose length differs from the header row
pub fn apply_row_policy(
    mut table: GeneratedTable,
    policy: RowPolicy,
) -> Result<GeneratedTable, SpreadsheetError> {
    let mismatched = table.mismatched_rows();
    if mismatched.is_empty() {
        return Ok(table);
    }

    let width = table.headers.len();
    match policy {
        RowPolicy::Preserve => {
            tracing::warn!(
                "{} row(s) differ from the {} header columns, writing as-is",
                mismatched.len(),
                width
            );
        }
        RowPolicy::Pad => {
            for row in table.rows.iter_mut().filter(|row| row.len() < width) {
                row.resize(width, String::new());
            }
        }
        RowPolicy::Reject => {
            return Err(SpreadsheetError::RowMismatch {
                rows: mismatched,
                expected: width,
            });
        }
    }
    Ok(table)
}

/// Write the header row (if any) and then every data row, all as text
pub fn write_workbook(table: &GeneratedTable, sheet_name: &str) -> Result<Vec<u8>, SpreadsheetError> {
    let row_count = table.sheet_row_count();
    let col_count = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);
    if row_count > MAX_ROWS || col_count > MAX_COLS {
        return Err(SpreadsheetError::TooLarge {
            rows: row_count,
            cols: col_count,
        });
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header = (!table.headers.is_empty()).then_some(&table.headers);
    for (row_idx, cells) in header.into_iter().chain(table.rows.iter()).enumerate() {
        for (col_idx, cell) in cells.iter().enumerate() {
            worksheet.write_string(row_idx as u32, col_idx as u16, cell)?;
        }
    }

    let buffer = workbook.save_to_buffer()?;
    tracing::debug!(
        "Workbook written: {} rows, {} columns, {} bytes",
        row_count,
        col_count,
        buffer.len()
    );
    Ok(buffer)
}
