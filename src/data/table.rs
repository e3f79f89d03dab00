//! Tabular data extracted from model output

use serde::Serialize;

/// Header labels plus data rows, all cells as text.
///
/// Row lengths are not required to match the header length; callers decide
/// what to do with ragged rows through [`crate::data::RowPolicy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl GeneratedTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// True when no header or cell holds visible text
    pub fn is_empty(&self) -> bool {
        self.headers
            .iter()
            .chain(self.rows.iter().flatten())
            .all(|cell| cell.trim().is_empty())
    }

    /// Number of rows the sheet will contain, header included
    pub fn sheet_row_count(&self) -> usize {
        self.rows.len() + usize::from(!self.headers.is_empty())
    }

    /// Indices of data rows whose length differs from the header length
    pub fn mismatched_rows(&self) -> Vec<usize> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() != self.headers.len())
            .map(|(idx, _)| idx)
            .collect()
    }
}
