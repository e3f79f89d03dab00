//! Table Extractor
//!
//! Pulls a [`GeneratedTable`] out of free-form model text.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

use crate::data::{ExtractionMode, GeneratedTable};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Model did not return valid JSON")]
    NoJsonObject,
    #[error("Model JSON does not contain a headers/rows table: {0}")]
    InvalidShape(String),
    #[error("Model response contains no pipe-delimited table rows")]
    NoTableRows,
    #[error("Model returned an empty table")]
    EmptyTable,
}

/// The `{"headers": [...], "rows": [[...]]}` object requested in the prompt
#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    headers: Option<Vec<Value>>,
    rows: Vec<Vec<Value>>,
}

impl RawTable {
    fn into_table(self) -> GeneratedTable {
        GeneratedTable {
            headers: self
                .headers
                .unwrap_or_default()
                .into_iter()
                .map(cell_text)
                .collect(),
            rows: self
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(cell_text).collect())
                .collect(),
        }
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex"))
}

/// Extract a table from model output using `mode`
pub fn extract(text: &str, mode: ExtractionMode) -> Result<GeneratedTable, ExtractError> {
    let table = match mode {
        ExtractionMode::Strict => extract_strict(text)?,
        ExtractionMode::Lenient => extract_lenient(text)?,
        ExtractionMode::StrictWithFallback => match extract_strict(text) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Strict extraction failed ({}), trying pipe table", e);
                extract_lenient(text)?
            }
        },
    };

    if table.is_empty() {
        return Err(ExtractError::EmptyTable);
    }
    Ok(table)
}

/// Find the headers/rows JSON object in `text`.
///
/// The widest `{...}` span is tried first. When that does not parse (prose
/// with stray braces, several objects), every `{` is tried as the start of a
/// standalone object and the first one with the right shape wins.
pub fn extract_strict(text: &str) -> Result<GeneratedTable, ExtractError> {
    let span = json_object_pattern()
        .find(text)
        .ok_or(ExtractError::NoJsonObject)?;

    let first_error = match serde_json::from_str::<RawTable>(span.as_str()) {
        Ok(raw) => return Ok(raw.into_table()),
        Err(e) => e,
    };

    for (start, _) in text.char_indices().filter(|(_, c)| *c == '{') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<RawTable>();
        if let Some(Ok(raw)) = stream.next() {
            tracing::debug!("Found table object at byte {}", start);
            return Ok(raw.into_table());
        }
    }

    Err(ExtractError::InvalidShape(first_error.to_string()))
}

/// Treat every line containing `|` as a table row; the first such line is
/// the header row. A Markdown alignment row directly under the header is
/// dropped; dash-only rows elsewhere are data.
pub fn extract_lenient(text: &str) -> Result<GeneratedTable, ExtractError> {
    let mut lines = text
        .lines()
        .filter(|line| line.contains('|'))
        .map(|line| {
            line.split('|')
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty());

    let headers = lines.next().ok_or(ExtractError::NoTableRows)?;
    let mut rows: Vec<Vec<String>> = lines.collect();
    if rows.first().is_some_and(|first| is_separator_row(first)) {
        rows.remove(0);
    }
    Ok(GeneratedTable { headers, rows })
}

/// Markdown alignment rows such as `|---|:---:|`
fn is_separator_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|cell| cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':'))
}
