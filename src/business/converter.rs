//! Sheet Converter
//!
//! Runs one instruction through prompt -> model -> extraction -> workbook.

use std::sync::Arc;
use thiserror::Error;

use crate::business::extractor::{self, ExtractError};
use crate::business::spreadsheet::{self, SpreadsheetError};
use crate::data::{ExtractionConfig, GeneratedTable, WorkbookConfig};
use crate::llm::{LanguageModel, LlmError};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
}

/// A finished conversion
#[derive(Debug)]
pub struct Conversion {
    pub table: GeneratedTable,
    pub bytes: Vec<u8>,
}

/// Build the model prompt around the raw user instruction
pub fn build_prompt(instruction: &str) -> String {
    format!(
        r#"You are an assistant that converts user instructions into structured Excel data.

User instruction (can be in English or Urdu): "{instruction}"

Respond ONLY in this exact JSON format (no extra text):
{{
  "headers": ["Column 1", "Column 2"],
  "rows": [["row1col1", "row1col2"], ["row2col1", "row2col2"]]
}}
"#
    )
}

/// Instruction-to-workbook pipeline; cheap to share behind an `Arc`
pub struct Converter {
    model: Arc<dyn LanguageModel>,
    extraction: ExtractionConfig,
    workbook: WorkbookConfig,
}

impl Converter {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        extraction: ExtractionConfig,
        workbook: WorkbookConfig,
    ) -> Self {
        Self {
            model,
            extraction,
            workbook,
        }
    }

    pub fn model(&self) -> &dyn LanguageModel {
        self.model.as_ref()
    }

    pub fn extraction(&self) -> &ExtractionConfig {
        &self.extraction
    }

    pub fn workbook(&self) -> &WorkbookConfig {
        &self.workbook
    }

    /// Convert one instruction into an xlsx buffer
    pub async fn convert(&self, instruction: &str) -> Result<Conversion, ConvertError> {
        tracing::info!("Prompt: {}", instruction);

        let output = self.model.generate(&build_prompt(instruction)).await?;
        tracing::info!("Model output: {}", output);

        let table = extractor::extract(&output, self.extraction.mode)?;
        let table = spreadsheet::apply_row_policy(table, self.extraction.row_policy)?;
        tracing::debug!("Parsed table: {:?}", table);

        let bytes = spreadsheet::write_workbook(&table, &self.workbook.sheet_name)?;
        tracing::info!(
            "Generated {} with {} rows ({} bytes)",
            self.workbook.file_name,
            table.sheet_row_count(),
            bytes.len()
        );

        Ok(Conversion { table, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ExtractionMode, RowPolicy};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned completion and records prompts
    struct CannedModel {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(LlmError::Network)
        }
    }

    fn converter(model: Arc<CannedModel>, mode: ExtractionMode, policy: RowPolicy) -> Converter {
        Converter::new(
            model,
            ExtractionConfig {
                mode,
                row_policy: policy,
            },
            WorkbookConfig::default(),
        )
    }

    #[test]
    fn test_prompt_embeds_instruction() {
        let prompt = build_prompt("List 3 fruits with color");
        assert!(prompt.contains("\"List 3 fruits with color\""));
        assert!(prompt.contains("\"headers\": [\"Column 1\", \"Column 2\"]"));
        assert!(prompt.contains("Respond ONLY in this exact JSON format"));
    }

    #[tokio::test]
    async fn test_convert_fruits() {
        let model = CannedModel::ok(
            r#"{"headers":["Fruit","Color"],"rows":[["Apple","Red"],["Banana","Yellow"],["Grape","Purple"]]}"#,
        );
        let converter = converter(model.clone(), ExtractionMode::Strict, RowPolicy::Preserve);

        let conversion = converter.convert("List 3 fruits with color").await.unwrap();

        assert_eq!(conversion.table.headers, vec!["Fruit", "Color"]);
        assert_eq!(conversion.table.rows.len(), 3);
        assert!(!conversion.bytes.is_empty());
        // xlsx files are zip archives
        assert_eq!(&conversion.bytes[..2], b"PK");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("List 3 fruits with color"));
    }

    #[tokio::test]
    async fn test_convert_no_json_fails() {
        let model = CannedModel::ok("Sorry, I can only talk about spreadsheets.");
        let converter = converter(model, ExtractionMode::Strict, RowPolicy::Preserve);

        let err = converter.convert("anything").await.unwrap_err();
        assert!(matches!(err, ConvertError::Extract(ExtractError::NoJsonObject)));
    }

    #[tokio::test]
    async fn test_convert_model_failure_surfaces_message() {
        let model = CannedModel::failing("connection reset");
        let converter = converter(model, ExtractionMode::Strict, RowPolicy::Preserve);

        let err = converter.convert("anything").await.unwrap_err();
        assert!(matches!(err, ConvertError::Llm(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_convert_rejects_ragged_rows_when_configured() {
        let model = CannedModel::ok(r#"{"headers":["A","B"],"rows":[["1"]]}"#);
        let converter = converter(model, ExtractionMode::Strict, RowPolicy::Reject);

        let err = converter.convert("anything").await.unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Spreadsheet(SpreadsheetError::RowMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_convert_lenient_mode() {
        let model = CannedModel::ok("| Name | Age |\n| Ali | 30 |");
        let converter = converter(model, ExtractionMode::Lenient, RowPolicy::Preserve);

        let conversion = converter.convert("people").await.unwrap();
        assert_eq!(conversion.table.headers, vec!["Name", "Age"]);
        assert_eq!(conversion.table.rows, vec![vec!["Ali", "30"]]);
    }
}
