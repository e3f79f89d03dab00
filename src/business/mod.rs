//! Business logic: the conversion pipeline and the capture component

pub mod converter;
pub mod extractor;
pub mod sheet_client;
pub mod spreadsheet;
pub mod transcript;
pub mod voice_controller;

pub use converter::{build_prompt, ConvertError, Conversion, Converter};
pub use extractor::{extract, ExtractError};
pub use sheet_client::{ClientError, HttpSheetClient, SheetApi};
pub use spreadsheet::{write_workbook, SpreadsheetError, XLSX_CONTENT_TYPE};
pub use transcript::TranscriptBuffer;
pub use voice_controller::{
    CaptureError, GenerateState, ListenState, PlatformServices, VoiceController,
};
