//! Data module for configuration and request-scoped data types

mod config;
mod language;
mod table;

pub use config::{
    AppConfig, ClientConfig, API_KEY_ENV, ExtractionConfig, ExtractionMode, GeneralConfig, LlmConfig,
    RowPolicy, ServerConfig, WorkbookConfig,
};
pub use language::{Instruction, Language};
pub use table::GeneratedTable;
