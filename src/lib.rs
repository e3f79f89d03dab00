//! Voice Sheet - spoken or typed instructions to Excel sheets
//!
//! A capture component collects an instruction and posts it to the
//! conversion endpoint, which asks a generative-language model for a table
//! and returns it as an xlsx workbook.

pub mod business;
pub mod data;
pub mod llm;
pub mod platform;
pub mod server;

pub use business::{Converter, HttpSheetClient, VoiceController};
pub use data::{AppConfig, GeneratedTable, Language};
pub use llm::{GeminiClient, LanguageModel};
