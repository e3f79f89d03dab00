//! Generative-language model clients
//!
//! The conversion pipeline only needs "text in, text out"; everything
//! provider-specific lives behind [`LanguageModel`].

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a language model call
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not configured (set {0})")]
    MissingApiKey(&'static str),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Model request timed out after {0}s")]
    Timeout(u64),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

/// A single-shot text completion service
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logging and status reporting
    fn model_name(&self) -> &str;

    /// Whether the client has the credentials it needs
    fn is_configured(&self) -> bool {
        true
    }

    /// Send one prompt and return the full completion text
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
