//! Supported instruction languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language an instruction is written or spoken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ur,
}

impl Language {
    /// BCP 47 tag handed to speech recognition and synthesis
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Ur => "ur-PK",
        }
    }

    /// Phrase spoken once the sheet has been saved
    pub fn confirmation(&self) -> &'static str {
        match self {
            Language::En => "Your Excel sheet is ready for download.",
            Language::Ur => "آپ کی شیٹ تیار ہے",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Ur => write!(f, "ur"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Language::En),
            "ur" | "ur-pk" | "urdu" => Ok(Language::Ur),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

/// A natural-language request tagged with its language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub text: String,
    pub language: Language,
}

impl Instruction {
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self {
            text: text.into(),
            language,
        }
    }
}
