//! Platform services used by the capture component
//!
//! Speech recognition, speech synthesis, file saving and user alerts are
//! provided by the host environment. The capture component only talks to
//! these traits; [`PlatformFactory`] picks the implementation for the
//! current target.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

pub mod console;

/// One recognized phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechResult {
    pub transcript: String,
    pub is_final: bool,
}

impl SpeechResult {
    pub fn new(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            transcript: transcript.into(),
            is_final,
        }
    }
}

/// Why a recognition session failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    NoSpeech,
    NotAllowed,
    Other(String),
}

impl RecognitionErrorKind {
    /// Map a platform error code (`no-speech`, `not-allowed`, ...)
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "not-allowed" => Self::NotAllowed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::NotAllowed => "not-allowed",
            Self::Other(code) => code,
        }
    }
}

/// Events emitted by an active recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// `results` is the full session result list; entries from
    /// `result_index` on changed with this event
    Result {
        result_index: usize,
        results: Vec<SpeechResult>,
    },
    Error(RecognitionErrorKind),
    /// The session closed
    End,
}

/// Parameters of a recognition session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

/// Platform speech-to-text capability
pub trait SpeechRecognizer: Send + Sync {
    /// Begin a session; events arrive on the returned channel
    fn start(&self, options: &RecognitionOptions) -> Result<mpsc::Receiver<RecognitionEvent>>;
    /// End the current session.
    ///
    /// Implementations should drop the session's sender so the channel
    /// closes; callers stop reading on their own either way.
    fn stop(&self);
}

/// A synthesis voice offered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

/// Text to speak, in a language, optionally with a chosen voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>,
}

/// Platform text-to-speech capability
pub trait SpeechSynthesizer: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    fn speak(&self, utterance: &Utterance) -> Result<()>;
}

/// Saves a downloaded file for the user
pub trait FileSaver: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Shows a message to the user
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Factory for creating platform-specific implementations
pub struct PlatformFactory;

impl PlatformFactory {
    /// `None` when the platform has no speech recognition
    pub fn create_speech_recognizer() -> Option<Box<dyn SpeechRecognizer>> {
        None
    }

    pub fn create_speech_synthesizer() -> Box<dyn SpeechSynthesizer> {
        Box::new(console::ConsoleSynthesizer)
    }

    pub fn create_file_saver(download_dir: &Path) -> Box<dyn FileSaver> {
        Box::new(console::DirectoryFileSaver::new(download_dir))
    }

    pub fn create_notifier() -> Box<dyn Notifier> {
        Box::new(console::ConsoleNotifier)
    }
}
