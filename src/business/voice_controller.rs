//! Voice Controller
//!
//! The capture component: gathers an instruction from typing or speech,
//! submits it to the sheet API, saves the result and speaks a confirmation.
//!
//! Listening and generating are independent state machines:
//! `Idle -> Listening -> Idle` and `Idle -> Generating -> Idle`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::Notify;

use crate::business::sheet_client::{ClientError, SheetApi};
use crate::business::transcript::TranscriptBuffer;
use crate::data::{Instruction, Language};
use crate::platform::{
    FileSaver, Notifier, PlatformFactory, RecognitionErrorKind, RecognitionEvent,
    RecognitionOptions, SpeechRecognizer, SpeechSynthesizer, Utterance, Voice,
};

pub const UNSUPPORTED_MESSAGE: &str = "Speech recognition is not supported on this platform.";
pub const NO_SPEECH_MESSAGE: &str = "No speech detected. Please try again.";
pub const NOT_ALLOWED_MESSAGE: &str = "Microphone access denied.";
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate Excel file";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("speech recognition unavailable")]
    Unsupported,
    #[error("a spreadsheet is already being generated")]
    Busy,
    #[error("speech recognition failed to start: {0}")]
    Recognizer(String),
    #[error(transparent)]
    Generate(#[from] ClientError),
    #[error("failed to save file: {0}")]
    Save(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateState {
    Idle,
    Generating,
}

/// Host services the controller depends on
#[derive(Clone)]
pub struct PlatformServices {
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub saver: Arc<dyn FileSaver>,
    pub notifier: Arc<dyn Notifier>,
}

impl PlatformServices {
    /// Services of the current platform, saving files into `download_dir`
    pub fn detect(download_dir: &std::path::Path) -> Self {
        Self {
            recognizer: PlatformFactory::create_speech_recognizer().map(Arc::from),
            synthesizer: Arc::from(PlatformFactory::create_speech_synthesizer()),
            saver: Arc::from(PlatformFactory::create_file_saver(download_dir)),
            notifier: Arc::from(PlatformFactory::create_notifier()),
        }
    }
}

type TranscriptCallback = Arc<dyn Fn(String) + Send + Sync + 'static>;

/// A running recognition session
struct Session {
    id: u64,
    stop: Arc<Notify>,
}

/// Voice/text capture controller
pub struct VoiceController {
    api: Arc<dyn SheetApi>,
    services: PlatformServices,
    file_name: String,
    language: Mutex<Language>,
    instruction: Arc<Mutex<String>>,
    session: Arc<Mutex<Option<Session>>>,
    next_session: AtomicU64,
    is_generating: AtomicBool,
    on_transcript: Option<TranscriptCallback>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the busy flag when generation ends on any path
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl VoiceController {
    pub fn new(
        api: Arc<dyn SheetApi>,
        services: PlatformServices,
        language: Language,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            api,
            services,
            file_name: file_name.into(),
            language: Mutex::new(language),
            instruction: Arc::new(Mutex::new(String::new())),
            session: Arc::new(Mutex::new(None)),
            next_session: AtomicU64::new(0),
            is_generating: AtomicBool::new(false),
            on_transcript: None,
        }
    }

    /// Set a callback that receives the instruction text after each
    /// recognition result
    pub fn set_on_transcript<F>(&mut self, callback: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_transcript = Some(Arc::new(callback));
    }

    pub fn language(&self) -> Language {
        *lock(&self.language)
    }

    pub fn set_language(&self, language: Language) {
        *lock(&self.language) = language;
    }

    pub fn instruction(&self) -> String {
        lock(&self.instruction).clone()
    }

    /// Replace the instruction text (typed input)
    pub fn set_instruction(&self, text: impl Into<String>) {
        *lock(&self.instruction) = text.into();
    }

    /// The instruction as it would be submitted right now
    pub fn snapshot(&self) -> Instruction {
        Instruction::new(self.instruction(), self.language())
    }

    pub fn listen_state(&self) -> ListenState {
        if lock(&self.session).is_some() {
            ListenState::Listening
        } else {
            ListenState::Idle
        }
    }

    pub fn generate_state(&self) -> GenerateState {
        if self.is_generating.load(Ordering::SeqCst) {
            GenerateState::Generating
        } else {
            GenerateState::Idle
        }
    }

    /// Start continuous recognition in the current language.
    ///
    /// A no-op while a session is already running.
    pub fn start_listening(&self) -> Result<(), CaptureError> {
        let Some(recognizer) = self.services.recognizer.clone() else {
            self.services.notifier.alert(UNSUPPORTED_MESSAGE);
            return Err(CaptureError::Unsupported);
        };

        let mut session = lock(&self.session);
        if session.is_some() {
            return Ok(());
        }

        let options = RecognitionOptions {
            lang: self.language().code().to_string(),
            continuous: true,
            interim_results: true,
        };
        let mut events = recognizer.start(&options).map_err(|e| {
            tracing::error!("Failed to start speech recognition: {}", e);
            self.services
                .notifier
                .alert(&format!("Speech error: {}", e));
            CaptureError::Recognizer(e.to_string())
        })?;

        let id = self.next_session.fetch_add(1, Ordering::SeqCst) + 1;
        let stop = Arc::new(Notify::new());
        *session = Some(Session {
            id,
            stop: stop.clone(),
        });
        drop(session);
        tracing::info!("Listening started ({}, session {})", options.lang, id);

        let session = self.session.clone();
        let instruction = self.instruction.clone();
        let notifier = self.services.notifier.clone();
        let on_transcript = self.on_transcript.clone();
        let mut transcript = TranscriptBuffer::with_base(&self.instruction());

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    event = events.recv() => event,
                    _ = stop.notified() => None,
                };
                let Some(event) = event else {
                    break;
                };
                if lock(&session).as_ref().map(|s| s.id) != Some(id) {
                    tracing::debug!("Dropping event for stopped session {}", id);
                    break;
                }
                match event {
                    RecognitionEvent::Result {
                        result_index,
                        results,
                    } => {
                        transcript.apply(result_index, &results);
                        let text = transcript.text();
                        tracing::debug!("Transcript: {}", text);
                        *lock(&instruction) = text.clone();
                        if let Some(ref cb) = on_transcript {
                            cb(text);
                        }
                    }
                    RecognitionEvent::Error(kind) => {
                        tracing::error!("Speech error: {}", kind.code());
                        notifier.alert(&recognition_error_message(&kind));
                        break;
                    }
                    RecognitionEvent::End => {
                        tracing::info!("Recognition session {} ended", id);
                        break;
                    }
                }
            }

            let mut current = lock(&session);
            if current.as_ref().map(|s| s.id) == Some(id) {
                *current = None;
            }
        });

        Ok(())
    }

    /// Stop the active recognition session immediately
    pub fn stop_listening(&self) {
        let stopped = lock(&self.session).take();
        if let Some(session) = stopped {
            session.stop.notify_one();
            if let Some(ref recognizer) = self.services.recognizer {
                recognizer.stop();
            }
            tracing::info!("Stopped listening (session {})", session.id);
        }
    }

    /// Submit the current instruction, save the workbook and speak a
    /// confirmation. Only one generation may run at a time.
    pub async fn generate(&self) -> Result<PathBuf, CaptureError> {
        if self
            .is_generating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptureError::Busy);
        }
        let busy = BusyGuard(&self.is_generating);

        let instruction = self.snapshot();
        tracing::info!(
            "Generating spreadsheet for: {} ({})",
            instruction.text,
            instruction.language
        );

        let bytes = match self.api.generate(&instruction.text).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                self.services.notifier.alert(GENERATE_FAILED_MESSAGE);
                return Err(e.into());
            }
        };

        let path = self
            .services
            .saver
            .save(&self.file_name, &bytes)
            .map_err(|e| {
                tracing::error!("Saving {} failed: {}", self.file_name, e);
                self.services.notifier.alert(GENERATE_FAILED_MESSAGE);
                CaptureError::Save(e.to_string())
            })?;
        drop(busy);

        self.speak_confirmation(instruction.language);
        Ok(path)
    }

    fn speak_confirmation(&self, language: Language) {
        let lang = language.code();
        let voices = self.services.synthesizer.voices();
        let utterance = Utterance {
            text: language.confirmation().to_string(),
            lang: lang.to_string(),
            voice: select_voice(&voices, lang),
        };
        if let Err(e) = self.services.synthesizer.speak(&utterance) {
            tracing::warn!("Speech synthesis failed: {}", e);
        }
    }
}

/// User-facing message for a recognition failure
pub fn recognition_error_message(kind: &RecognitionErrorKind) -> String {
    match kind {
        RecognitionErrorKind::NoSpeech => NO_SPEECH_MESSAGE.to_string(),
        RecognitionErrorKind::NotAllowed => NOT_ALLOWED_MESSAGE.to_string(),
        RecognitionErrorKind::Other(code) => format!("Speech error: {}", code),
    }
}

/// Pick a synthesis voice for `lang`.
///
/// Urdu voices are rare and inconsistently tagged, so the name is checked
/// too; English needs an exact `en-US` tag. Anything else uses the platform
/// default.
pub fn select_voice(voices: &[Voice], lang: &str) -> Option<Voice> {
    let found = match lang {
        "ur-PK" => voices.iter().find(|v| {
            v.lang.to_lowercase().contains("ur") || v.name.to_lowercase().contains("urdu")
        }),
        "en-US" => voices.iter().find(|v| v.lang == "en-US"),
        _ => None,
    };
    found.cloned()
}
