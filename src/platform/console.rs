//! Terminal implementations of the platform services

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{FileSaver, Notifier, SpeechSynthesizer, Utterance, Voice};

/// Prints utterances instead of playing audio
pub struct ConsoleSynthesizer;

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&self, utterance: &Utterance) -> Result<()> {
        tracing::info!("Speaking ({}): {}", utterance.lang, utterance.text);
        println!("🔊 {}", utterance.text);
        Ok(())
    }
}

/// Writes files into a download directory, replacing existing ones
pub struct DirectoryFileSaver {
    dir: PathBuf,
}

impl DirectoryFileSaver {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl FileSaver for DirectoryFileSaver {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("cannot create {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
        tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Prints alerts to the terminal
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!("Alert: {}", message);
        println!("❌ {}", message);
    }
}
