//! Transcript accumulation for continuous speech recognition

use crate::platform::SpeechResult;

/// Finalized text plus the current provisional overlay.
///
/// Final segments accumulate; the interim part is rebuilt from every result
/// event so a revised partial replaces the previous one instead of piling up.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    finalized: String,
    interim: String,
}

impl TranscriptBuffer {
    /// Start from text that is already in the instruction box.
    ///
    /// Typed text is kept as a prefix instead of being replaced by the
    /// first spoken words, so speech can extend a typed instruction.
    pub fn with_base(base: &str) -> Self {
        let mut finalized = base.trim_end().to_string();
        if !finalized.is_empty() {
            finalized.push(' ');
        }
        Self {
            finalized,
            interim: String::new(),
        }
    }

    /// Apply one recognition event covering `results[result_index..]`
    pub fn apply(&mut self, result_index: usize, results: &[SpeechResult]) {
        self.interim.clear();
        for result in results.iter().skip(result_index) {
            if result.is_final {
                self.finalized.push_str(&result.transcript);
                self.finalized.push(' ');
            } else {
                self.interim.push_str(&result.transcript);
            }
        }
    }

    /// Text to show: finalized segments followed by the interim overlay
    pub fn text(&self) -> String {
        format!("{}{}", self.finalized, self.interim)
    }

    pub fn finalized(&self) -> &str {
        &self.finalized
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interim(text: &str) -> SpeechResult {
        SpeechResult::new(text, false)
    }

    fn fin(text: &str) -> SpeechResult {
        SpeechResult::new(text, true)
    }

    #[test]
    fn test_interim_is_replaced_not_appended() {
        let mut buffer = TranscriptBuffer::default();

        buffer.apply(0, &[interim("list")]);
        assert_eq!(buffer.text(), "list");

        buffer.apply(0, &[interim("list three")]);
        assert_eq!(buffer.text(), "list three");

        buffer.apply(0, &[interim("list three fruits")]);
        assert_eq!(buffer.text(), "list three fruits");
    }

    #[test]
    fn test_final_segments_accumulate() {
        let mut buffer = TranscriptBuffer::default();

        buffer.apply(0, &[fin("list three fruits")]);
        buffer.apply(1, &[fin("list three fruits"), interim("with")]);
        assert_eq!(buffer.text(), "list three fruits with");

        buffer.apply(1, &[fin("list three fruits"), fin("with color")]);
        assert_eq!(buffer.finalized(), "list three fruits with color ");
        assert_eq!(buffer.interim(), "");
    }

    #[test]
    fn test_results_before_index_are_skipped() {
        let mut buffer = TranscriptBuffer::default();
        buffer.apply(0, &[fin("one")]);
        buffer.apply(1, &[fin("one"), fin("two")]);
        assert_eq!(buffer.text(), "one two ");
    }

    #[test]
    fn test_base_text_is_kept() {
        let mut buffer = TranscriptBuffer::with_base("typed text  ");
        buffer.apply(0, &[interim("spoken")]);
        assert_eq!(buffer.text(), "typed text spoken");

        let empty = TranscriptBuffer::with_base("");
        assert_eq!(empty.text(), "");
    }
}
