//! Deterministic sentence splitting used when the oracle fails

use unicode_segmentation::UnicodeSegmentation;

/// Default minimum sentence length (characters)
pub const DEFAULT_MIN_SENTENCE_CHARS: usize = 3;

/// Splits text into sentences on UAX #29 sentence boundaries
///
/// Each sentence is trimmed and fragments shorter than `min_chars`
/// characters are discarded. Output sentences are verbatim substrings of the
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceSplitter {
    min_chars: usize,
}

impl SentenceSplitter {
    /// Create a splitter that drops fragments shorter than `min_chars`
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// Split `text` into sentences
    pub fn split(&self, text: &str) -> Vec<String> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| s.chars().count() >= self.min_chars)
            .map(str::to_string)
            .collect()
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SENTENCE_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_splits_sentences() {
        let sentences = SentenceSplitter::default()
            .split("Nepal protests began. Social media was banned. Was it? Yes!");
        assert_eq!(
            sentences,
            vec![
                "Nepal protests began.",
                "Social media was banned.",
                "Was it?",
                "Yes!"
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(SentenceSplitter::default().split("").is_empty());
        assert!(SentenceSplitter::default().split("   \n\t ").is_empty());
    }

    #[test]
    fn test_short_fragments_are_dropped() {
        let sentences = SentenceSplitter::default().split("Ok. A. The sky is blue.");
        assert!(!sentences.iter().any(|s| s == "A."));
        assert!(sentences.contains(&"The sky is blue.".to_string()));
    }

    #[test]
    fn test_min_chars_counts_characters() {
        // Three characters, six bytes
        let sentences = SentenceSplitter::new(3).split("äöü");
        assert_eq!(sentences, vec!["äöü"]);
    }

    #[test]
    fn test_no_terminal_punctuation() {
        let sentences = SentenceSplitter::default().split("  a single line without a period  ");
        assert_eq!(sentences, vec!["a single line without a period"]);
    }

    proptest! {
        #[test]
        fn prop_split_is_idempotent(text in "\\PC{0,200}") {
            let splitter = SentenceSplitter::default();
            prop_assert_eq!(splitter.split(&text), splitter.split(&text));
        }

        #[test]
        fn prop_sentences_are_substrings(text in "[a-zA-Z .!?\n]{0,200}") {
            for sentence in SentenceSplitter::default().split(&text) {
                prop_assert!(text.contains(&sentence));
                prop_assert!(sentence.chars().count() >= DEFAULT_MIN_SENTENCE_CHARS);
                prop_assert_eq!(sentence.trim(), sentence.as_str());
            }
        }
    }
}
