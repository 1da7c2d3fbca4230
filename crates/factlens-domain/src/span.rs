//! Span module - anchoring claims to character ranges of a document
//!
//! All offsets are character offsets (Unicode scalar values), not byte
//! offsets, so `start..end` means the same thing to every consumer of the
//! JSON output regardless of its string encoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the character at `char_idx`, clamped to the end of `text`
pub fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Character offset of the byte position `byte_idx`
///
/// `byte_idx` must lie on a character boundary (as returned by `str::find`).
pub fn char_offset(text: &str, byte_idx: usize) -> usize {
    char_len(&text[..byte_idx.min(text.len())])
}

/// Slice `text` by character offsets `[start, end)`, clamping both ends
///
/// # Examples
///
/// ```
/// use factlens_domain::span::char_slice;
///
/// assert_eq!(char_slice("Zürich is large", 0, 6), "Zürich");
/// assert_eq!(char_slice("abc", 2, 10), "c");
/// assert_eq!(char_slice("abc", 3, 1), "");
/// ```
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let from = byte_offset(text, start);
    let to = byte_offset(text, end);
    &text[from..to]
}

/// One claim anchored to a contiguous range of the source document
///
/// After reconciliation `text` is always exactly the document characters in
/// `[start, end)`, and `start <= end <= document length`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSpan {
    /// The claim as produced by the extractor
    pub claim: String,

    /// Document text covered by this claim
    pub text: String,

    /// Start character offset (inclusive)
    pub start: usize,

    /// End character offset (exclusive)
    pub end: usize,
}

impl ClaimSpan {
    /// Create a span whose text is cut from `document` at `[start, end)`
    ///
    /// # Examples
    ///
    /// ```
    /// use factlens_domain::ClaimSpan;
    ///
    /// let doc = "Nepal protests began. Social media was banned.";
    /// let span = ClaimSpan::from_document("Protests began in Nepal.", doc, 0, 21);
    /// assert_eq!(span.text, "Nepal protests began.");
    /// ```
    pub fn from_document(claim: impl Into<String>, document: &str, start: usize, end: usize) -> Self {
        Self {
            claim: claim.into(),
            text: char_slice(document, start, end).to_string(),
            start,
            end,
        }
    }

    /// Length of the span in characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no text
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one character
    pub fn overlaps(&self, other: &ClaimSpan) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for ClaimSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}) {:?}", self.start, self.end, self.text)
    }
}

/// Ordered spans for one decomposition run
///
/// The `clean` flag is true only when every span matched the oracle's
/// proposal without any corrective adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimSpanSet {
    spans: Vec<ClaimSpan>,
    clean: bool,
}

impl ClaimSpanSet {
    /// Create a span set from already reconciled spans
    pub fn new(spans: Vec<ClaimSpan>, clean: bool) -> Self {
        Self { spans, clean }
    }

    /// An empty, clean span set
    pub fn empty() -> Self {
        Self::new(Vec::new(), true)
    }

    /// The spans in claim-processing order
    pub fn spans(&self) -> &[ClaimSpan] {
        &self.spans
    }

    /// Consume the set, returning its spans
    pub fn into_spans(self) -> Vec<ClaimSpan> {
        self.spans
    }

    /// True when no span needed correction
    pub fn is_clean(&self) -> bool {
        self.clean
    }

    /// True when at least one span was corrected or unanchored
    pub fn is_partial(&self) -> bool {
        !self.clean
    }

    /// Number of spans
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the set has no spans
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterate over spans in order
    pub fn iter(&self) -> std::slice::Iter<'_, ClaimSpan> {
        self.spans.iter()
    }

    /// Claims in order
    pub fn claims(&self) -> Vec<&str> {
        self.spans.iter().map(|s| s.claim.as_str()).collect()
    }

    /// Check the central ordering invariant
    ///
    /// Every span is well-formed (`start <= end`) and each span starts at or
    /// after the end of the one before it.
    pub fn is_ordered(&self) -> bool {
        self.spans.iter().all(|s| s.start <= s.end)
            && self.spans.windows(2).all(|w| w[1].start >= w[0].end)
    }

    /// Check that every span lies inside `document` and its text matches
    pub fn is_anchored_in(&self, document: &str) -> bool {
        let doc_len = char_len(document);
        self.spans.iter().all(|s| {
            s.start <= s.end && s.end <= doc_len && s.text == char_slice(document, s.start, s.end)
        })
    }
}

impl<'a> IntoIterator for &'a ClaimSpanSet {
    type Item = &'a ClaimSpan;
    type IntoIter = std::slice::Iter<'a, ClaimSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

impl IntoIterator for ClaimSpanSet {
    type Item = ClaimSpan;
    type IntoIter = std::vec::IntoIter<ClaimSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.into_iter()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: char_slice always agrees with a char-vector slice
        #[test]
        fn test_char_slice_matches_chars(text in "\\PC{0,40}", a in 0usize..50, b in 0usize..50) {
            let chars: Vec<char> = text.chars().collect();
            let (start, end) = (a.min(b), a.max(b));
            let expected: String = chars
                .iter()
                .skip(start)
                .take(end.saturating_sub(start))
                .collect();
            prop_assert_eq!(char_slice(&text, start, end), expected.as_str());
        }

        /// Property: spans cut from a document are always anchored in it
        #[test]
        fn test_from_document_is_anchored(text in "[a-zé .]{0,40}", a in 0usize..40, b in 0usize..40) {
            let len = char_len(&text);
            let (start, end) = (a.min(b).min(len), a.max(b).min(len));
            let set = ClaimSpanSet::new(vec![ClaimSpan::from_document("c", &text, start, end)], true);
            prop_assert!(set.is_anchored_in(&text));
        }
    }
}
