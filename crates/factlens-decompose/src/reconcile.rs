//! Deterministic repair of an untrusted claim-to-text mapping
//!
//! Given the document, the claims, and one proposed text per claim,
//! [`reconcile`] produces spans that are anchored in the document and
//! non-overlapping in claim order. Every correction clears the `clean` flag
//! of the result instead of failing.
//!
//! The walk keeps a cursor over the consumed region. The first span is pulled
//! back to the start of the document, and each later span is expected to start
//! exactly one character after the previous span ends (the separator between
//! sentences). Overlaps are pushed forward, gaps are closed, and spans that
//! fall entirely inside consumed text collapse to an empty span at the
//! frontier.

use factlens_domain::span::{char_len, char_offset, char_slice};
use factlens_domain::{ClaimSpan, ClaimSpanSet};
use tracing::{debug, warn};

/// Reconcile proposed texts against `document`
///
/// `proposed[i]` is the oracle's text for `claims[i]`; a missing or blank
/// proposal triggers the keyword-window search. The result always has one
/// span per claim.
pub fn reconcile(
    document: &str,
    claims: &[String],
    proposed: &[String],
    keyword_window: usize,
) -> ClaimSpanSet {
    let doc_len = char_len(document);
    let mut clean = true;

    let provisional: Vec<(usize, usize)> = claims
        .iter()
        .enumerate()
        .map(|(idx, claim)| {
            let text = proposed.get(idx).map(String::as_str).unwrap_or("");
            let (range, exact) = provisional_range(document, doc_len, claim, text, keyword_window);
            clean &= exact;
            range
        })
        .collect();

    // Cursor semantics: `None` means nothing consumed yet; the next span is
    // expected to start at `consumed + 1`.
    let mut consumed: Option<usize> = None;
    let mut spans = Vec::with_capacity(claims.len());

    for (claim, (mut start, mut end)) in claims.iter().zip(provisional) {
        let expected = consumed.map_or(0, |c| c + 1);

        match consumed {
            Some(cur) if start <= cur && end > cur => {
                debug!("Span for '{}' overlaps consumed text, moving start {} -> {}", claim, start, cur + 1);
                start = cur + 1;
                clean = false;
            }
            Some(cur) if start <= cur => {
                debug!("Span for '{}' lies inside consumed text, collapsing at {}", claim, cur);
                start = cur;
                end = cur;
                clean = false;
            }
            _ if start > expected => {
                debug!("Span for '{}' leaves a gap, moving start {} -> {}", claim, start, expected);
                start = expected;
                clean = false;
            }
            _ => {}
        }

        spans.push(ClaimSpan::from_document(claim.clone(), document, start, end));
        consumed = Some(end);
    }

    ClaimSpanSet::new(spans, clean)
}

/// Locate one proposal, returning its character range and whether it was
/// found verbatim
fn provisional_range(
    document: &str,
    doc_len: usize,
    claim: &str,
    proposed: &str,
    keyword_window: usize,
) -> ((usize, usize), bool) {
    if proposed.trim().is_empty() {
        if let Some(range) = keyword_span(document, claim, keyword_window) {
            warn!(
                "Empty text span for claim '{}', using keyword window [{}, {})",
                claim, range.0, range.1
            );
            return (range, false);
        }
        warn!("No text span found for claim '{}', using claim as text", claim);
        let (range, _) = locate(document, doc_len, claim);
        return (range, false);
    }

    let (range, found) = locate(document, doc_len, proposed);
    if !found {
        warn!(
            "Text span '{}' not found in document for claim '{}'",
            proposed, claim
        );
    }
    (range, found)
}

/// First verbatim occurrence of `text`, or the `[0, len)` placeholder
fn locate(document: &str, doc_len: usize, text: &str) -> ((usize, usize), bool) {
    match document.find(text) {
        Some(byte_idx) => {
            let start = char_offset(document, byte_idx);
            ((start, start + char_len(text)), true)
        }
        None => ((0, char_len(text).min(doc_len)), false),
    }
}

/// Find the document region that best matches the words of `claim`
///
/// Windows of `window` characters start at every character and are scored by
/// how many claim words they contain (case-insensitive). The first
/// best-scoring window is widened to the previous and next newline and
/// trimmed. Returns `None` when no window contains any claim word.
pub fn keyword_span(document: &str, claim: &str, window: usize) -> Option<(usize, usize)> {
    let words = claim_keywords(claim);
    if words.is_empty() || window == 0 {
        return None;
    }

    let chars: Vec<char> = document.chars().collect();
    let n = chars.len();

    let mut best_score = 0;
    let mut best_start = None;
    for i in 0..n {
        let chunk: String = chars[i..(i + window).min(n)].iter().collect::<String>().to_lowercase();
        let score = words.iter().filter(|w| chunk.contains(w.as_str())).count();
        if score > best_score {
            best_score = score;
            best_start = Some(i);
        }
    }
    let i = best_start?;

    let mut start = chars[..i].iter().rposition(|&c| c == '\n').unwrap_or(0);
    let after = (i + window).min(n);
    let mut end = chars[after..]
        .iter()
        .position(|&c| c == '\n')
        .map(|p| after + p)
        .unwrap_or_else(|| (i + 2 * window).min(n));

    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }

    if start == end {
        None
    } else {
        debug!(
            "Keyword window for '{}' scored {}: '{}'",
            claim,
            best_score,
            char_slice(document, start, end)
        );
        Some((start, end))
    }
}

/// Lowercased claim words with surrounding punctuation removed
fn claim_keywords(claim: &str) -> Vec<String> {
    claim
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
