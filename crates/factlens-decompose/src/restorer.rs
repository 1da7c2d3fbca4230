//! Span restoration: anchoring claims back to the document

use crate::config::DecomposeConfig;
use crate::error::DecomposeError;
use crate::oracle::Oracle;
use crate::parser::{parse_mapping, ProposedMapping};
use crate::prompt::PromptBuilder;
use crate::reconcile::reconcile;
use crate::retry::{retry_with_seeds, Attempt};
use factlens_domain::span::char_len;
use factlens_domain::traits::LlmProvider;
use factlens_domain::ClaimSpanSet;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Maps each claim to a contiguous, non-overlapping span of the document
///
/// The oracle proposes the text for every claim; [`reconcile`] then repairs
/// the proposal. A clean reconciliation is returned immediately, otherwise the
/// latest partial one is kept and returned once the retry budget runs out.
pub struct SpanRestorer<L> {
    oracle: Oracle<L>,
    config: Arc<DecomposeConfig>,
}

impl<L> SpanRestorer<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new restorer
    pub fn new(provider: Arc<L>, config: DecomposeConfig) -> Self {
        let config = Arc::new(config);
        let oracle = Oracle::new(provider, config.attempt_timeout());
        Self::from_parts(oracle, config)
    }

    pub(crate) fn from_parts(oracle: Oracle<L>, config: Arc<DecomposeConfig>) -> Self {
        Self { oracle, config }
    }

    /// Restore spans for `claims` in `document`
    ///
    /// Always returns exactly one span per claim.
    pub async fn restore(&self, document: &str, claims: &[String]) -> ClaimSpanSet {
        if claims.is_empty() {
            return ClaimSpanSet::empty();
        }

        let window = self.config.keyword_window;
        let doc_chars = char_len(document);
        if doc_chars > self.config.max_document_chars {
            warn!(
                "Document has {} chars (limit {}), locating claims without the oracle",
                doc_chars, self.config.max_document_chars
            );
            return locate_without_oracle(document, claims, window);
        }

        let prompt = PromptBuilder::new(&self.config.prompts.restore, document)
            .with_claims(claims)
            .build();
        debug!("Restore prompt length: {} chars", prompt.len());

        let oracle = &self.oracle;
        let prompt = prompt.as_str();
        let max_attempts = self.config.max_retries.max(1);

        let outcome = retry_with_seeds(max_attempts, self.config.base_seed, move |attempt, seed| async move {
            let response = match oracle.call(prompt, seed).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Oracle call failed on attempt {}: {}", attempt + 1, e);
                    return Attempt::Failed(e.to_string());
                }
            };

            let mapping = match parse_mapping(&response) {
                Ok(mapping) => mapping,
                Err(e) => {
                    error!(
                        "Parse LLM response error {} on attempt {}, response is: {}",
                        e,
                        attempt + 1,
                        response
                    );
                    return Attempt::Failed(e.to_string());
                }
            };

            if mapping.len() != claims.len() {
                let err = DecomposeError::CountMismatch {
                    expected: claims.len(),
                    found: mapping.len(),
                };
                error!("{} on attempt {}", err, attempt + 1);
                return Attempt::Failed(err.to_string());
            }

            let proposed = align_proposals(claims, &mapping);
            let set = reconcile(document, claims, &proposed, window);
            if set.is_clean() {
                Attempt::Accepted(set)
            } else {
                warn!(
                    "Restore claims partially satisfied. Retry {}/{}",
                    attempt + 1,
                    max_attempts
                );
                Attempt::Partial(set)
            }
        })
        .await;

        match outcome.value {
            Some(set) => {
                if !outcome.clean {
                    info!("Using partial claim restoration results");
                }
                set
            }
            None => {
                warn!(
                    "No usable mapping after {} attempt(s), locating claims without the oracle",
                    outcome.attempts
                );
                locate_without_oracle(document, claims, window)
            }
        }
    }
}

/// Deterministic reconciliation from [`self_proposals`], always partial
fn locate_without_oracle(document: &str, claims: &[String], window: usize) -> ClaimSpanSet {
    let set = reconcile(document, claims, &self_proposals(document, claims), window);
    ClaimSpanSet::new(set.into_spans(), false)
}

/// Proposals used when the oracle gave no mapping at all
///
/// A claim found verbatim in the document proposes itself; any other claim
/// gets an empty proposal and is located by keywords.
fn self_proposals(document: &str, claims: &[String]) -> Vec<String> {
    claims
        .iter()
        .map(|claim| {
            if !claim.is_empty() && document.contains(claim.as_str()) {
                claim.clone()
            } else {
                String::new()
            }
        })
        .collect()
}

/// Pick one proposed text per claim, in claim order
///
/// Each claim takes the first unused entry whose key equals it, then one
/// equal after trimming and case folding, then the unused entry at its own
/// index, then the first unused entry. A claim left without an entry gets an
/// empty proposal.
pub fn align_proposals(claims: &[String], mapping: &ProposedMapping) -> Vec<String> {
    let entries = mapping.entries();
    let mut used = vec![false; entries.len()];
    let mut proposed = Vec::with_capacity(claims.len());

    for (idx, claim) in claims.iter().enumerate() {
        let folded = claim.trim().to_lowercase();
        let pick = entries
            .iter()
            .enumerate()
            .position(|(j, e)| !used[j] && e.claim == *claim)
            .or_else(|| {
                entries
                    .iter()
                    .enumerate()
                    .position(|(j, e)| !used[j] && e.claim.trim().to_lowercase() == folded)
            })
            .or_else(|| (idx < entries.len() && !used[idx]).then_some(idx))
            .or_else(|| used.iter().position(|u| !u));

        match pick {
            Some(j) => {
                used[j] = true;
                proposed.push(entries[j].text.clone());
            }
            None => proposed.push(String::new()),
        }
    }

    proposed
}
