//! Claim extraction: document to ordered atomic claims

use crate::config::DecomposeConfig;
use crate::oracle::Oracle;
use crate::parser::parse_claims;
use crate::prompt::PromptBuilder;
use crate::retry::{retry_with_seeds, Attempt};
use crate::splitter::SentenceSplitter;
use crate::types::{ClaimSource, ExtractionReport};
use factlens_domain::span::char_len;
use factlens_domain::traits::LlmProvider;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Decomposes a document into atomic, context-preserving claims
///
/// Never fails: when the oracle cannot produce a usable claim list within the
/// retry budget, the document's sentences are returned instead.
pub struct ClaimExtractor<L> {
    oracle: Oracle<L>,
    config: Arc<DecomposeConfig>,
    splitter: SentenceSplitter,
}

impl<L> ClaimExtractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new extractor
    pub fn new(provider: Arc<L>, config: DecomposeConfig) -> Self {
        let config = Arc::new(config);
        let oracle = Oracle::new(provider, config.attempt_timeout());
        Self::from_parts(oracle, config)
    }

    pub(crate) fn from_parts(oracle: Oracle<L>, config: Arc<DecomposeConfig>) -> Self {
        Self {
            splitter: SentenceSplitter::new(config.min_sentence_chars),
            oracle,
            config,
        }
    }

    /// Extract the ordered claim list for `document`
    pub async fn get_claims(&self, document: &str) -> Vec<String> {
        self.get_claims_with_report(document).await.claims
    }

    /// Extract claims and report whether the oracle or the splitter produced them
    pub async fn get_claims_with_report(&self, document: &str) -> ExtractionReport {
        if document.trim().is_empty() {
            debug!("Empty document, nothing to decompose");
            return ExtractionReport {
                claims: Vec::new(),
                source: ClaimSource::Fallback,
            };
        }

        let doc_chars = char_len(document);
        if doc_chars > self.config.max_document_chars {
            warn!(
                "Document has {} chars (limit {}), splitting into sentences without the oracle",
                doc_chars, self.config.max_document_chars
            );
            return self.fallback(document);
        }

        info!("Extracting claims from document of {} chars", doc_chars);

        let prompt = PromptBuilder::new(&self.config.prompts.decompose, document).build();
        debug!("Prompt length: {} chars", prompt.len());

        let oracle = &self.oracle;
        let prompt = prompt.as_str();
        let outcome = retry_with_seeds(
            self.config.max_retries,
            self.config.base_seed,
            move |attempt, seed| async move {
                let response = match oracle.call(prompt, seed).await {
                    Ok(response) => response,
                    Err(e) => {
                        error!("Oracle call failed on attempt {}: {}", attempt + 1, e);
                        return Attempt::Failed(e.to_string());
                    }
                };
                match parse_claims(&response) {
                    Ok(claims) => Attempt::Accepted(claims),
                    Err(e) => {
                        error!(
                            "Parse LLM response error {} on attempt {}, response is: {}",
                            e,
                            attempt + 1,
                            response
                        );
                        Attempt::Failed(e.to_string())
                    }
                }
            },
        )
        .await;

        match outcome.value {
            Some(claims) => {
                info!(
                    "Extracted {} claims in {} attempt(s)",
                    claims.len(),
                    outcome.attempts
                );
                ExtractionReport {
                    claims,
                    source: ClaimSource::Oracle {
                        attempts: outcome.attempts,
                    },
                }
            }
            None => {
                info!(
                    "No usable claim list after {} attempt(s), using sentence split",
                    outcome.attempts
                );
                self.fallback(document)
            }
        }
    }

    /// Sentence split, or the whole trimmed document when no sentence survives
    fn fallback(&self, document: &str) -> ExtractionReport {
        let mut claims = self.splitter.split(document);
        if claims.is_empty() {
            claims.push(document.trim().to_string());
        }
        ExtractionReport {
            claims,
            source: ClaimSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factlens_llm::MockProvider;

    fn extractor(mock: &MockProvider, config: DecomposeConfig) -> ClaimExtractor<MockProvider> {
        ClaimExtractor::new(Arc::new(mock.clone()), config)
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let mock = MockProvider::new(r#"{"claims": ["Alice works at Acme."]}"#);
        let report = extractor(&mock, DecomposeConfig::default())
            .get_claims_with_report("Alice works at Acme.")
            .await;

        assert_eq!(report.claims, vec!["Alice works at Acme."]);
        assert_eq!(report.source, ClaimSource::Oracle { attempts: 1 });
        assert_eq!(mock.seeds(), vec![42]);
        assert!(mock.calls()[0].prompt.contains("Text: Alice works at Acme.\nOutput:"));
    }

    #[tokio::test]
    async fn test_retries_until_parseable() {
        let mock = MockProvider::new(r#"{"claims": ["A fact."]}"#);
        mock.push_response("not json at all");
        mock.push_error("connection reset");

        let report = extractor(&mock, DecomposeConfig::default())
            .get_claims_with_report("A fact. Another fact.")
            .await;

        assert_eq!(report.claims, vec!["A fact."]);
        assert_eq!(report.source, ClaimSource::Oracle { attempts: 3 });
        assert_eq!(mock.seeds(), vec![42, 43, 44]);
    }

    #[tokio::test]
    async fn test_empty_claim_list_is_retried() {
        let mock = MockProvider::new(r#"{"claims": ["B fact."]}"#);
        mock.push_response(r#"{"claims": []}"#);

        let claims = extractor(&mock, DecomposeConfig::default())
            .get_claims("A fact. B fact.")
            .await;

        assert_eq!(claims, vec!["B fact."]);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_falls_back_to_sentences() {
        let mock = MockProvider::new("I cannot help with that.");
        let doc = "Nepal protests began. Social media was banned.";

        let report = extractor(&mock, DecomposeConfig::default())
            .get_claims_with_report(doc)
            .await;

        assert_eq!(report.source, ClaimSource::Fallback);
        assert_eq!(report.claims, SentenceSplitter::default().split(doc));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_document_skips_oracle() {
        let mock = MockProvider::new(r#"{"claims": ["x"]}"#);
        let claims = extractor(&mock, DecomposeConfig::default()).get_claims("  \n ").await;

        assert!(claims.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_document_skips_oracle() {
        let mock = MockProvider::new(r#"{"claims": ["x"]}"#);
        let config = DecomposeConfig {
            max_document_chars: 10,
            ..DecomposeConfig::default()
        };

        let report = extractor(&mock, config)
            .get_claims_with_report("This document is long. It has two sentences.")
            .await;

        assert!(report.source.is_fallback());
        assert_eq!(report.claims.len(), 2);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tiny_document_still_yields_a_claim() {
        let mock = MockProvider::new("nope");
        let claims = extractor(&mock, DecomposeConfig::default()).get_claims("ok").await;
        assert_eq!(claims, vec!["ok"]);
    }

    #[tokio::test]
    async fn test_custom_template_and_seed() {
        let mock = MockProvider::new(r#"{"claims": ["x"]}"#);
        let mut config = DecomposeConfig::default();
        config.base_seed = 7;
        config.prompts.decompose = "Decompose: {doc}".to_string();

        extractor(&mock, config).get_claims("Some {claims} text").await;

        let calls = mock.calls();
        assert_eq!(calls[0].prompt, "Decompose: Some {claims} text");
        assert_eq!(calls[0].seed, 7);
    }
}
