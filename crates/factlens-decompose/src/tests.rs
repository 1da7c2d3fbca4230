//! Integration tests for the decomposition pipeline

#[cfg(test)]
mod tests {
    use crate::{
        ClaimSource, DecomposeConfig, Pipeline, PipelineHandle, SentenceSplitter,
    };
    use crate::{ClaimExtractor, Oracle, SpanRestorer};
    use factlens_domain::traits::LlmProvider;
    use factlens_llm::MockProvider;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const DOC: &str = "Nepal protests began. Social media was banned.";
    const DECOMPOSE_MARKER: &str = "decompose the text into atomic claims";
    const RESTORE_MARKER: &str = "map each claim back to the text";

    const CLAIMS: &str =
        r#"{"claims": ["Protests began in Nepal.", "Social media was banned in Nepal."]}"#;
    const MAPPING: &str = r#"{"Protests began in Nepal.": "Nepal protests began.", "Social media was banned in Nepal.": "Social media was banned."}"#;

    fn scripted(claims: &str, mapping: &str) -> MockProvider {
        let mock = MockProvider::new("unexpected prompt");
        mock.add_response_containing(DECOMPOSE_MARKER, claims);
        mock.add_response_containing(RESTORE_MARKER, mapping);
        mock
    }

    fn pipeline(mock: &MockProvider) -> Pipeline<MockProvider> {
        Pipeline::new(Arc::new(mock.clone()), DecomposeConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_full_decomposition_flow() {
        let mock = scripted(CLAIMS, MAPPING);

        let result = pipeline(&mock).decompose(DOC).await;

        assert_eq!(result.source, ClaimSource::Oracle { attempts: 1 });
        assert!(result.claims.is_clean());
        let spans = result.claims.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].claim, "Protests began in Nepal.");
        assert_eq!((spans[0].start, spans[0].end), (0, 21));
        assert_eq!(spans[1].text, "Social media was banned.");
        assert_eq!((spans[1].start, spans[1].end), (22, 46));
        assert_eq!(result.usage.requests, 2);
    }

    #[tokio::test]
    async fn test_malformed_and_fenced_responses_are_repaired() {
        let claims = "```json\n{\"claims\": [\"Protests began in Nepal.\", \"Social media was banned in Nepal.\"]\n```";
        let mapping = r#"{{"Protests began in Nepal.": "Nepal protests began.", "Social media was banned in Nepal.": "Social media was banned."}}"#;
        let mock = scripted(claims, mapping);

        let result = pipeline(&mock).decompose(DOC).await;

        assert_eq!(result.source, ClaimSource::Oracle { attempts: 1 });
        assert!(result.claims.is_clean());
        assert_eq!(result.claims.len(), 2);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_overlap_is_corrected() {
        let mapping = r#"{"Protests began in Nepal.": "Nepal protests began. Social", "Social media was banned in Nepal.": "Social media was banned."}"#;
        let mock = scripted(CLAIMS, mapping);

        let result = pipeline(&mock).decompose(DOC).await;
        let spans = result.claims.spans();

        assert!(result.claims.is_partial());
        assert!(result.claims.is_ordered());
        assert!(spans[1].start >= spans[0].end);
        assert!(!spans[0].overlaps(&spans[1]));
        assert!(result.claims.is_anchored_in(DOC));
    }

    #[tokio::test]
    async fn test_empty_proposed_span_uses_keywords() {
        let mapping = r#"{"Protests began in Nepal.": "Nepal protests began.", "Social media was banned in Nepal.": ""}"#;
        let mock = scripted(CLAIMS, mapping);

        let result = pipeline(&mock).decompose(DOC).await;

        assert!(result.claims.is_partial());
        let second = &result.claims.spans()[1];
        let lowered = second.text.to_lowercase();
        assert!(["social", "media", "banned"].iter().any(|w| lowered.contains(w)));
    }

    #[tokio::test]
    async fn test_total_oracle_failure_falls_back_to_sentences() {
        let mock = MockProvider::new("Sorry, I can't produce JSON today.");

        let result = pipeline(&mock).decompose(DOC).await;

        assert_eq!(result.source, ClaimSource::Fallback);
        let expected = SentenceSplitter::default().split(DOC);
        assert_eq!(result.claims.claims(), expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(result.claims.len(), expected.len());
        assert!(result.claims.is_ordered());
        assert!(result.claims.is_anchored_in(DOC));

        // Three extraction attempts, then three restore attempts
        assert_eq!(mock.seeds(), vec![42, 43, 44, 42, 43, 44]);
    }

    #[tokio::test]
    async fn test_oracle_errors_are_absorbed() {
        let mock = scripted(CLAIMS, MAPPING);
        mock.push_error("503 Service Unavailable");
        mock.push_error("connection reset");

        let result = pipeline(&mock).decompose(DOC).await;

        assert_eq!(result.source, ClaimSource::Oracle { attempts: 3 });
        assert!(result.claims.is_clean());
        assert_eq!(mock.seeds(), vec![42, 43, 44, 42]);
    }

    #[tokio::test]
    async fn test_empty_document() {
        let mock = scripted(CLAIMS, MAPPING);

        let result = pipeline(&mock).decompose("").await;

        assert!(result.claims.is_empty());
        assert_eq!(mock.call_count(), 0);
        assert_eq!(result.usage.requests, 0);
    }

    #[tokio::test]
    async fn test_snapshot_survives_reconfigure() {
        let mock = scripted(CLAIMS, MAPPING);
        let handle = PipelineHandle::new(Arc::new(mock.clone()), DecomposeConfig::default()).unwrap();

        let old = handle.snapshot();
        handle
            .reconfigure(DecomposeConfig {
                base_seed: 100,
                ..DecomposeConfig::default()
            })
            .unwrap();

        old.decompose(DOC).await;
        handle.decompose(DOC).await;

        assert_eq!(mock.seeds(), vec![42, 42, 100, 100]);
    }

    #[tokio::test]
    async fn test_decompose_all_keeps_input_order() {
        let mock = MockProvider::new("not json");
        let handle = PipelineHandle::new(Arc::new(mock), DecomposeConfig::default()).unwrap();

        let documents = vec![
            "First document here.".to_string(),
            "Second document. It has two sentences.".to_string(),
            String::new(),
        ];
        let results = handle.decompose_all(documents).await;

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.claims.claims(), vec!["First document here."]);
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.claims.len(), 2);
        assert!(results[2].as_ref().unwrap().claims.is_empty());
    }

    #[tokio::test]
    async fn test_decomposition_serializes_output_contract() {
        let mock = scripted(CLAIMS, MAPPING);
        let result = pipeline(&mock).decompose(DOC).await;

        let json = serde_json::to_value(result.claims.spans()).unwrap();
        assert_eq!(
            json[0],
            serde_json::json!({
                "claim": "Protests began in Nepal.",
                "text": "Nepal protests began.",
                "start": 0,
                "end": 21
            })
        );
    }

    /// Answers with a fixed response, but only after `stall` on the first call
    struct StallingProvider {
        response: String,
        stall: Duration,
        seeds: Mutex<Vec<u64>>,
    }

    impl StallingProvider {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                stall: Duration::from_millis(300),
                seeds: Mutex::new(Vec::new()),
            }
        }

        fn seeds(&self) -> Vec<u64> {
            self.seeds.lock().unwrap().clone()
        }
    }

    impl LlmProvider for StallingProvider {
        type Error = String;

        fn generate(&self, _prompt: &str, seed: u64) -> Result<String, String> {
            let first = {
                let mut seeds = self.seeds.lock().unwrap();
                seeds.push(seed);
                seeds.len() == 1
            };
            if first {
                std::thread::sleep(self.stall);
            }
            Ok(self.response.clone())
        }
    }

    fn short_timeout_oracle(provider: &Arc<StallingProvider>) -> Oracle<StallingProvider> {
        Oracle::new(Arc::clone(provider), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_timed_out_extraction_attempt_uses_retry_budget() {
        let provider = Arc::new(StallingProvider::new(CLAIMS));
        let extractor = ClaimExtractor::from_parts(
            short_timeout_oracle(&provider),
            Arc::new(DecomposeConfig::default()),
        );

        let report = extractor.get_claims_with_report(DOC).await;

        assert_eq!(report.source, ClaimSource::Oracle { attempts: 2 });
        assert_eq!(
            report.claims,
            vec!["Protests began in Nepal.", "Social media was banned in Nepal."]
        );
        assert_eq!(provider.seeds(), vec![42, 43]);
    }

    #[tokio::test]
    async fn test_timed_out_restore_attempt_uses_retry_budget() {
        let provider = Arc::new(StallingProvider::new(MAPPING));
        let restorer = SpanRestorer::from_parts(
            short_timeout_oracle(&provider),
            Arc::new(DecomposeConfig::default()),
        );
        let claims = vec![
            "Protests began in Nepal.".to_string(),
            "Social media was banned in Nepal.".to_string(),
        ];

        let set = restorer.restore(DOC, &claims).await;

        assert!(set.is_clean());
        assert_eq!((set.spans()[1].start, set.spans()[1].end), (22, 46));
        assert_eq!(provider.seeds(), vec![42, 43]);
    }

    #[tokio::test]
    async fn test_oversized_document_never_reaches_oracle() {
        let mock = MockProvider::new("not json");
        let config = DecomposeConfig {
            max_document_chars: 10,
            ..DecomposeConfig::default()
        };
        let pipeline = Pipeline::new(Arc::new(mock.clone()), config).unwrap();

        let result = pipeline.decompose(DOC).await;

        assert_eq!(mock.call_count(), 0);
        assert_eq!(result.source, ClaimSource::Fallback);
        assert_eq!(result.claims.claims(), vec!["Nepal protests began.", "Social media was banned."]);
        assert!(result.claims.is_partial());
        assert!(result.claims.is_anchored_in(DOC));
        assert_eq!(result.usage.requests, 0);
    }
}
