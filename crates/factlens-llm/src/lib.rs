//! Factlens LLM Provider Layer
//!
//! Oracle client implementations for the decomposition core.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from `factlens-domain`.
//! Every call takes a sampling seed so that retries are reproducible but diverse.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OllamaProvider`: Local Ollama API integration with an outbound rate limiter
//!
//! # Examples
//!
//! ```
//! use factlens_llm::MockProvider;
//! use factlens_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt", 42).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod rate_limit;

use factlens_domain::traits::LlmProvider as LlmProviderTrait;
use factlens_domain::TokenUsage;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use ollama::{OllamaConfig, OllamaProvider};
pub use rate_limit::RateLimiter;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One recorded call to a [`MockProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// Prompt that was sent
    pub prompt: String,

    /// Seed that was sent
    pub seed: u64,
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, Result<String, String>>,
    containing: Vec<(String, String)>,
    script: VecDeque<Result<String, String>>,
    calls: Vec<MockCall>,
    usage: TokenUsage,
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Lookup order for each call:
///
/// 1. The next entry of the FIFO script, if any is left
/// 2. A response registered for the exact prompt
/// 3. The first response whose fragment the prompt contains
/// 4. The default response
///
/// Clones share state, so a clone handed to the pipeline can be inspected
/// from the test afterwards.
///
/// # Examples
///
/// ```
/// use factlens_llm::MockProvider;
/// use factlens_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt", 1).unwrap(), "Fixed response");
///
/// // Scripted responses, one per call
/// let provider = MockProvider::default();
/// provider.push_error("timeout");
/// provider.push_response(r#"{"claims": ["A fact."]}"#);
/// assert!(provider.generate("prompt", 42).is_err());
/// assert_eq!(provider.generate("prompt", 43).unwrap(), r#"{"claims": ["A fact."]}"#);
/// assert_eq!(provider.seeds(), vec![42, 43]);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.state().responses.insert(prompt.into(), Ok(response.into()));
    }

    /// Respond with `response` whenever the prompt contains `fragment`
    pub fn add_response_containing(&self, fragment: impl Into<String>, response: impl Into<String>) {
        self.state().containing.push((fragment.into(), response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        self.state()
            .responses
            .insert(prompt.into(), Err("Mock error".to_string()));
    }

    /// Queue a response for the next unscripted call
    pub fn push_response(&self, response: impl Into<String>) {
        self.state().script.push_back(Ok(response.into()));
    }

    /// Queue an error for the next unscripted call
    pub fn push_error(&self, message: impl Into<String>) {
        self.state().script.push_back(Err(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Reset the call count and recorded calls
    pub fn reset_call_count(&self) {
        self.state().calls.clear();
    }

    /// All recorded calls in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Seeds of all recorded calls in order
    pub fn seeds(&self) -> Vec<u64> {
        self.state().calls.iter().map(|c| c.seed).collect()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, seed: u64) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.calls.push(MockCall {
            prompt: prompt.to_string(),
            seed,
        });

        let outcome = if let Some(scripted) = state.script.pop_front() {
            scripted
        } else if let Some(response) = state.responses.get(prompt) {
            response.clone()
        } else if let Some((_, response)) = state
            .containing
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
        {
            Ok(response.clone())
        } else {
            Ok(self.default_response.clone())
        };

        // Whitespace-delimited words stand in for tokens
        state.usage.requests += 1;
        state.usage.prompt_tokens += prompt.split_whitespace().count() as u64;
        if let Ok(response) = &outcome {
            state.usage.completion_tokens += response.split_whitespace().count() as u64;
        }

        outcome.map_err(LlmError::Other)
    }

    fn usage(&self) -> TokenUsage {
        self.state().usage
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt", 42);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello", 1).unwrap(), "world");
        assert_eq!(provider.generate("foo", 1).unwrap(), "bar");
        assert_eq!(provider.generate("unknown", 1).unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_fragment_responses() {
        let provider = MockProvider::default();
        provider.add_response_containing("decompose", "claims");
        provider.add_response_containing("verbatim", "spans");

        assert_eq!(provider.generate("please decompose this", 1).unwrap(), "claims");
        assert_eq!(provider.generate("map verbatim text", 1).unwrap(), "spans");
    }

    #[test]
    fn test_mock_provider_script_takes_precedence() {
        let provider = MockProvider::new("fallback");
        provider.add_response("prompt", "registered");
        provider.push_response("first");
        provider.push_error("boom");

        assert_eq!(provider.generate("prompt", 1).unwrap(), "first");
        assert_eq!(
            provider.generate("prompt", 2).unwrap_err(),
            LlmError::Other("boom".to_string())
        );
        assert_eq!(provider.generate("prompt", 3).unwrap(), "registered");
        assert_eq!(provider.generate("other", 4).unwrap(), "fallback");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1", 42).unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2", 43).unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.seeds(), vec![42, 43]);
        assert_eq!(provider.calls()[1].prompt, "prompt2");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("bad prompt", 42);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[test]
    fn test_mock_provider_usage() {
        let provider = MockProvider::new("two words");
        provider.generate("one two three", 42).unwrap();

        let usage = provider.usage();
        assert_eq!(usage.requests, 1);
        assert_eq!(usage.prompt_tokens, 3);
        assert_eq!(usage.completion_tokens, 2);
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test", 42).unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
