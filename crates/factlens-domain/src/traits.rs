//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the decomposition core and the
//! services it consumes. Implementations live in other crates.

use crate::{Modality, TokenUsage};

/// Trait for the text-generation oracle
///
/// Implemented by the infrastructure layer (factlens-llm). Calls are
/// synchronous and should be deterministic for the same prompt and seed on a
/// best-effort basis. The returned text is untrusted and may not be
/// well-formed structured data.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for `prompt` using the sampling `seed`
    fn generate(&self, prompt: &str, seed: u64) -> Result<String, Self::Error>;

    /// Cumulative token usage of this provider
    fn usage(&self) -> TokenUsage {
        TokenUsage::default()
    }

    /// Model identifier, for logs and reports
    fn model_name(&self) -> &str {
        "llm"
    }
}

/// Trait for turning a source of some modality into document text
///
/// Implemented by the application layer (factlens-decompose) for textual
/// sources; image and video extraction are provided by external services.
pub trait Normalizer {
    /// Error type for normalization
    type Error;

    /// Produce document text from `source`
    fn normalize(&self, modality: Modality, source: &str) -> Result<String, Self::Error>;
}
