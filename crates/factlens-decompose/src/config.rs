//! Configuration for the decomposition core

use crate::prompt::{DEFAULT_DECOMPOSE_TEMPLATE, DEFAULT_RESTORE_TEMPLATE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prompt templates sent to the oracle
///
/// `{doc}` is replaced by the document and `{claims}` by the claims rendered
/// as a JSON array of strings, one per line. Substitution is single-pass, so
/// placeholder text inside the document is never expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    /// Template for claim decomposition (needs `{doc}`)
    pub decompose: String,

    /// Template for claim-to-span alignment (needs `{doc}` and `{claims}`)
    pub restore: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            decompose: DEFAULT_DECOMPOSE_TEMPLATE.to_string(),
            restore: DEFAULT_RESTORE_TEMPLATE.to_string(),
        }
    }
}

/// Configuration for claim extraction and span restoration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Oracle round-trips allowed per operation
    pub max_retries: usize,

    /// Seed of the first attempt; attempt `i` uses `base_seed + i`
    pub base_seed: u64,

    /// Maximum time for a single oracle call (seconds)
    pub attempt_timeout_secs: u64,

    /// Window size (characters) for the keyword-overlap span search
    pub keyword_window: usize,

    /// Documents longer than this (characters) skip the oracle and are split
    pub max_document_chars: usize,

    /// Fallback sentences shorter than this (characters) are dropped
    pub min_sentence_chars: usize,

    /// Prompt templates
    pub prompts: PromptTemplates,
}

impl DecomposeConfig {
    /// Get the per-attempt timeout as a Duration
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        if self.attempt_timeout_secs == 0 {
            return Err("attempt_timeout_secs must be greater than 0".to_string());
        }
        if self.keyword_window == 0 {
            return Err("keyword_window must be greater than 0".to_string());
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if !self.prompts.decompose.contains("{doc}") {
            return Err("decompose prompt must contain {doc}".to_string());
        }
        if !self.prompts.restore.contains("{doc}") || !self.prompts.restore.contains("{claims}") {
            return Err("restore prompt must contain {doc} and {claims}".to_string());
        }
        Ok(())
    }
}

impl Default for DecomposeConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_seed: 42,
            attempt_timeout_secs: 120,
            keyword_window: 50,
            max_document_chars: 50_000,
            min_sentence_chars: 3,
            prompts: PromptTemplates::default(),
        }
    }
}

impl DecomposeConfig {
    /// Aggressive preset: fewer retries and shorter timeouts for faster turnaround
    pub fn aggressive() -> Self {
        Self {
            max_retries: 2,
            attempt_timeout_secs: 60,
            max_document_chars: 20_000,
            ..Self::default()
        }
    }

    /// Lenient preset: more retries and longer timeouts for better quality
    pub fn lenient() -> Self {
        Self {
            max_retries: 5,
            attempt_timeout_secs: 300,
            keyword_window: 80,
            max_document_chars: 100_000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
