//! Error types for decomposition and normalization
//!
//! The public decomposition operations never return these: they are produced
//! per attempt, logged, and absorbed by the retry loop.

use factlens_domain::Modality;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a single decomposition attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecomposeError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Oracle call did not finish in time
    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    /// Response could not be parsed into the expected structure
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Response parsed but carried no claims
    #[error("Response contained no claims")]
    EmptyClaims,

    /// Restore mapping has the wrong number of entries
    #[error("Mapping has {found} entries, expected {expected}")]
    CountMismatch {
        /// Entries required (one per claim)
        expected: usize,
        /// Entries returned by the oracle
        found: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A spawned decomposition task did not complete
    #[error("Task failed: {0}")]
    Task(String),
}

/// Errors that can occur while producing document text from a source
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Modality has no built-in normalizer
    #[error("Unsupported modality: {0}")]
    UnsupportedModality(Modality),

    /// Source could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Source produced no text
    #[error("Source is empty: {0}")]
    Empty(String),
}
