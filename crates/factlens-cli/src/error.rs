//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Oracle client could not be created
    #[error("LLM error: {0}")]
    Llm(#[from] factlens_llm::LlmError),

    /// Pipeline could not be built
    #[error("Decomposition error: {0}")]
    Decompose(#[from] factlens_decompose::DecomposeError),

    /// Input could not be turned into a document
    #[error("Input error: {0}")]
    Normalize(#[from] factlens_decompose::NormalizeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
