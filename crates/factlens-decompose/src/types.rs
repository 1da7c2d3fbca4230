//! Result types for decomposition

use factlens_domain::{ClaimSpanSet, TokenUsage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a claim list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClaimSource {
    /// Parsed from an oracle response
    Oracle {
        /// Oracle round-trips used, including the successful one
        attempts: usize,
    },

    /// Produced by the sentence splitter
    Fallback,
}

impl ClaimSource {
    /// Whether the claims came from the sentence splitter
    pub fn is_fallback(&self) -> bool {
        matches!(self, ClaimSource::Fallback)
    }
}

impl fmt::Display for ClaimSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimSource::Oracle { attempts } => write!(f, "oracle ({} attempt(s))", attempts),
            ClaimSource::Fallback => write!(f, "sentence fallback"),
        }
    }
}

/// Claims extracted from one document, with their origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Ordered claims
    pub claims: Vec<String>,

    /// How the claims were obtained
    pub source: ClaimSource,
}

/// Full result of decomposing one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Claims anchored to the document
    pub claims: ClaimSpanSet,

    /// How the claim list was obtained
    pub source: ClaimSource,

    /// Oracle usage observed during this decomposition
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_source_serialization() {
        let json = serde_json::to_string(&ClaimSource::Oracle { attempts: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"oracle","attempts":2}"#);

        let json = serde_json::to_string(&ClaimSource::Fallback).unwrap();
        assert_eq!(json, r#"{"kind":"fallback"}"#);
    }

    #[test]
    fn test_claim_source_display() {
        assert_eq!(ClaimSource::Oracle { attempts: 1 }.to_string(), "oracle (1 attempt(s))");
        assert!(ClaimSource::Fallback.is_fallback());
    }
}
