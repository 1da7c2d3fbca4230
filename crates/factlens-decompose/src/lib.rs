//! Factlens Decomposition Core
//!
//! Turns a document into atomic, independently verifiable claims, each
//! anchored to a character span of the document.
//!
//! # Architecture
//!
//! ```text
//! Document → ClaimExtractor → claims → SpanRestorer → ClaimSpanSet
//!               │  (oracle, retries,        │  (oracle, retries,
//!               │   sentence fallback)      │   reconciliation)
//! ```
//!
//! Both stages call an unreliable oracle (an [`LlmProvider`]) whose output is
//! repaired heuristically and retried with attempt-indexed seeds. Neither
//! stage fails: the extractor degrades to sentence splitting and the restorer
//! to a deterministic, flagged-partial reconciliation.
//!
//! # Example Usage
//!
//! ```no_run
//! use factlens_decompose::{DecomposeConfig, Pipeline};
//! use factlens_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockProvider::new(r#"{"claims": ["Alice works at Acme Corp."]}"#));
//! let pipeline = Pipeline::new(llm, DecomposeConfig::default())?;
//!
//! let result = pipeline.decompose("Alice works at Acme Corp.").await;
//! for span in result.claims.iter() {
//!     println!("{} [{}, {})", span.claim, span.start, span.end);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`LlmProvider`]: factlens_domain::traits::LlmProvider

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod normalize;
mod oracle;
pub mod parser;
mod pipeline;
mod prompt;
pub mod reconcile;
mod restorer;
pub mod retry;
mod splitter;
mod types;

#[cfg(test)]
mod tests;

pub use config::{DecomposeConfig, PromptTemplates};
pub use error::{DecomposeError, NormalizeError};
pub use extractor::ClaimExtractor;
pub use normalize::TextNormalizer;
pub use oracle::Oracle;
pub use pipeline::{Pipeline, PipelineHandle};
pub use prompt::{PromptBuilder, DEFAULT_DECOMPOSE_TEMPLATE, DEFAULT_RESTORE_TEMPLATE};
pub use restorer::{align_proposals, SpanRestorer};
pub use splitter::{SentenceSplitter, DEFAULT_MIN_SENTENCE_CHARS};
pub use types::{ClaimSource, Decomposition, ExtractionReport};
