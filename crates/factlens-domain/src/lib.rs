//! Factlens Domain Layer
//!
//! This crate contains the data model shared by every stage of the claim
//! decomposition pipeline. It depends only on `serde` (spans are the JSON
//! output contract) and defines the trait interfaces for the external
//! collaborators the core consumes.
//!
//! ## Key Concepts
//!
//! - **Claim**: an atomic, independently verifiable statement (a plain `String`)
//! - **ClaimSpan**: a claim anchored to a character range `[start, end)` of the document
//! - **ClaimSpanSet**: the ordered spans of one run, non-overlapping in claim order
//! - **Modality**: the kind of source a document is normalized from
//! - **TokenUsage**: oracle accounting side channel
//!
//! ## Architecture
//!
//! - Pure data and validation only
//! - Oracle and normalization implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod modality;
pub mod span;
pub mod traits;
pub mod usage;

// Re-exports for convenience
pub use modality::Modality;
pub use span::{ClaimSpan, ClaimSpanSet};
pub use usage::TokenUsage;
