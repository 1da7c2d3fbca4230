//! Producing document text from textual sources

use crate::error::NormalizeError;
use factlens_domain::traits::Normalizer;
use factlens_domain::Modality;
use tracing::debug;

/// Normalizer for textual modalities
///
/// `Text` reads the UTF-8 file at `source`; `RawString` uses `source` as the
/// document. Image and video sources need an external extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Create a new text normalizer
    pub fn new() -> Self {
        Self
    }
}

impl Normalizer for TextNormalizer {
    type Error = NormalizeError;

    fn normalize(&self, modality: Modality, source: &str) -> Result<String, NormalizeError> {
        let (text, origin) = match modality {
            Modality::Text => {
                let text = std::fs::read_to_string(source).map_err(|e| NormalizeError::Read {
                    path: source.to_string(),
                    source: e,
                })?;
                (text, source)
            }
            Modality::RawString => (source.to_string(), "raw string"),
            other => return Err(NormalizeError::UnsupportedModality(other)),
        };

        if text.trim().is_empty() {
            return Err(NormalizeError::Empty(origin.to_string()));
        }

        debug!("Normalized {} source into {} bytes", modality, text.len());
        Ok(text)
    }
}
