//! Modality module - the kinds of source a document can be normalized from

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of source handed to a [`Normalizer`](crate::traits::Normalizer)
///
/// Every modality ends up as plain document text before decomposition:
/// - Text: a UTF-8 text file on disk
/// - Image: an image whose visible text and content must be described
/// - Video: a video whose frames and audio must be transcribed
/// - RawString: text passed inline, used as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Path to a text file
    Text,

    /// Path or URL of an image
    Image,

    /// Path or URL of a video
    Video,

    /// Inline document text
    RawString,
}

impl Modality {
    /// Get the modality name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::RawString => "raw_string",
        }
    }

    /// Parse a modality from a string, accepting `-` or `_` separators
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "text" => Some(Modality::Text),
            "image" => Some(Modality::Image),
            "video" => Some(Modality::Video),
            "raw_string" | "string" | "raw" => Some(Modality::RawString),
            _ => None,
        }
    }

    /// Whether this modality carries the document text itself
    pub fn is_textual(&self) -> bool {
        matches!(self, Modality::Text | Modality::RawString)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
