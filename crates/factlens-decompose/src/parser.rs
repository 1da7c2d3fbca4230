//! Parse and repair untrusted oracle output
//!
//! Oracle responses are usually, but not always, well-formed JSON. Repair is
//! limited to bounded string heuristics (fence stripping, brace unwrapping and
//! balancing, Python-literal relaxation) followed by a strict `serde_json`
//! parse. Response content is never evaluated.

use crate::error::DecomposeError;
use serde::de::{DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Clean a raw response so that a strict JSON parser has a chance
///
/// Steps, in order:
/// 1. Trim and strip a markdown code fence (with or without a language tag)
/// 2. Unwrap doubled braces `{{ ... }}`
/// 3. Drop prose before the first `{`
/// 4. Cut trailing text after the first complete value, or close unclosed
///    strings, arrays and objects
pub fn clean_response(response: &str) -> String {
    let text = strip_code_fence(response.trim());
    let text = unwrap_double_braces(text.trim());
    let text = skip_leading_prose(text);
    balance_delimiters(text)
}

/// Parse a response into any deserializable type, repairing it first
///
/// Tries the cleaned text with `serde_json`; if that fails, converts
/// Python-literal syntax to JSON and tries once more.
pub fn parse_with_repair<T: DeserializeOwned>(response: &str) -> Result<T, DecomposeError> {
    let cleaned = clean_response(response);
    if cleaned.is_empty() {
        return Err(DecomposeError::InvalidFormat("empty response".to_string()));
    }

    match serde_json::from_str::<T>(&cleaned) {
        Ok(parsed) => Ok(parsed),
        Err(strict_err) => {
            debug!("Strict JSON parse failed ({}), trying relaxed syntax", strict_err);
            let relaxed = relax_literals(&cleaned);
            serde_json::from_str::<T>(&relaxed).map_err(|e| {
                DecomposeError::InvalidFormat(format!(
                    "JSON parse error: {} (relaxed: {})",
                    strict_err, e
                ))
            })
        }
    }
}

/// Parse a response into a generic JSON value
pub fn parse_structured(response: &str) -> Result<Value, DecomposeError> {
    parse_with_repair::<Value>(response)
}

/// Parse a decomposition response into its claim list
///
/// Expects an object with a `claims` array. Non-string and blank entries
/// are dropped; a list that ends up empty is an error.
pub fn parse_claims(response: &str) -> Result<Vec<String>, DecomposeError> {
    let json = parse_structured(response)?;

    let claims_array = json
        .get("claims")
        .and_then(Value::as_array)
        .ok_or_else(|| DecomposeError::InvalidFormat("Expected a \"claims\" array".to_string()))?;

    let claims: Vec<String> = claims_array
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if claims.is_empty() {
        return Err(DecomposeError::EmptyClaims);
    }
    Ok(claims)
}

/// Parse a restore response into a claim-to-text mapping
pub fn parse_mapping(response: &str) -> Result<ProposedMapping, DecomposeError> {
    parse_with_repair::<ProposedMapping>(response)
}

/// One `claim -> text` entry proposed by the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalEntry {
    /// Key as written by the oracle
    pub claim: String,

    /// Proposed verbatim document text (empty when missing or not a string)
    pub text: String,
}

/// Claim-to-text mapping in the order the oracle wrote it
///
/// Unlike a JSON map, duplicate keys are preserved so that repeated claims
/// still get one entry each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedMapping {
    entries: Vec<ProposalEntry>,
}

impl ProposedMapping {
    /// Build a mapping from `(claim, text)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| ProposalEntry {
                    claim: k.into(),
                    text: v.into(),
                })
                .collect(),
        }
    }

    /// Entries in oracle order
    pub fn entries(&self) -> &[ProposalEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ProposedMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = ProposedMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping claims to text spans")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((claim, value)) = access.next_entry::<String, Value>()? {
                    let text = match value {
                        Value::String(s) => s,
                        _ => String::new(),
                    };
                    entries.push(ProposalEntry { claim, text });
                }
                Ok(ProposedMapping { entries })
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// Remove a surrounding markdown code fence, keeping only its body
fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_ticks = &text[open + 3..];

    // Skip an optional language tag such as `json`
    let tag_len = after_ticks
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_ticks.len());
    let body = &after_ticks[tag_len..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Unwrap `{{ ... }}` into `{ ... }`
fn unwrap_double_braces(text: &str) -> &str {
    match text.strip_prefix("{{") {
        Some(_) => {
            let inner = &text[1..];
            inner
                .strip_suffix("}}")
                .map(|_| &inner[..inner.len() - 1])
                .unwrap_or(inner)
        }
        None => text,
    }
}

/// Drop any text before the first `{`
fn skip_leading_prose(text: &str) -> &str {
    match text.find('{') {
        Some(idx) => &text[idx..],
        None => text,
    }
}

/// Keep the first complete value, closing anything left open
///
/// Aware of double- and single-quoted strings and backslash escapes.
fn balance_delimiters(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = text.len();

    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                    if stack.is_empty() {
                        end = idx + c.len_utf8();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    let mut repaired = text[..end].trim_end().to_string();
    if let Some(q) = quote {
        if escaped {
            repaired.pop();
        }
        repaired.push(q);
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }
    repaired
}

/// Convert Python-literal syntax into JSON
///
/// - single-quoted strings become double-quoted strings
/// - `True`, `False`, `None` become `true`, `false`, `null`
/// - trailing commas before `}` or `]` are removed
fn relax_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push('"');
                while let Some(s) = chars.next() {
                    out.push(s);
                    if s == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if s == '"' {
                        break;
                    }
                }
            }
            '\'' => {
                out.push('"');
                while let Some(s) = chars.next() {
                    match s {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => {}
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            '}' | ']' => {
                let kept = out.trim_end().len();
                if out[..kept].ends_with(',') {
                    out.truncate(kept - 1);
                }
                out.push(c);
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    _ => &word,
                });
            }
            other => out.push(other),
        }
    }

    out
}
