//! LLM prompt engineering for claim decomposition and span restoration

use serde_json::Value;

/// Builds a prompt by filling `{doc}` and `{claims}` into a template
pub struct PromptBuilder<'a> {
    template: &'a str,
    doc: &'a str,
    claims: Option<&'a [String]>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for `doc`
    pub fn new(template: &'a str, doc: &'a str) -> Self {
        Self {
            template,
            doc,
            claims: None,
        }
    }

    /// Add the claim list substituted for `{claims}`
    pub fn with_claims(mut self, claims: &'a [String]) -> Self {
        self.claims = Some(claims);
        self
    }

    /// Build the complete prompt
    ///
    /// Placeholders are expanded in a single left-to-right pass. Unknown
    /// `{...}` sequences (such as the JSON examples in the template) are
    /// copied through unchanged.
    pub fn build(&self) -> String {
        let claims = self.claims.map(format_claims).unwrap_or_default();
        let mut prompt = String::with_capacity(self.template.len() + self.doc.len() + claims.len());
        let mut rest = self.template;

        while let Some(open) = rest.find('{') {
            prompt.push_str(&rest[..open]);
            let tail = &rest[open..];
            if let Some(after) = tail.strip_prefix("{doc}") {
                prompt.push_str(self.doc);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{claims}") {
                prompt.push_str(&claims);
                rest = after;
            } else {
                prompt.push('{');
                rest = &tail[1..];
            }
        }
        prompt.push_str(rest);

        prompt.trim().to_string()
    }
}

/// Render claims as a JSON array, one claim per line
fn format_claims(claims: &[String]) -> String {
    if claims.is_empty() {
        return "[]".to_string();
    }
    let items: Vec<String> = claims
        .iter()
        .map(|c| format!("  {}", Value::String(c.clone())))
        .collect();
    format!("[\n{}\n]", items.join(",\n"))
}

/// Default decomposition prompt
pub const DEFAULT_DECOMPOSE_TEMPLATE: &str = r#"Your task is to decompose the text into atomic claims that can each be fact-checked on their own.
The answer should be a JSON object with a single key "claims", whose value is a list of strings, where each string is one context-independent claim representing one fact.

Rules:
1. Each claim must be atomic: one verifiable fact per claim.
2. Preserve context. Every claim must keep the geographic, temporal, entity, and causal context it needs to be judged true or false on its own. Never drop a location, date, or named entity that changes the meaning of the claim.
3. Avoid vague references like 'he', 'she', 'it', 'this', 'the company', or 'the man'; use complete names.
4. Generate at least one claim for each sentence of the text.
5. Keep claims concise and self-contained.

For example,
Text: Protests in Nepal occurred due to social media bans.
Output:
{"claims": ["Protests occurred in Nepal.", "Social media bans were imposed in Nepal.", "Protests in Nepal were due to social media bans imposed in Nepal."]}

Text: Mary is a five-year old girl, she likes playing piano and she doesn't like cookies.
Output:
{"claims": ["Mary is a five-year old girl.", "Mary likes playing piano.", "Mary doesn't like cookies."]}

Text: {doc}
Output:
"#;

/// Default claim-to-span alignment prompt
pub const DEFAULT_RESTORE_TEMPLATE: &str = r#"Your task is to map each claim back to the text of the document it was derived from.
Return a JSON object where each key is one claim, copied exactly as given, and each value is the verbatim text span of the document that the claim comes from.

Rules:
1. Values must be copied verbatim from the document, character for character.
2. Spans must follow the order of the claims and must not overlap.
3. Together the spans should cover the document from start to end, with no text left between them.
4. Return exactly one entry per claim.

For example,
Document: Mary is a five-year old girl, she likes playing piano and she doesn't like cookies.
Claims:
[
  "Mary is a five-year old girl.",
  "Mary likes playing piano.",
  "Mary doesn't like cookies."
]
Output:
{"Mary is a five-year old girl.": "Mary is a five-year old girl,", "Mary likes playing piano.": "she likes playing piano", "Mary doesn't like cookies.": "and she doesn't like cookies."}

Document: {doc}
Claims:
{claims}
Output:
"#;
