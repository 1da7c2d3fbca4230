//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use factlens_decompose::{Decomposition, ExtractionReport};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a full decomposition.
    pub fn format_decomposition(&self, result: &Decomposition) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "claims": result.claims.spans(),
                    "clean": result.claims.is_clean(),
                    "source": result.source,
                    "usage": result.usage,
                });
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => self.format_spans_table(result),
            OutputFormat::Quiet => Ok(result.claims.claims().join("\n")),
        }
    }

    /// Format extracted claims without spans.
    pub fn format_claims(&self, report: &ExtractionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => {
                if report.claims.is_empty() {
                    return Ok(self.warning("No claims found."));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Claim"]);
                for (idx, claim) in report.claims.iter().enumerate() {
                    let number = (idx + 1).to_string();
                    builder.push_record([number.as_str(), claim.as_str()]);
                }
                Ok(format!(
                    "{}\n{}",
                    self.render(builder),
                    self.info(&format!("{} claim(s) from {}", report.claims.len(), report.source))
                ))
            }
            OutputFormat::Quiet => Ok(report.claims.join("\n")),
        }
    }

    /// Format sentences from the fallback splitter.
    pub fn format_sentences(&self, sentences: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(sentences)?),
            OutputFormat::Table => {
                if sentences.is_empty() {
                    return Ok(self.warning("No sentences found."));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Sentence"]);
                for (idx, sentence) in sentences.iter().enumerate() {
                    let number = (idx + 1).to_string();
                    builder.push_record([number.as_str(), sentence.as_str()]);
                }
                Ok(self.render(builder))
            }
            OutputFormat::Quiet => Ok(sentences.join("\n")),
        }
    }

    /// Format spans as a table with a summary line.
    fn format_spans_table(&self, result: &Decomposition) -> Result<String> {
        if result.claims.is_empty() {
            return Ok(self.warning("No claims found."));
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Start", "End", "Claim", "Text"]);
        for (idx, span) in result.claims.iter().enumerate() {
            let number = (idx + 1).to_string();
            let start = span.start.to_string();
            let end = span.end.to_string();
            builder.push_record([
                number.as_str(),
                start.as_str(),
                end.as_str(),
                span.claim.as_str(),
                span.text.as_str(),
            ]);
        }

        let summary = format!(
            "{} claim(s) from {}, {} oracle request(s)",
            result.claims.len(),
            result.source,
            result.usage.requests
        );
        let status = if result.claims.is_clean() {
            self.success(&format!("{}, spans clean", summary))
        } else {
            self.warning(&format!("{}, spans partially corrected", summary))
        };

        Ok(format!("{}\n{}", self.render(builder), status))
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
