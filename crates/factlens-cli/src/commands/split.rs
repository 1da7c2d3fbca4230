//! Split command implementation.

use crate::cli::InputArgs;
use crate::commands::read_document;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use factlens_decompose::SentenceSplitter;

/// Execute the split command.
pub fn execute_split(args: InputArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = read_document(&args)?;
    let sentences = SentenceSplitter::new(config.decompose.min_sentence_chars).split(&document);
    println!("{}", formatter.format_sentences(&sentences)?);
    Ok(())
}
