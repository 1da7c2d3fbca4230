//! Decompose command implementation.

use crate::cli::DecomposeArgs;
use crate::commands::read_document;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use factlens_decompose::{ClaimExtractor, DecomposeConfig, Pipeline};
use factlens_llm::{OllamaConfig, OllamaProvider};
use std::sync::Arc;
use tracing::info;

/// Execute the decompose command.
pub async fn execute_decompose(args: DecomposeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = read_document(&args.input)?;
    let (llm_config, decompose_config) = effective_config(&args, config)?;

    info!(
        "Using model '{}' at {}",
        llm_config.model, llm_config.endpoint
    );
    let provider = Arc::new(OllamaProvider::from_config(&llm_config)?);

    if args.claims_only {
        let extractor = ClaimExtractor::new(provider, decompose_config);
        let report = extractor.get_claims_with_report(&document).await;
        println!("{}", formatter.format_claims(&report)?);
    } else {
        let pipeline = Pipeline::new(provider, decompose_config)?;
        let result = pipeline.decompose(&document).await;
        println!("{}", formatter.format_decomposition(&result)?);
    }

    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration.
fn effective_config(args: &DecomposeArgs, config: &Config) -> Result<(OllamaConfig, DecomposeConfig)> {
    let mut llm = config.llm.clone();
    if let Some(model) = &args.model {
        llm.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        llm.endpoint = endpoint.clone();
    }

    let mut decompose = match args.preset {
        Some(preset) => preset.into(),
        None => config.decompose.clone(),
    };
    if let Some(max_retries) = args.max_retries {
        decompose.max_retries = max_retries;
    }
    decompose.validate().map_err(CliError::Config)?;

    Ok((llm, decompose))
}
