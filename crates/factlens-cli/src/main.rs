//! Factlens CLI - Decompose documents into verifiable claims.

use anyhow::Context;
use clap::Parser;
use factlens_cli::cli::CliFormat;
use factlens_cli::commands;
use factlens_cli::{Cli, Command, Config, Formatter};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();

    match cli.command {
        // Config management must work even when the file does not parse
        Command::Config(args) => {
            let format = cli.format.map(Into::into).unwrap_or_default();
            let formatter = Formatter::new(format, !cli.no_color);
            commands::execute_config(args, config_path, &formatter).context("config command failed")?;
        }
        Command::Decompose(args) => {
            let (config, formatter) = load(cli.format, cli.no_color, config_path)?;
            commands::execute_decompose(args, &config, &formatter)
                .await
                .context("decompose failed")?;
        }
        Command::Split(args) => {
            let (config, formatter) = load(cli.format, cli.no_color, config_path)?;
            commands::execute_split(args, &config, &formatter).context("split failed")?;
        }
    }

    Ok(())
}

/// Load configuration and build the formatter, command-line flags first.
fn load(
    format: Option<CliFormat>,
    no_color: bool,
    path: Option<&Path>,
) -> anyhow::Result<(Config, Formatter)> {
    let config = Config::load(path).context("failed to load configuration")?;

    let format = format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !no_color && config.settings.color;

    Ok((config, Formatter::new(format, color_enabled)))
}

/// Logs go to stderr so that stdout carries only command output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
