//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// Takes the `--config` path rather than a loaded configuration so that
/// `init --force` can replace a file that no longer parses.
pub fn execute_config(args: ConfigArgs, path: Option<&Path>, formatter: &Formatter) -> Result<()> {
    let resolved = Config::resolve_path(path)?;

    match args.action {
        ConfigAction::Show => {
            let config = Config::load(path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", resolved.display());
        }
        ConfigAction::Init { force } => {
            init_config(&resolved, force)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote default configuration to {}", resolved.display()))
            );
        }
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save_to(path)
}
