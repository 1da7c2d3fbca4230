//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use factlens_decompose::DecomposeConfig;
use factlens_domain::Modality;
use std::path::PathBuf;

/// Factlens CLI - Decompose documents into verifiable claims.
#[derive(Debug, Parser)]
#[command(name = "factlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.factlens/config.toml)
    #[arg(short, long, global = true, env = "FACTLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (claims only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decompose a document into claims anchored to its text
    Decompose(DecomposeArgs),

    /// Split a document into sentences without calling the model
    Split(InputArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Where the document comes from.
///
/// With neither `TEXT` nor `--input`, the document is read from stdin.
#[derive(Debug, Parser)]
pub struct InputArgs {
    /// Document text
    #[arg(conflicts_with = "input")]
    pub text: Option<String>,

    /// Read the document from a file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Modality of the --input source
    #[arg(short, long, value_enum, requires = "input")]
    pub modality: Option<ModalityArg>,
}

/// Arguments for the decompose command.
#[derive(Debug, Parser)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Stop after claim extraction (no span restoration)
    #[arg(long)]
    pub claims_only: bool,

    /// Use a preset instead of the configured [decompose] section
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Override the model name
    #[arg(long)]
    pub model: Option<String>,

    /// Override the oracle endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the number of oracle round-trips per stage
    #[arg(long)]
    pub max_retries: Option<usize>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Modality argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModalityArg {
    /// UTF-8 text file
    Text,
    /// Image file
    Image,
    /// Video file
    Video,
}

/// Decomposition preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Balanced defaults
    Default,
    /// Fewer retries, shorter timeouts
    Aggressive,
    /// More retries, longer timeouts
    Lenient,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ModalityArg> for Modality {
    fn from(modality: ModalityArg) -> Self {
        match modality {
            ModalityArg::Text => Modality::Text,
            ModalityArg::Image => Modality::Image,
            ModalityArg::Video => Modality::Video,
        }
    }
}

impl From<PresetArg> for DecomposeConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => DecomposeConfig::default(),
            PresetArg::Aggressive => DecomposeConfig::aggressive(),
            PresetArg::Lenient => DecomposeConfig::lenient(),
        }
    }
}
