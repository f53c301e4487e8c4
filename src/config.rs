//! Configuration management for the samplesheet validator.
//!
//! Handles:
//! - Command-line argument parsing
//! - Rules file discovery
//! - Engine tuning (similarity cutoff)

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::validation::DEFAULT_CUTOFF;

/// Directory name used for workspace and user rule files
pub const APP_DIR: &str = "samplesheet-validator";

/// Rule file name looked up in each search directory
pub const RULES_FILE: &str = "rules.toml";

/// Output format for the validation report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command-line arguments for the samplesheet validator
#[derive(Debug, Parser)]
#[command(name = "samplesheet-validator")]
#[command(about = "Validate sequencing samplesheets before they reach the pipelines")]
#[command(version)]
pub struct Args {
    /// Samplesheet to validate
    pub manifest: PathBuf,

    /// Explicit rules file (TOML)
    #[arg(long, help = "Rules file to use instead of the discovered one")]
    pub rules: Option<PathBuf>,

    /// Minimum similarity for typo-tolerant pipeline matching
    #[arg(long, default_value_t = DEFAULT_CUTOFF, help = "Fuzzy keyword cutoff in [0, 1]")]
    pub cutoff: f64,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Name the file was uploaded under, when it differs from the path
    #[arg(long, help = "Filename checked by the filename rules")]
    pub filename: Option<String>,

    /// Skip the duplicate-sample lookup
    #[arg(long)]
    pub no_duplicate_check: bool,

    /// Log level for the validator
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Samplesheet path
    pub manifest: PathBuf,
    /// Filename fed to the filename rules
    pub filename: String,
    /// Rules file explicitly set via command line
    pub rules_path: Option<PathBuf>,
    /// Discovered rule file locations, highest priority first
    pub rules_search_paths: Vec<PathBuf>,
    pub cutoff: f64,
    pub format: OutputFormat,
    pub duplicate_check: bool,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        if !(0.0..=1.0).contains(&args.cutoff) {
            bail!("--cutoff must be between 0 and 1, got {}", args.cutoff);
        }

        let filename = match args.filename {
            Some(name) => name,
            None => file_name_of(&args.manifest),
        };

        Ok(Config {
            manifest: args.manifest,
            filename,
            rules_path: args.rules,
            rules_search_paths: default_rules_search_paths(),
            cutoff: args.cutoff,
            format: args.format,
            duplicate_check: !args.no_duplicate_check,
            log_level: args.log_level,
        })
    }
}

/// Workspace rules first, then the user config directory
pub fn default_rules_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(format!(".{}", APP_DIR)).join(RULES_FILE)];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_DIR).join(RULES_FILE));
    }

    paths
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
