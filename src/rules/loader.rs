//! Rules Loading
//!
//! Loading priority, highest first: explicit `--rules` path, workspace file,
//! user config file, built-in rules embedded in the binary.

use std::fmt;
use std::path::{Path, PathBuf};

use super::configuration::RuleConfiguration;
use super::schema::RulesFile;
use crate::config::Config;
use crate::error::RulesError;

/// Built-in rules shipped with the binary
pub const BUILTIN_RULES: &str = include_str!("../../resources/rules/default.rules.toml");

/// Where the active rule configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    BuiltIn,
    File(PathBuf),
}

impl fmt::Display for RulesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesSource::BuiltIn => write!(f, "built-in rules"),
            RulesSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Decode and compile rules from TOML text
pub fn parse_rules(content: &str, origin: &str) -> Result<RuleConfiguration, RulesError> {
    let file: RulesFile = toml::from_str(content).map_err(|source| RulesError::Decode {
        origin: origin.to_string(),
        source,
    })?;
    RuleConfiguration::try_from(file)
}

/// Load rules from a file on disk
pub fn load_rules(path: &Path) -> Result<RuleConfiguration, RulesError> {
    let content = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&content, &path.display().to_string())
}

/// The embedded default rules
pub fn builtin_rules() -> Result<RuleConfiguration, RulesError> {
    parse_rules(BUILTIN_RULES, "built-in rules")
}

/// Resolve the active rules for a run.
///
/// An explicit path must exist; discovered locations are skipped when absent.
pub fn resolve_rules(config: &Config) -> Result<(RuleConfiguration, RulesSource), RulesError> {
    if let Some(path) = &config.rules_path {
        log::debug!("Loading rules from explicit path {}", path.display());
        return Ok((load_rules(path)?, RulesSource::File(path.clone())));
    }

    for candidate in &config.rules_search_paths {
        if candidate.is_file() {
            log::debug!("Loading rules from {}", candidate.display());
            return Ok((load_rules(candidate)?, RulesSource::File(candidate.clone())));
        }
    }

    log::debug!("No rules file found, using built-in rules");
    Ok((builtin_rules()?, RulesSource::BuiltIn))
}
