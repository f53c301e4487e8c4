//! Error types for the samplesheet validator.

use std::path::PathBuf;
use thiserror::Error;

/// Structural failure while reading a manifest.
///
/// The parser stops at the first of these; nothing downstream runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {cause}")]
pub struct ParseError {
    /// 1-based line number of the offending line
    pub line: usize,
    pub cause: String,
}

impl ParseError {
    pub fn new(line: usize, cause: impl Into<String>) -> Self {
        Self {
            line,
            cause: cause.into(),
        }
    }
}

/// Failure to obtain a usable rule configuration.
#[derive(Debug, Error)]
pub enum RulesError {
    /// Rule file could not be read.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rule file is not valid TOML or does not match the schema.
    #[error("Invalid rules file {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// A configured pattern does not compile.
    #[error("Invalid pattern '{pattern}' for {owner}: {source}")]
    Pattern {
        owner: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Semantically inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of the duplicate-sample collaborator.
#[derive(Debug, Error)]
pub enum DuplicateCheckError {
    #[error("Missing duplicate-check credential: {0}")]
    MissingCredential(&'static str),

    #[error("Duplicate-check request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Duplicate-check service returned {status}: {body}")]
    Status { status: u16, body: String },
}
