//! Samplesheet Validator
//!
//! Checks sequencing-run samplesheets against a configurable rule set before
//! they reach downstream pipelines, reporting every defect in one pass.
//!
//! This library provides:
//! - Strict samplesheet parsing
//! - Structural, character-set and pipeline-specific validation
//! - Typo-tolerant pipeline classification
//! - TOML rule configuration

pub mod config;
pub mod duplicates;
pub mod error;
pub mod parser;
pub mod rules;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use duplicates::{DuplicateCheck, SampleRegistry};
pub use error::{DuplicateCheckError, ParseError, RulesError};
pub use parser::{Document, parse};
pub use rules::{PipelineRule, RuleConfiguration};
pub use validation::{Finding, Report, Severity, ValidationEngine, validate_samplesheet};
