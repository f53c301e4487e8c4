//! Validation Engine
//!
//! Structural checks, pipeline classification, pipeline rules and report
//! assembly, kept separate from parsing.

pub mod classifier;
pub mod engine;
pub mod pipeline;
pub mod report;
pub mod similarity;
pub mod structural;

pub use classifier::{
    ClassificationResult, Correction, DEFAULT_CUTOFF, MatchSource, PipelineClassifier, classify,
};
pub use engine::{EngineOptions, ValidationEngine, validate_samplesheet};
pub use pipeline::PipelineRuleValidator;
pub use report::{
    Finding, FindingKind, Findings, Location, Report, Severity, StageFindings, assemble,
};
pub use similarity::{IndelRatio, Similarity};
