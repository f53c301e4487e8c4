//! Pipeline Classifier
//!
//! Assigns at most one pipeline to a sample from its free-text Description.
//! An exact (case-insensitive) keyword substring wins outright. Otherwise the
//! keyword with the best similarity to the whole description or one of its
//! tokens is taken, provided it reaches the cutoff; such a match carries a
//! suggested correction.

use crate::parser::Row;
use crate::rules::{PipelineKind, PipelineRule};
use crate::validation::report::{FindingKind, Findings, Location};
use crate::validation::similarity::{IndelRatio, Similarity};

/// Default minimum similarity for a typo-tolerant match
pub const DEFAULT_CUTOFF: f64 = 0.5;

/// Shorter tokens are not fuzzy candidates
const MIN_TOKEN_CHARS: usize = 3;

/// How a pipeline was assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// Keyword found verbatim in the description
    Exact,
    /// Keyword found by similarity at or above the cutoff
    Fuzzy,
    /// Sample_ID matched a regex pipeline; no keyword involved
    SampleId,
}

/// `typed` is what the user wrote, `suggested` the keyword it resembles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub typed: String,
    pub suggested: String,
}

/// Outcome of classifying one sample
#[derive(Debug, Clone, Default)]
pub struct ClassificationResult<'r> {
    pub pipeline: Option<&'r PipelineRule>,
    pub matched_keyword: Option<String>,
    pub suggested_correction: Option<Correction>,
    pub source: Option<MatchSource>,
    /// Further pipelines whose keywords also appear verbatim
    pub also_matched: Vec<&'r str>,
}

impl ClassificationResult<'_> {
    pub fn pipeline_name(&self) -> Option<&str> {
        self.pipeline.map(|p| p.name.as_str())
    }
}

/// Keyword classifier with a tunable cutoff and similarity measure
#[derive(Debug, Clone)]
pub struct PipelineClassifier<S = IndelRatio> {
    cutoff: f64,
    similarity: S,
}

impl PipelineClassifier<IndelRatio> {
    pub fn new(cutoff: f64) -> Self {
        Self::with_similarity(cutoff, IndelRatio)
    }
}

impl Default for PipelineClassifier<IndelRatio> {
    fn default() -> Self {
        Self::new(DEFAULT_CUTOFF)
    }
}

/// Best fuzzy candidate seen so far
struct BestMatch<'r> {
    score: f64,
    pipeline: &'r PipelineRule,
    keyword: &'r str,
    typed: String,
}

impl<S: Similarity> PipelineClassifier<S> {
    pub fn with_similarity(cutoff: f64, similarity: S) -> Self {
        Self { cutoff, similarity }
    }

    /// Classify a description against pipelines, in configuration order
    pub fn classify<'r>(
        &self,
        description: &str,
        pipelines: &'r [PipelineRule],
    ) -> ClassificationResult<'r> {
        let lowered = description.trim().to_lowercase();
        if lowered.is_empty() {
            return ClassificationResult::default();
        }

        let mut exact: Option<(&'r PipelineRule, &'r str)> = None;
        let mut also_matched = Vec::new();
        for pipeline in pipelines {
            let Some(keyword) = pipeline
                .keywords
                .iter()
                .find(|kw| lowered.contains(kw.as_str()))
            else {
                continue;
            };
            if exact.is_none() {
                exact = Some((pipeline, keyword.as_str()));
            } else {
                also_matched.push(pipeline.name.as_str());
            }
        }

        if let Some((pipeline, keyword)) = exact {
            return ClassificationResult {
                pipeline: Some(pipeline),
                matched_keyword: Some(keyword.to_string()),
                suggested_correction: None,
                source: Some(MatchSource::Exact),
                also_matched,
            };
        }

        let mut candidates = vec![lowered.as_str()];
        candidates.extend(tokens(&lowered));

        let mut best: Option<BestMatch<'r>> = None;
        for pipeline in pipelines {
            for keyword in &pipeline.keywords {
                for candidate in &candidates {
                    let score = self.similarity.score(candidate, keyword);
                    // Strictly greater: earlier pipelines win ties
                    if best.as_ref().is_none_or(|b| score > b.score) {
                        best = Some(BestMatch {
                            score,
                            pipeline,
                            keyword: keyword.as_str(),
                            typed: candidate.to_string(),
                        });
                    }
                }
            }
        }

        match best {
            Some(best) if best.score >= self.cutoff => {
                log::debug!(
                    "Fuzzy match '{}' -> '{}' ({:.3}) for pipeline {}",
                    best.typed,
                    best.keyword,
                    best.score,
                    best.pipeline.name
                );
                ClassificationResult {
                    pipeline: Some(best.pipeline),
                    matched_keyword: Some(best.keyword.to_string()),
                    suggested_correction: Some(Correction {
                        typed: best.typed,
                        suggested: best.keyword.to_string(),
                    }),
                    source: Some(MatchSource::Fuzzy),
                    also_matched: Vec::new(),
                }
            }
            _ => ClassificationResult::default(),
        }
    }

    /// Classify a Data row: description first, then regex pipelines by Sample_ID
    pub fn classify_row<'r>(
        &self,
        row: &Row,
        pipelines: &'r [PipelineRule],
    ) -> ClassificationResult<'r> {
        let result = self.classify(row.description(), pipelines);
        if result.pipeline.is_some() {
            return result;
        }

        let sample_id = row.sample_id().trim();
        if sample_id.is_empty() {
            return result;
        }

        pipelines
            .iter()
            .filter(|p| p.kind == PipelineKind::Regex)
            .find(|p| p.sample_id.as_ref().is_some_and(|ids| ids.is_match(sample_id)))
            .map(|pipeline| ClassificationResult {
                pipeline: Some(pipeline),
                source: Some(MatchSource::SampleId),
                ..ClassificationResult::default()
            })
            .unwrap_or(result)
    }
}

/// Classify with the default similarity measure
pub fn classify<'r>(
    description: &str,
    pipelines: &'r [PipelineRule],
    cutoff: f64,
) -> ClassificationResult<'r> {
    PipelineClassifier::new(cutoff).classify(description, pipelines)
}

/// Word-like tokens of a lower-cased description; hyphens and underscores stay inside tokens
fn tokens(description: &str) -> impl Iterator<Item = &str> {
    description
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
}

/// Typo warning for a row, if the classification suggested a correction
pub fn classification_findings(
    row_number: usize,
    row: &Row,
    result: &ClassificationResult<'_>,
) -> Findings {
    let mut findings = Findings::new();
    if let (Some(correction), Some(pipeline)) = (&result.suggested_correction, result.pipeline) {
        findings.add_warning(
            FindingKind::Classification,
            Location::section("Data")
                .with_row(row_number)
                .with_field("Description")
                .with_line(row.line),
            format!(
                "Possible typo in Description '{}'. Did you mean '{}' instead of '{}'? Sample assigned to pipeline '{}'.",
                row.description(),
                correction.suggested,
                correction.typed,
                pipeline.name
            ),
        );
    }
    findings
}
