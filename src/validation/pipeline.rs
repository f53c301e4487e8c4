//! Pipeline Rule Validator
//!
//! Generic checks driven by the assigned pipeline's rule record: keyword
//! presence, Sample_ID/Sample_Name shapes, and filename/Settings constraints.
//! Adding a pipeline means adding a rules entry, not code.

use std::collections::HashSet;
use std::path::Path;

use crate::parser::{Fields, Row};
use crate::validation::classifier::{ClassificationResult, MatchSource};
use crate::validation::report::{FindingKind, Findings, Location};

/// Row-by-row pipeline checks for one manifest.
///
/// Filename and Settings constraints concern the whole manifest, so each
/// constrained pipeline is checked once, on its first assigned row.
#[derive(Debug)]
pub struct PipelineRuleValidator<'a> {
    settings: Option<&'a Fields>,
    filename: &'a str,
    checked_constraints: HashSet<String>,
}

impl<'a> PipelineRuleValidator<'a> {
    pub fn new(settings: Option<&'a Fields>, filename: &'a str) -> Self {
        Self {
            settings,
            filename,
            checked_constraints: HashSet::new(),
        }
    }

    /// Validate one Data row against its classification
    pub fn validate_row(
        &mut self,
        row_number: usize,
        row: &Row,
        classification: &ClassificationResult<'_>,
    ) -> Findings {
        let mut findings = Findings::new();
        let Some(pipeline) = classification.pipeline else {
            return findings;
        };
        let location = || {
            Location::section("Data")
                .with_row(row_number)
                .with_line(row.line)
        };

        if !classification.also_matched.is_empty() {
            let mut names = vec![pipeline.name.as_str()];
            names.extend(classification.also_matched.iter().copied());
            findings.add_error(
                FindingKind::PipelineRule,
                location().with_field("Description"),
                format!(
                    "Sample_ID: {} - Assigned to multiple pipelines: {}. Please clarify the Description.",
                    row.sample_id(),
                    names.join(", ")
                ),
            );
        }

        if pipeline.description_check
            && classification.matched_keyword.is_none()
            && classification.source == Some(MatchSource::SampleId)
        {
            findings.add_error(
                FindingKind::PipelineRule,
                location().with_field("Description"),
                format!(
                    "Description '{}' does not contain a required keyword for pipeline '{}'. Expected one of: {}.",
                    row.description(),
                    pipeline.name,
                    pipeline.keywords.join(", ")
                ),
            );
        }

        if let Some(ids) = &pipeline.sample_id {
            let values = [
                ("Sample_ID", row.sample_id()),
                ("Sample_Name", row.sample_name()),
            ];
            for (field, value) in values {
                if !ids.is_match(value.trim()) {
                    findings.add_error(
                        FindingKind::PipelineRule,
                        location().with_field(field),
                        format!(
                            "{} '{}' does not match the required pattern for pipeline '{}'. Expected format: {}.",
                            field,
                            value,
                            pipeline.name,
                            ids.display().join(" or ")
                        ),
                    );
                }
            }
        }

        if let Some(constraint) = &pipeline.filename_constraint {
            if self.checked_constraints.insert(pipeline.name.clone()) {
                if let Some(required) = &constraint.required_filename {
                    let actual = base_name(self.filename);
                    if actual != *required {
                        findings.add_error(
                            FindingKind::PipelineRule,
                            Location::section("Filename"),
                            format!(
                                "For '{}' pipeline, the samplesheet must be named '{}', but got '{}'.",
                                pipeline.name, required, actual
                            ),
                        );
                    }
                }

                for field in &constraint.required_settings {
                    if !self.settings.is_some_and(|s| s.has_value(field)) {
                        findings.add_error(
                            FindingKind::PipelineRule,
                            Location::section("Settings").with_field(field.as_str()),
                            format!(
                                "'{}' is missing or empty; it is required for the '{}' pipeline.",
                                field, pipeline.name
                            ),
                        );
                    }
                }
            }
        }

        findings
    }
}

fn base_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}
