//! Validation Engine
//!
//! Runs the stages in order and assembles the report. Parsing is fail-fast;
//! every stage after it accumulates.

use crate::duplicates::{DuplicateCheck, check_duplicates};
use crate::error::{ParseError, RulesError};
use crate::parser::{Document, parse};
use crate::rules::RuleConfiguration;
use crate::validation::classifier::{DEFAULT_CUTOFF, PipelineClassifier, classification_findings};
use crate::validation::pipeline::PipelineRuleValidator;
use crate::validation::report::{Report, StageFindings, assemble};
use crate::validation::similarity::{IndelRatio, Similarity};
use crate::validation::structural;

/// Tunable engine parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Minimum similarity for a typo-tolerant pipeline match
    pub cutoff: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

/// Validation engine bound to one immutable rule configuration
#[derive(Debug, Clone)]
pub struct ValidationEngine<'a, S = IndelRatio> {
    rules: &'a RuleConfiguration,
    classifier: PipelineClassifier<S>,
}

impl<'a> ValidationEngine<'a, IndelRatio> {
    pub fn new(rules: &'a RuleConfiguration, options: EngineOptions) -> Result<Self, RulesError> {
        Self::with_similarity(rules, options, IndelRatio)
    }
}

impl<'a, S: Similarity> ValidationEngine<'a, S> {
    pub fn with_similarity(
        rules: &'a RuleConfiguration,
        options: EngineOptions,
        similarity: S,
    ) -> Result<Self, RulesError> {
        if !(0.0..=1.0).contains(&options.cutoff) {
            return Err(RulesError::Config(format!(
                "cutoff must be between 0 and 1, got {}",
                options.cutoff
            )));
        }

        Ok(Self {
            rules,
            classifier: PipelineClassifier::with_similarity(options.cutoff, similarity),
        })
    }

    /// Parse and validate manifest text
    pub fn validate(&self, text: &str, filename: &str, duplicates: DuplicateCheck<'_>) -> Report {
        match parse(text) {
            Ok(doc) => self.validate_document(&doc, filename, duplicates),
            Err(err) => self.parse_failure(&err),
        }
    }

    /// Validate an already parsed document
    pub fn validate_document(
        &self,
        doc: &Document,
        filename: &str,
        duplicates: DuplicateCheck<'_>,
    ) -> Report {
        let mut stages = StageFindings {
            filename: structural::validate_filename(filename, &self.rules.filename_rules),
            ..StageFindings::default()
        };

        let structural = structural::validate(doc, self.rules);
        stages.presence = structural.presence;
        stages.rows = structural.rows;

        let mut pipeline_validator = PipelineRuleValidator::new(doc.settings(), filename);
        for (idx, row) in doc.rows().iter().enumerate() {
            let row_number = idx + 1;
            let classification = self.classifier.classify_row(row, &self.rules.pipelines);
            stages
                .classification
                .extend(classification_findings(row_number, row, &classification));
            stages
                .pipeline
                .extend(pipeline_validator.validate_row(row_number, row, &classification));
        }

        stages.duplicates = check_duplicates(doc.rows(), duplicates);

        let report = assemble(stages);
        log::info!(
            "Validated {} sample(s): {} error(s), {} warning(s)",
            doc.rows().len(),
            report.errors().count(),
            report.warnings().count()
        );
        report
    }

    fn parse_failure(&self, err: &ParseError) -> Report {
        log::warn!("Samplesheet could not be parsed: {}", err);
        Report::from_parse_error(err)
    }
}

/// Validate with default options
pub fn validate_samplesheet(
    text: &str,
    filename: &str,
    rules: &RuleConfiguration,
    duplicates: DuplicateCheck<'_>,
) -> Report {
    let engine = ValidationEngine {
        rules,
        classifier: PipelineClassifier::default(),
    };
    engine.validate(text, filename, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin_rules;
    use crate::validation::report::FindingKind;

    const VALID: &str = "[Header]
IEMFileVersion,4
Experiment Name,Run42
Date,2024-05-01
Workflow,GenerateFASTQ
Chemistry,Amplicon

[Reads]
151
151

[Settings]
Adapter,CTGTCTCTTATACACATCT

[Data]
Sample_ID,Sample_Name,index,index2,Description
DA23123456,DA23123456,ACGTACGT,TTGGCCAA,covid19
";

    #[test]
    fn test_valid_manifest() {
        let rules = builtin_rules().unwrap();
        let report = validate_samplesheet(VALID, "SampleSheet.csv", &rules, DuplicateCheck::Skip);
        assert!(report.is_valid(), "{:?}", report.findings());
        assert!(report.findings().is_empty());
    }

    #[test]
    fn test_parse_failure_short_circuits() {
        let rules = builtin_rules().unwrap();
        let text = VALID.replace("151\n151\n\n", "151\n151\n");
        let report = validate_samplesheet(
            &text,
            "bad_original.txt",
            &rules,
            DuplicateCheck::Unavailable("x"),
        );
        assert_eq!(report.findings().len(), 1);
        assert_eq!(report.findings()[0].kind, FindingKind::Parse);
    }

    #[test]
    fn test_cutoff_range_is_checked() {
        let rules = builtin_rules().unwrap();
        assert!(ValidationEngine::new(&rules, EngineOptions { cutoff: -0.1 }).is_err());
        assert!(ValidationEngine::new(&rules, EngineOptions { cutoff: 1.0 }).is_ok());
    }
}
