//! End-to-end validation scenarios against the built-in rules
use std::cell::RefCell;

use samplesheet_validator::duplicates::{DuplicateCheck, SampleRegistry};
use samplesheet_validator::error::DuplicateCheckError;
use samplesheet_validator::parser::parse;
use samplesheet_validator::rules::{RuleConfiguration, builtin_rules, parse_rules};
use samplesheet_validator::validation::{
    EngineOptions, FindingKind, MatchSource, PipelineClassifier, Report, Severity, ValidationEngine,
    validate_samplesheet,
};

const SETTINGS_MYELOID: &str = "Adapter,CTGTCTCTTATACACATCT
AdapterRead2,CTGTCTCTTATACACATCT
Read1UMILength,0
Read2UMILength,0
Read1StartFromCycle,1
Read2StartFromCycle,1";

fn manifest(settings: &str, rows: &[&str]) -> String {
    let mut text = String::from(
        "[Header]
IEMFileVersion,4
Experiment Name,Run42
Date,2024-05-01
Workflow,GenerateFASTQ
Chemistry,Amplicon

[Reads]
151
151

[Settings]
",
    );
    text.push_str(settings);
    text.push_str("\n\n[Data]\nSample_ID,Sample_Name,index,index2,Description\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn rules() -> RuleConfiguration {
    builtin_rules().expect("built-in rules compile")
}

fn run(text: &str, filename: &str) -> Report {
    validate_samplesheet(text, filename, &rules(), DuplicateCheck::Skip)
}

fn kinds(report: &Report) -> Vec<FindingKind> {
    report.findings().iter().map(|f| f.kind).collect()
}

/// Registry stub that records every lookup
struct Registered {
    known: Vec<&'static str>,
    asked: RefCell<Vec<String>>,
}

impl SampleRegistry for Registered {
    fn exists(&self, sample_id: &str) -> Result<bool, DuplicateCheckError> {
        self.asked.borrow_mut().push(sample_id.to_string());
        Ok(self.known.contains(&sample_id))
    }
}

struct Unreachable;

impl SampleRegistry for Unreachable {
    fn exists(&self, _: &str) -> Result<bool, DuplicateCheckError> {
        Err(DuplicateCheckError::MissingCredential("SLIMS_URL"))
    }
}

#[test]
fn test_typo_in_description_is_classified_with_warning() {
    let text = manifest(
        "Adapter,ACGT",
        &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,run for nmp1 panel"],
    );
    let report = run(&text, "SampleSheet.csv");

    assert!(report.is_valid(), "{:#?}", report.findings());
    assert_eq!(report.findings().len(), 1);
    let warning = &report.findings()[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.kind, FindingKind::Classification);
    assert_eq!(
        warning.message,
        "Possible typo in Description 'run for nmp1 panel'. Did you mean 'npm1' instead of 'nmp1'? Sample assigned to pipeline 'NPM1'."
    );
}

#[test]
fn test_covid_sample_id_must_match_regex() {
    let text = manifest(
        "Adapter,ACGT",
        &["DA123456,DA123456,ACGTACGT,TTGGCCAA,covid19 screen"],
    );
    let report = run(&text, "SampleSheet.csv");

    assert!(!report.is_valid());
    let pipeline: Vec<_> = report
        .findings()
        .iter()
        .filter(|f| f.kind == FindingKind::PipelineRule)
        .collect();
    assert_eq!(pipeline.len(), 2);
    assert_eq!(pipeline[0].location.field.as_deref(), Some("Sample_ID"));
    assert_eq!(pipeline[1].location.field.as_deref(), Some("Sample_Name"));
    assert!(pipeline[0].message.contains("'COVID'"));
    assert!(pipeline[0].message.contains("D[A-Z]2[0-4]XXXXXX"));
}

#[test]
fn test_original_filename_fails_alone() {
    let text = manifest(
        "Adapter,ACGT",
        &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,npm1"],
    );
    let report = run(&text, "samplesheet_original.csv");

    assert!(!report.is_valid());
    assert_eq!(kinds(&report), vec![FindingKind::Filename]);
    assert!(report.findings()[0].message.contains("_original"));
}

#[test]
fn test_myeloid_filename_and_settings() {
    let text = manifest(
        "Adapter,ACGT",
        &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,gms-myeloid"],
    );
    let report = run(&text, "run42_SampleSheet.csv");

    let findings = report.findings();
    assert_eq!(findings.len(), 6, "{:#?}", findings);
    assert!(findings.iter().all(|f| f.kind == FindingKind::PipelineRule));
    assert_eq!(
        findings[0].message,
        "For 'GMS-Myeloid' pipeline, the samplesheet must be named 'SampleSheet.csv', but got 'run42_SampleSheet.csv'."
    );
    let missing: Vec<_> = findings[1..]
        .iter()
        .filter_map(|f| f.location.field.as_deref())
        .collect();
    assert_eq!(
        missing,
        vec![
            "AdapterRead2",
            "Read1UMILength",
            "Read2UMILength",
            "Read1StartFromCycle",
            "Read2StartFromCycle"
        ]
    );
}

#[test]
fn test_myeloid_constraint_reported_once_per_manifest() {
    let text = manifest(
        "Adapter,ACGT",
        &[
            "AB1234567,AB1234567,ACGTACGT,TTGGCCAA,gms-myeloid",
            "AB7654321,AB7654321,GGTTAACC,CCAATTGG,gms-myeloid",
        ],
    );
    let report = run(&text, "run42_SampleSheet.csv");
    assert_eq!(report.findings().len(), 6);
}

#[test]
fn test_complete_myeloid_manifest_is_valid() {
    let text = manifest(
        SETTINGS_MYELOID,
        &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,gms-myeloid"],
    );
    let report = run(&text, "SampleSheet.csv");
    assert!(report.is_valid());
    assert!(report.findings().is_empty(), "{:#?}", report.findings());
}

#[test]
fn test_missing_blank_line_is_only_finding() {
    let text = manifest("Adapter,ACGT", &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,npm1"]).replace(
        "Chemistry,Amplicon\n\n[Reads]\n151\n151\n\n[Settings]\nAdapter,ACGT\n\n",
        "Chemistry,Amplicon\n",
    );
    let report = run(&text, "samplesheet_original.txt");

    assert!(!report.is_valid());
    assert_eq!(report.findings().len(), 1);
    let finding = &report.findings()[0];
    assert_eq!(finding.kind, FindingKind::Parse);
    assert_eq!(finding.location.line, Some(7));
}

#[test]
fn test_each_missing_header_field_reported() {
    let text = manifest("Adapter,ACGT", &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,npm1"])
        .replace("Workflow,GenerateFASTQ\n", "Workflow,\n")
        .replace("Date,2024-05-01\n", "");
    let report = run(&text, "SampleSheet.csv");

    let fields: Vec<_> = report
        .findings()
        .iter()
        .filter_map(|f| f.location.field.as_deref())
        .collect();
    assert_eq!(fields, vec!["Date", "Workflow"]);
}

#[test]
fn test_sample_name_mismatch() {
    let mismatched = run(
        &manifest("Adapter,ACGT", &["AB1234567,AB1234568,ACGTACGT,TTGGCCAA,"]),
        "SampleSheet.csv",
    );
    assert_eq!(mismatched.errors().count(), 1);
    assert!(
        mismatched.findings()[0]
            .message
            .contains("Sample_ID: AB1234567, Sample_Name: AB1234568")
    );

    let matched = run(
        &manifest("Adapter,ACGT", &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,"]),
        "SampleSheet.csv",
    );
    assert!(matched.findings().is_empty());
}

#[test]
fn test_ambiguous_description_is_an_error() {
    let text = manifest(
        "Adapter,ACGT",
        &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,npm1 and flt3-itd"],
    );
    let report = run(&text, "SampleSheet.csv");
    assert!(!report.is_valid());
    assert!(
        report.findings()[0]
            .message
            .contains("Assigned to multiple pipelines: FLT3-ITD, NPM1")
    );
}

#[test]
fn test_report_follows_stage_order() {
    let text = manifest(
        "Adapter,ACGT",
        &[
            "AB1234567,AB1234567,ACGTACGT,TTGGCCAA,gms-myeloid",
            "AB7654321,AB7654321,ACGU,CCAATTGG,nmp1",
        ],
    )
    .replace("Chemistry,Amplicon\n", "Chemistry,\n");
    let registry = Registered {
        known: vec!["AB1234567"],
        asked: RefCell::new(Vec::new()),
    };
    let report = validate_samplesheet(
        &text,
        "run42_SampleSheet.txt",
        &rules(),
        DuplicateCheck::Registry(&registry),
    );

    let order = kinds(&report);
    let first = |kind: FindingKind| order.iter().position(|k| *k == kind).unwrap();
    let last = |kind: FindingKind| order.iter().rposition(|k| *k == kind).unwrap();

    assert!(last(FindingKind::Filename) < first(FindingKind::Structural));
    assert!(last(FindingKind::Structural) < first(FindingKind::Classification));
    assert!(last(FindingKind::Classification) < first(FindingKind::PipelineRule));
    assert!(last(FindingKind::PipelineRule) < first(FindingKind::DuplicateCheck));
    assert_eq!(registry.asked.borrow().as_slice(), ["AB1234567", "AB7654321"]);
}

#[test]
fn test_unreachable_registry_warns_once() {
    let text = manifest(
        "Adapter,ACGT",
        &[
            "AB1234567,AB1234567,ACGTACGT,TTGGCCAA,npm1",
            "AB7654321,AB7654321,GGTTAACC,CCAATTGG,npm1",
        ],
    );
    let report = validate_samplesheet(
        &text,
        "SampleSheet.csv",
        &rules(),
        DuplicateCheck::Registry(&Unreachable),
    );

    assert!(report.is_valid());
    assert_eq!(report.warnings().count(), 1);
    assert_eq!(report.findings()[0].kind, FindingKind::DuplicateCheck);
}

#[test]
fn test_strict_cutoff_leaves_typo_unassigned() {
    let rules = rules();
    let engine =
        ValidationEngine::new(&rules, EngineOptions { cutoff: 0.8 }).expect("valid cutoff");
    let text = manifest(
        "Adapter,ACGT",
        &["AB1234567,AB1234567,ACGTACGT,TTGGCCAA,run for nmp1 panel"],
    );
    let report = engine.validate(&text, "SampleSheet.csv", DuplicateCheck::Skip);
    assert!(report.findings().is_empty());
}

fn regex_pipeline_rules(description_check: bool) -> RuleConfiguration {
    let content = format!(
        r#"
[[pipelines]]
name = "COVID"
type = "regex"
keywords = ["covid"]
description_check = {}
sample_id_regex = '^D[A-Z]2[0-4]\d{{6}}$'
"#,
        description_check
    );
    parse_rules(&content, "inline").expect("inline rules compile")
}

#[test]
fn test_regex_pipeline_assigned_from_sample_id() {
    let text = manifest(
        "Adapter,ACGT",
        &["DA23123456,DA23123456,ACGTACGT,TTGGCCAA,screening"],
    );

    let strict = regex_pipeline_rules(true);
    let doc = parse(&text).expect("parse manifest");
    let classification =
        PipelineClassifier::default().classify_row(&doc.rows()[0], &strict.pipelines);
    assert_eq!(classification.pipeline_name(), Some("COVID"));
    assert_eq!(classification.source, Some(MatchSource::SampleId));
    assert!(classification.matched_keyword.is_none());

    let report = validate_samplesheet(&text, "SampleSheet.csv", &strict, DuplicateCheck::Skip);
    assert_eq!(kinds(&report), vec![FindingKind::PipelineRule]);
    let finding = &report.findings()[0];
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.location.field.as_deref(), Some("Description"));
    assert!(finding.message.contains("Expected one of: covid"));

    let lenient = regex_pipeline_rules(false);
    let report = validate_samplesheet(&text, "SampleSheet.csv", &lenient, DuplicateCheck::Skip);
    assert!(report.findings().is_empty(), "{:#?}", report.findings());
}
