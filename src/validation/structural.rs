//! Structural Validator
//!
//! Required sections and fields, Sample_ID/Sample_Name consistency, allowed
//! characters and filename rules. Every violation is recorded; nothing here
//! stops early.

use std::path::Path;

use crate::parser::{Document, Row, SectionBody};
use crate::rules::{FilenameRules, RuleConfiguration};
use crate::validation::report::{FindingKind, Findings, Location};

/// Columns checked against the allowed-character rules
pub const CHECKED_COLUMNS: [&str; 5] = [
    "Sample_ID",
    "Sample_Name",
    "index",
    "index2",
    "Description",
];

/// Output of [`validate`], split the way the report orders it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralFindings {
    /// Section and field presence
    pub presence: Findings,
    /// Per-row consistency and character checks
    pub rows: Findings,
}

/// Validate a parsed document against the rule configuration
pub fn validate(doc: &Document, cfg: &RuleConfiguration) -> StructuralFindings {
    let mut presence = Findings::new();
    validate_sections(doc, cfg, &mut presence);
    validate_required_fields(doc, cfg, &mut presence);
    validate_duplicate_keys(doc, &mut presence);

    let mut rows = Findings::new();
    for (idx, row) in doc.rows().iter().enumerate() {
        rows.extend(validate_row(idx + 1, row, cfg));
    }

    StructuralFindings { presence, rows }
}

/// Filename rules: required substrings, forbidden substrings, extension
pub fn validate_filename(filename: &str, rules: &FilenameRules) -> Findings {
    let mut findings = Findings::new();
    let lower = filename.to_lowercase();
    let location = || Location::section("Filename");

    for required in &rules.contains {
        if !lower.contains(required.as_str()) {
            findings.add_error(
                FindingKind::Filename,
                location(),
                format!("Filename '{}' must contain '{}'.", filename, required),
            );
        }
    }

    for forbidden in &rules.excludes {
        if lower.contains(forbidden.as_str()) {
            findings.add_error(
                FindingKind::Filename,
                location(),
                format!(
                    "Filename '{}' contains '{}', which is reserved for generated files.",
                    filename, forbidden
                ),
            );
        }
    }

    if !rules.extensions.is_empty() {
        let extension = Path::new(&lower)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !rules.extensions.contains(&extension) {
            findings.add_error(
                FindingKind::Filename,
                location(),
                format!(
                    "Filename '{}' has an unsupported extension. Allowed: {}.",
                    filename,
                    rules.extensions.join(", ")
                ),
            );
        }
    }

    findings
}

/// Sample_ID/Sample_Name equality and allowed characters for one Data row
pub fn validate_row(row_number: usize, row: &Row, cfg: &RuleConfiguration) -> Findings {
    let mut findings = Findings::new();

    if row.sample_id() != row.sample_name() {
        findings.add_error(
            FindingKind::Structural,
            Location::section("Data")
                .with_row(row_number)
                .with_field("Sample_Name")
                .with_line(row.line),
            format!(
                "Sample_ID does not match Sample_Name. Both should be identical (Sample_ID: {}, Sample_Name: {}).",
                row.sample_id(),
                row.sample_name()
            ),
        );
    }

    for (column, value) in row.iter() {
        if !CHECKED_COLUMNS.contains(&column) {
            continue;
        }
        let Some(rule) = cfg.allowed_characters.get(column) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let invalid = rule.invalid_characters(value);
        if !invalid.is_empty() {
            let listed = invalid
                .iter()
                .map(|ch| format!("'{}'", ch))
                .collect::<Vec<_>>()
                .join(", ");
            findings.add_error(
                FindingKind::Structural,
                Location::section("Data")
                    .with_row(row_number)
                    .with_field(column)
                    .with_line(row.line),
                format!(
                    "{} '{}' contains invalid characters: {}. Allowed characters: {}.",
                    column, value, listed, rule.description
                ),
            );
        }
    }

    findings
}

fn validate_sections(doc: &Document, cfg: &RuleConfiguration, findings: &mut Findings) {
    for name in &cfg.required_sections {
        match doc.section(name) {
            None => findings.add_error(
                FindingKind::Structural,
                Location::section(name.as_str()),
                format!("[{}] section is missing.", name),
            ),
            Some(section) if section.is_empty() => findings.add_error(
                FindingKind::Structural,
                Location::section(name.as_str()).with_line(section.line),
                format!("[{}] section is empty.", name),
            ),
            Some(_) => {}
        }
    }
}

fn validate_required_fields(doc: &Document, cfg: &RuleConfiguration, findings: &mut Findings) {
    for (section_name, fields) in &cfg.required_fields {
        let Some(section) = doc.section(section_name) else {
            // Reported by the section check when required
            continue;
        };

        match &section.body {
            SectionBody::Fields(values) => {
                for field in fields {
                    if !values.has_value(field) {
                        findings.add_error(
                            FindingKind::Structural,
                            Location::section(section_name.as_str()).with_field(field.as_str()),
                            format!("'{}' is missing or empty.", field),
                        );
                    }
                }
            }
            SectionBody::Table(table) => {
                for field in fields {
                    if !table.has_column(field) {
                        findings.add_error(
                            FindingKind::Structural,
                            Location::section(section_name.as_str()).with_field(field.as_str()),
                            format!("Required column '{}' is missing.", field),
                        );
                        continue;
                    }
                    for (idx, row) in table.rows.iter().enumerate() {
                        if row.cell(field).trim().is_empty() {
                            let sample = if row.sample_id().trim().is_empty() {
                                format!("Sample {}", idx + 1)
                            } else {
                                row.sample_id().to_string()
                            };
                            findings.add_error(
                                FindingKind::Structural,
                                Location::section(section_name.as_str())
                                    .with_row(idx + 1)
                                    .with_field(field.as_str())
                                    .with_line(row.line),
                                format!(
                                    "Missing or empty required field '{}' for {}.",
                                    field, sample
                                ),
                            );
                        }
                    }
                }
            }
            SectionBody::ReadLengths(_) => {
                log::debug!(
                    "Ignoring required fields for [{}]: section holds read lengths",
                    section_name
                );
            }
        }
    }
}

fn validate_duplicate_keys(doc: &Document, findings: &mut Findings) {
    for section in doc.sections() {
        if let SectionBody::Fields(fields) = &section.body {
            for dup in &fields.duplicates {
                findings.add_warning(
                    FindingKind::Structural,
                    Location::section(section.name())
                        .with_field(dup.key.as_str())
                        .with_line(dup.line),
                    format!(
                        "'{}' is defined more than once; the last value is used.",
                        dup.key
                    ),
                );
            }
        }
    }
}
