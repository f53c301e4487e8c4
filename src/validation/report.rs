//! Findings and Report
//!
//! Findings are plain values; a [`Report`] is their ordered concatenation.

use std::fmt;

use serde::Serialize;

use crate::error::ParseError;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Which stage produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Parse,
    Filename,
    Structural,
    Classification,
    PipelineRule,
    DuplicateCheck,
}

/// Where a finding points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub section: String,
    /// 1-based Data row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Source line, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// One reported defect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub location: Location,
    pub message: String,
}

/// Accumulator for one validation stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    items: Vec<Finding>,
}

/// Findings of every stage, kept apart so [`assemble`] can fix their order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageFindings {
    pub filename: Findings,
    pub presence: Findings,
    pub rows: Findings,
    pub classification: Findings,
    pub pipeline: Findings,
    pub duplicates: Findings,
}

/// Final validation report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    is_valid: bool,
    findings: Vec<Finding>,
}

impl Location {
    pub fn section(name: impl Into<String>) -> Self {
        Self {
            section: name.into(),
            row: None,
            field: None,
            line: None,
        }
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.section)?;
        if let Some(row) = self.row {
            write!(f, " row {}", row)?;
        }
        if let Some(field) = &self.field {
            write!(f, " {}", field)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.location, self.message)
    }
}

impl Finding {
    pub fn error(kind: FindingKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            location,
            message: message.into(),
        }
    }

    pub fn warning(kind: FindingKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            location,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&ParseError> for Finding {
    fn from(err: &ParseError) -> Self {
        Finding::error(
            FindingKind::Parse,
            Location::section("Parsing").with_line(err.line),
            err.to_string(),
        )
    }
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, kind: FindingKind, location: Location, message: impl Into<String>) {
        self.items.push(Finding::error(kind, location, message));
    }

    pub fn add_warning(
        &mut self,
        kind: FindingKind,
        location: Location,
        message: impl Into<String>,
    ) {
        self.items.push(Finding::warning(kind, location, message));
    }

    pub fn extend(&mut self, other: Findings) {
        self.items.extend(other.items);
    }

    pub fn as_slice(&self) -> &[Finding] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.items.iter().any(Finding::is_error)
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.items
    }
}

impl IntoIterator for Findings {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Concatenate stage findings in report order: filename, presence, row
/// checks, classification warnings, pipeline rules, duplicate checks.
pub fn assemble(stages: StageFindings) -> Report {
    let StageFindings {
        filename,
        presence,
        rows,
        classification,
        pipeline,
        duplicates,
    } = stages;

    let findings: Vec<Finding> = [filename, presence, rows, classification, pipeline, duplicates]
        .into_iter()
        .flat_map(Findings::into_vec)
        .collect();

    Report::from_findings(findings)
}

impl Report {
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        Self {
            is_valid: !findings.iter().any(Finding::is_error),
            findings,
        }
    }

    /// A report holding only the parse failure
    pub fn from_parse_error(err: &ParseError) -> Self {
        Self::from_findings(vec![Finding::from(err)])
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }
}
