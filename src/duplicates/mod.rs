//! Duplicate-Sample Check
//!
//! The engine only needs to know whether a sample already has sequencing data
//! registered elsewhere. That question goes through [`SampleRegistry`], so
//! tests can plug in a stub and the HTTP client stays at the edge.

pub mod slims;

pub use slims::{SlimsCredentials, SlimsRegistry};

use crate::error::DuplicateCheckError;
use crate::parser::Row;
use crate::validation::report::{FindingKind, Findings, Location};

/// Lookup of already-registered samples
pub trait SampleRegistry {
    fn exists(&self, sample_id: &str) -> Result<bool, DuplicateCheckError>;
}

/// How the duplicate check runs for one validation
#[derive(Clone, Copy)]
pub enum DuplicateCheck<'a> {
    /// Not requested
    Skip,
    /// Requested but the collaborator could not be set up
    Unavailable(&'a str),
    Registry(&'a dyn SampleRegistry),
}

/// Per-row duplicate findings.
///
/// The first collaborator failure ends the check with a single warning.
pub fn check_duplicates(rows: &[Row], check: DuplicateCheck<'_>) -> Findings {
    let mut findings = Findings::new();

    let registry = match check {
        DuplicateCheck::Skip => return findings,
        DuplicateCheck::Unavailable(reason) => {
            log::warn!("Duplicate check unavailable: {}", reason);
            findings.add_warning(
                FindingKind::DuplicateCheck,
                Location::section("Data"),
                format!("Duplicate check unavailable: {}", reason),
            );
            return findings;
        }
        DuplicateCheck::Registry(registry) => registry,
    };

    for (idx, row) in rows.iter().enumerate() {
        let sample_id = row.sample_id().trim();
        if sample_id.is_empty() {
            continue;
        }

        match registry.exists(sample_id) {
            Ok(true) => findings.add_error(
                FindingKind::DuplicateCheck,
                Location::section("Data")
                    .with_row(idx + 1)
                    .with_field("Sample_ID")
                    .with_line(row.line),
                format!("Sample_ID '{}' already has a fastq object registered.", sample_id),
            ),
            Ok(false) => {}
            Err(err) => {
                log::warn!("Duplicate check failed at Sample_ID '{}': {}", sample_id, err);
                findings.add_warning(
                    FindingKind::DuplicateCheck,
                    Location::section("Data"),
                    format!("Duplicate check unavailable: {}", err),
                );
                break;
            }
        }
    }

    findings
}
