//! Samplesheet Lexer
//!
//! Classifies one manifest line at a time: blank, section header or CSV record.
//! Spreadsheet exports pad lines with trailing commas, so a line of only
//! commas is blank. Records keep every cell; trimming padding is up to the
//! section being filled.

use crate::error::ParseError;

/// Line types in a samplesheet
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Empty, whitespace-only or comma-only line
    Blank,
    /// `[Name]` line, carrying the name without brackets
    SectionHeader(String),
    /// Comma-separated cells
    Record(Vec<String>),
}

/// Classify a single line
pub fn classify_line(line_no: usize, line: &str) -> Result<LineKind, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let stripped = line.trim_end_matches(|c: char| c == ',' || c.is_whitespace());

    if stripped.trim().is_empty() {
        return Ok(LineKind::Blank);
    }

    let candidate = stripped.trim();
    if candidate.starts_with('[') {
        return match candidate.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(name) if !name.trim().is_empty() => {
                Ok(LineKind::SectionHeader(name.trim().to_string()))
            }
            _ => Err(ParseError::new(
                line_no,
                format!("malformed section header '{}'", candidate),
            )),
        };
    }

    Ok(LineKind::Record(split_cells(line_no, line)?))
}

/// Split one line into CSV cells, honouring quotes
fn split_cells(line_no: usize, line: &str) -> Result<Vec<String>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
        Some(Err(err)) => Err(ParseError::new(line_no, format!("unreadable record: {}", err))),
        None => Ok(Vec::new()),
    }
}
