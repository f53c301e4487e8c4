//! Samplesheet Parser
//!
//! Strict, fail-fast state machine over manifest lines. The first structural
//! violation aborts with a [`ParseError`]; no partial document is returned.

pub mod document;
pub mod lexer;

pub use document::{Document, DuplicateKey, Fields, Row, Section, SectionBody, SectionKind, Table};
pub use lexer::{LineKind, classify_line};

use crate::error::ParseError;

/// Cursor state between lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first section header
    Start,
    /// Reading records of the current section
    InSection,
    /// Blank lines seen since the last record
    AfterBlank { count: usize },
}

/// Parse a complete samplesheet
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut state = State::Start;
    let mut last_line = 0;

    // Spreadsheet exports may start with a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;

        match classify_line(line_no, raw)? {
            LineKind::Blank => {
                state = match state {
                    State::Start => State::Start,
                    State::InSection => State::AfterBlank { count: 1 },
                    State::AfterBlank { count } => State::AfterBlank { count: count + 1 },
                };
            }
            LineKind::SectionHeader(name) => {
                match state {
                    State::Start => {}
                    State::InSection => {
                        return Err(ParseError::new(
                            line_no,
                            "missing blank line between sections",
                        ));
                    }
                    State::AfterBlank { count: 1 } => {}
                    State::AfterBlank { count } => {
                        return Err(ParseError::new(
                            line_no,
                            format!(
                                "expected exactly one blank line between sections, found {}",
                                count
                            ),
                        ));
                    }
                }

                let kind = SectionKind::from_name(&name).ok_or_else(|| {
                    ParseError::new(line_no, format!("unknown section [{}]", name))
                })?;
                let expected = SectionKind::ORDER.get(sections.len()).copied();
                if expected != Some(kind) {
                    let cause = match expected {
                        Some(expected) => format!(
                            "section header [{}] out of order, expected [{}]",
                            kind.name(),
                            expected.name()
                        ),
                        None => format!("section header [{}] out of order", kind.name()),
                    };
                    return Err(ParseError::new(line_no, cause));
                }

                sections.push(Section {
                    kind,
                    line: line_no,
                    body: empty_body(kind),
                });
                state = State::InSection;
            }
            LineKind::Record(cells) => {
                match state {
                    State::Start => {
                        return Err(ParseError::new(
                            line_no,
                            "content before the first section header",
                        ));
                    }
                    State::AfterBlank { .. } => {
                        return Err(ParseError::new(
                            line_no,
                            "unexpected content after blank line, expected a section header",
                        ));
                    }
                    State::InSection => {}
                }

                let section = sections
                    .last_mut()
                    .ok_or_else(|| ParseError::new(line_no, "record outside of a section"))?;
                add_record(section, line_no, cells)?;
            }
        }
    }

    if let Some(missing) = SectionKind::ORDER.get(sections.len()) {
        return Err(ParseError::new(
            last_line.max(1),
            format!("missing [{}] section", missing.name()),
        ));
    }

    for section in &sections {
        if let SectionBody::Table(table) = &section.body {
            if table.columns.is_empty() {
                return Err(ParseError::new(
                    section.line,
                    format!("[{}] section has no column header line", section.name()),
                ));
            }
        }
    }

    log::debug!("Parsed samplesheet with {} sections", sections.len());
    Ok(Document { sections })
}

fn empty_body(kind: SectionKind) -> SectionBody {
    match kind {
        SectionKind::Header | SectionKind::Settings => SectionBody::Fields(Fields::default()),
        SectionKind::Reads => SectionBody::ReadLengths(Vec::new()),
        SectionKind::Data => SectionBody::Table(Table::default()),
    }
}

/// Drop trailing empty cells left by spreadsheet exports
fn without_padding(mut cells: Vec<String>) -> Vec<String> {
    while cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells
}

fn add_record(section: &mut Section, line_no: usize, cells: Vec<String>) -> Result<(), ParseError> {
    let name = section.name();
    match &mut section.body {
        SectionBody::Fields(fields) => {
            let cells = without_padding(cells);
            if cells.len() > 2 {
                return Err(ParseError::new(
                    line_no,
                    format!(
                        "[{}] record has {} fields, expected 'Key,Value'",
                        name,
                        cells.len()
                    ),
                ));
            }
            let mut cells = cells.into_iter();
            let key = cells.next().unwrap_or_default().trim().to_string();
            if key.is_empty() {
                return Err(ParseError::new(
                    line_no,
                    format!("[{}] record has an empty key", name),
                ));
            }
            let value = cells.next().unwrap_or_default();
            fields.insert(line_no, key, value);
        }
        SectionBody::ReadLengths(reads) => {
            let cells = without_padding(cells);
            let value = match cells.as_slice() {
                [single] => single.trim(),
                _ => {
                    return Err(ParseError::new(
                        line_no,
                        format!("[Reads] record has {} fields, expected 1", cells.len()),
                    ));
                }
            };
            match value.parse::<u32>() {
                Ok(length) if length > 0 => reads.push(length),
                _ => {
                    return Err(ParseError::new(
                        line_no,
                        format!("read length '{}' is not a positive integer", value),
                    ));
                }
            }
        }
        SectionBody::Table(table) => {
            if table.columns.is_empty() {
                let columns: Vec<String> = without_padding(cells)
                    .iter()
                    .map(|c| c.trim().to_string())
                    .collect();
                if let Some(pos) = columns.iter().position(String::is_empty) {
                    return Err(ParseError::new(
                        line_no,
                        format!("column {} of the [{}] header is empty", pos + 1, name),
                    ));
                }
                for (i, column) in columns.iter().enumerate() {
                    if columns[..i].contains(column) {
                        return Err(ParseError::new(
                            line_no,
                            format!("duplicate column '{}' in [{}] header", column, name),
                        ));
                    }
                }
                table.columns = columns;
            } else {
                let mut cells = cells;
                while cells.len() > table.columns.len()
                    && cells.last().is_some_and(|c| c.trim().is_empty())
                {
                    cells.pop();
                }
                if cells.len() != table.columns.len() {
                    return Err(ParseError::new(
                        line_no,
                        format!(
                            "row has {} fields, expected {}",
                            cells.len(),
                            table.columns.len()
                        ),
                    ));
                }
                table.rows.push(Row::new(line_no, &table.columns, cells));
            }
        }
    }
    Ok(())
}
