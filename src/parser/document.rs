//! Samplesheet Document
//!
//! Plain data produced by the parser. No validation logic lives here.

use indexmap::IndexMap;

/// The four sections of a samplesheet, in their required order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionKind {
    Header,
    Reads,
    Settings,
    Data,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 4] = [
        SectionKind::Header,
        SectionKind::Reads,
        SectionKind::Settings,
        SectionKind::Data,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Header => "Header",
            SectionKind::Reads => "Reads",
            SectionKind::Settings => "Settings",
            SectionKind::Data => "Data",
        }
    }
}

/// Parsed samplesheet: sections in source order, names unique
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) sections: Vec<Section>,
}

/// A named block of the samplesheet
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// Line of the `[Name]` header
    pub line: usize,
    pub body: SectionBody,
}

/// Section contents
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// `Key,Value` records (Header, Settings)
    Fields(Fields),
    /// One read length per line (Reads)
    ReadLengths(Vec<u32>),
    /// Column header plus rows (Data)
    Table(Table),
}

/// Key/value records of a single logical section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    values: IndexMap<String, String>,
    /// Keys seen more than once; the last value is kept
    pub duplicates: Vec<DuplicateKey>,
}

/// A key repeated inside one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub key: String,
    pub line: usize,
}

/// Tabular section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// One sample record; every declared column is present, possibly empty
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Source line of the record
    pub line: usize,
    cells: IndexMap<String, String>,
}

impl Document {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind.name() == name)
    }

    pub fn fields(&self, kind: SectionKind) -> Option<&Fields> {
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| match &s.body {
                SectionBody::Fields(fields) => Some(fields),
                _ => None,
            })
    }

    pub fn header(&self) -> Option<&Fields> {
        self.fields(SectionKind::Header)
    }

    pub fn settings(&self) -> Option<&Fields> {
        self.fields(SectionKind::Settings)
    }

    pub fn data(&self) -> Option<&Table> {
        self.sections.iter().find_map(|s| match &s.body {
            SectionBody::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Data rows, empty when the document has no Data section
    pub fn rows(&self) -> &[Row] {
        self.data().map(|t| t.rows.as_slice()).unwrap_or_default()
    }
}

impl Section {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_empty(&self) -> bool {
        match &self.body {
            SectionBody::Fields(fields) => fields.is_empty(),
            SectionBody::ReadLengths(reads) => reads.is_empty(),
            SectionBody::Table(table) => table.rows.is_empty(),
        }
    }
}

impl Fields {
    /// Insert a record; a repeated key overwrites and is remembered
    pub fn insert(&mut self, line: usize, key: String, value: String) {
        if self.values.contains_key(&key) {
            self.duplicates.push(DuplicateKey {
                key: key.clone(),
                line,
            });
        }
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// True when the key exists with a non-blank value
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Table {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

impl Row {
    /// Build a row from declared columns and matching cells
    pub fn new(line: usize, columns: &[String], cells: Vec<String>) -> Self {
        let mut cells = cells.into_iter();
        let cells = columns
            .iter()
            .map(|column| (column.clone(), cells.next().unwrap_or_default()))
            .collect();
        Self { line, cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Cell value, empty when the column is not declared
    pub fn cell(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn sample_id(&self) -> &str {
        self.cell("Sample_ID")
    }

    pub fn sample_name(&self) -> &str {
        self.cell("Sample_Name")
    }

    pub fn description(&self) -> &str {
        self.cell("Description")
    }

    /// Cells in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
