//! Core data models shared by the readers, the processor and the renderer.

use crate::columns::ShadowedHeader;

/// One source row with the canonical fields pulled out, trimmed.
/// Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row number in the source, header counted as row 1.
    pub row: usize,
    pub title: String,
    pub description: String,
    pub page: String,
    pub book: String,
    pub course: String,
}

/// A row a reader could not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub row: usize,
    pub reason: String,
}

/// Field separator found by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Tab => "tab",
        }
    }
}

/// How the delimiter was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterGuess {
    pub delimiter: Delimiter,
    /// The header line held neither tabs nor commas.
    pub defaulted: bool,
}

/// Everything a reader hands to the processor.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub rows: Vec<RawRow>,
    /// Some row supplied a non-empty course (GSE mode).
    pub has_course: bool,
    pub malformed: Vec<MalformedRow>,
    pub delimiter: Option<DelimiterGuess>,
    pub shadowed: Vec<ShadowedHeader>,
}

impl RawDataset {
    /// Build a dataset, reducing the GSE flag over all rows.
    pub fn new(rows: Vec<RawRow>, malformed: Vec<MalformedRow>) -> Self {
        let has_course = rows.iter().any(|r| !r.course.is_empty());
        Self {
            rows,
            has_course,
            malformed,
            delimiter: None,
            shadowed: Vec::new(),
        }
    }
}

/// A retained, indexable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Title as written in the source, trimmed.
    pub title: String,
    /// Upper-cased title used for ordering and duplicate identity.
    pub sort_key: String,
    pub description: String,
    pub page: String,
    pub book: String,
    /// Empty when the row had no course.
    pub course: String,
    pub row: usize,
}
