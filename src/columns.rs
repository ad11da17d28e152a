//! Column normalization and validation shared by every reader.
//!
//! Headers are matched onto the canonical vocabulary case-insensitively and
//! in any order. Validation is the single gate all formats go through, so a
//! missing column produces the same message whether it came from a CSV
//! header row, a spreadsheet, or the keys of a JSON object.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::IndexError;

/// Default minimum Jaro-Winkler score for a "did you mean" suggestion.
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.8;

/// Canonical field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Description,
    Page,
    Book,
    Course,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Description,
        Field::Page,
        Field::Book,
        Field::Course,
    ];

    pub const REQUIRED: [Field; 4] = [Field::Title, Field::Description, Field::Page, Field::Book];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Page => "Page",
            Field::Book => "Book",
            Field::Course => "Course",
        }
    }

    fn meaning(&self) -> &'static str {
        match self {
            Field::Title => "The term or topic name",
            Field::Description => "Detailed explanation",
            Field::Page => "Page number reference",
            Field::Book => "Course/book identifier",
            Field::Course => "(Optional) For GSE multi-course indexes",
        }
    }

    /// Exact, case-insensitive match of a header onto a canonical name.
    pub fn from_header(header: &str) -> Option<Field> {
        let header = header.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(header))
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a canonical field lives in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Header as spelled in the file.
    pub header: String,
    /// Zero-based column position.
    pub index: usize,
}

/// A header that lost to a later header naming the same field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedHeader {
    pub field: Field,
    pub header: String,
    pub index: usize,
}

/// Canonical field → source column, built once per header list.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    columns: BTreeMap<Field, ColumnRef>,
    shadowed: Vec<ShadowedHeader>,
}

impl ColumnMapping {
    pub fn get(&self, field: Field) -> Option<&ColumnRef> {
        self.columns.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn shadowed(&self) -> &[ShadowedHeader] {
        &self.shadowed
    }
}

/// Map headers (in file order) onto canonical fields. Unknown headers are
/// ignored; when two headers name the same field the later one wins.
pub fn normalize_columns(headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for (index, header) in headers.iter().enumerate() {
        let Some(field) = Field::from_header(header) else {
            continue;
        };
        let column = ColumnRef {
            header: header.clone(),
            index,
        };
        if let Some(previous) = mapping.columns.insert(field, column) {
            mapping.shadowed.push(ShadowedHeader {
                field,
                header: previous.header,
                index: previous.index,
            });
        }
    }
    mapping
}

/// A "did you mean" hint for one missing field.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSuggestion {
    pub missing: Field,
    pub header: String,
    pub score: f64,
}

/// Required columns that could not be found.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingColumns {
    pub missing: Vec<Field>,
    /// Headers as found in the source, original spelling and order.
    pub found: Vec<String>,
    pub required: Vec<Field>,
    pub suggestions: Vec<ColumnSuggestion>,
}

impl std::fmt::Display for MissingColumns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let missing: Vec<&str> = self.missing.iter().map(|m| m.name()).collect();
        writeln!(f, "Missing required columns: {}", missing.join(", "))?;
        writeln!(f, "Found columns: {}", self.found.join(", "))?;
        writeln!(f)?;
        writeln!(f, "Required columns (case-insensitive):")?;
        for field in Field::ALL {
            writeln!(f, "  - {}: {}", field.name(), field.meaning())?;
        }
        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Suggestions:")?;
            for s in &self.suggestions {
                writeln!(f, "  '{}' → Did you mean '{}'?", s.header, s.missing)?;
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "Note: Column names are case-insensitive ('title' = 'Title' = 'TITLE')"
        )?;
        write!(f, "      Columns can be in any order")
    }
}

/// Check that every required field is mapped. On failure, each missing
/// field gets the most similar unmatched header as a suggestion when the
/// Jaro-Winkler score reaches `threshold`.
pub fn validate_columns(
    headers: &[String],
    mapping: &ColumnMapping,
    threshold: f64,
) -> Result<(), MissingColumns> {
    let missing: Vec<Field> = Field::REQUIRED
        .into_iter()
        .filter(|f| !mapping.contains(*f))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let unmatched: Vec<&String> = headers
        .iter()
        .filter(|h| !h.trim().is_empty() && Field::from_header(h).is_none())
        .collect();

    let suggestions = missing
        .iter()
        .filter_map(|field| suggest_header(*field, &unmatched, threshold))
        .collect();

    Err(MissingColumns {
        missing,
        found: headers.to_vec(),
        required: Field::REQUIRED.to_vec(),
        suggestions,
    })
}

fn suggest_header(field: Field, unmatched: &[&String], threshold: f64) -> Option<ColumnSuggestion> {
    let target = field.name().to_lowercase();
    let mut best: Option<ColumnSuggestion> = None;
    for header in unmatched {
        let score = strsim::jaro_winkler(&header.trim().to_lowercase(), &target);
        if score < threshold {
            continue;
        }
        if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
            best = Some(ColumnSuggestion {
                missing: field,
                header: (*header).clone(),
                score,
            });
        }
    }
    best
}

/// Reject a header line with nothing in it. Only sources with a literal
/// header row (delimited text, spreadsheets) call this; JSON keys go
/// straight to [`resolve_columns`].
pub fn require_header_row(path: &Path, headers: &[String]) -> Result<(), IndexError> {
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IndexError::empty(
            path,
            "no columns found in the header row. Is the file empty?",
        ));
    }
    Ok(())
}

/// Normalize and validate a header list in one step, as every reader does.
pub fn resolve_columns(
    path: &Path,
    headers: &[String],
    threshold: f64,
) -> Result<ColumnMapping, IndexError> {
    let mapping = normalize_columns(headers);
    validate_columns(headers, &mapping, threshold)?;
    Ok(mapping)
}
