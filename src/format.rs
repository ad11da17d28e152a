//! Input format detection by file extension.

use std::path::Path;

use crate::error::IndexError;

/// Extensions accepted on the command line, in the order shown to users.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt", "xlsx", "xlsm", "json"];

/// The three source shapes the readers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma- or tab-separated text; the delimiter is sniffed from content.
    Delimited,
    /// OOXML workbook, first sheet only.
    Spreadsheet,
    /// JSON array of row objects, bare or wrapped.
    Structured,
}

/// Classify `path` by its extension (case-insensitive).
pub fn detect_format(path: &Path) -> Result<SourceFormat, IndexError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "tsv" | "txt" => Ok(SourceFormat::Delimited),
        "xlsx" | "xlsm" => Ok(SourceFormat::Spreadsheet),
        "json" => Ok(SourceFormat::Structured),
        _ => Err(IndexError::UnsupportedFormat { extension }),
    }
}
