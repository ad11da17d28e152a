//! Comma/tab separated text reader.
//!
//! The delimiter is sniffed from the header line, never from the extension.
//! Line endings from any platform (LF, CRLF, bare CR) are accepted, and
//! quoted fields may span lines.

use std::path::Path;

use crate::columns::{require_header_row, resolve_columns, ColumnMapping, Field};
use crate::config::Config;
use crate::error::IndexError;
use crate::models::{Delimiter, DelimiterGuess, MalformedRow, RawDataset, RawRow};
use crate::reader::read_source;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn read_delimited(path: &Path, config: &Config) -> Result<RawDataset, IndexError> {
    let bytes = read_source(path)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    let text = std::str::from_utf8(body).map_err(|e| {
        IndexError::parse(
            path,
            format!("file is not valid UTF-8 ({}); save it as UTF-8 and try again", e),
        )
    })?;

    let guess = sniff_delimiter(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(guess.delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IndexError::parse(path, e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    require_header_row(path, &headers)?;
    let mapping = resolve_columns(path, &headers, config.validation.suggestion_threshold)?;
    let required_width = required_width(&mapping);

    let mut rows = Vec::new();
    let mut malformed = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                malformed.push(MalformedRow {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        // A whitespace-only line trims down to a single empty field.
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }

        if record.len() < required_width {
            malformed.push(MalformedRow {
                row,
                reason: format!(
                    "row has {} fields, expected at least {}",
                    record.len(),
                    required_width
                ),
            });
            continue;
        }

        let get = |field: Field| -> String {
            mapping
                .get(field)
                .and_then(|c| record.get(c.index))
                .unwrap_or("")
                .to_string()
        };
        rows.push(RawRow {
            row,
            title: get(Field::Title),
            description: get(Field::Description),
            page: get(Field::Page),
            book: get(Field::Book),
            course: get(Field::Course),
        });
    }

    let mut dataset = RawDataset::new(rows, malformed);
    dataset.delimiter = Some(guess);
    dataset.shadowed = mapping.shadowed().to_vec();
    Ok(dataset)
}

/// Count tabs and commas on the first line. Tabs win ties; with neither
/// present we fall back to tab.
pub fn sniff_delimiter(text: &str) -> DelimiterGuess {
    let first_line = text.split(['\r', '\n']).next().unwrap_or("");
    let tabs = first_line.matches('\t').count();
    let commas = first_line.matches(',').count();

    if tabs > 0 && tabs >= commas {
        DelimiterGuess {
            delimiter: Delimiter::Tab,
            defaulted: false,
        }
    } else if commas > 0 {
        DelimiterGuess {
            delimiter: Delimiter::Comma,
            defaulted: false,
        }
    } else {
        DelimiterGuess {
            delimiter: Delimiter::Tab,
            defaulted: true,
        }
    }
}

/// Number of fields a row needs to hold every required column.
fn required_width(mapping: &ColumnMapping) -> usize {
    Field::REQUIRED
        .iter()
        .filter_map(|f| mapping.get(*f))
        .map(|c| c.index + 1)
        .max()
        .unwrap_or(0)
}
