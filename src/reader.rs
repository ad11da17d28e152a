//! Unified entry point for reading an input file.
//!
//! Detects the format once and dispatches to the matching reader. Reader
//! errors pass through untouched so their diagnostics survive.

use std::path::Path;

use crate::config::Config;
use crate::error::IndexError;
use crate::format::{detect_format, SourceFormat};
use crate::models::RawDataset;
use crate::reader_delimited::read_delimited;
use crate::reader_json::read_structured;
use crate::reader_xlsx::read_spreadsheet;

/// Read `path` into a uniform dataset, whatever its format.
pub fn read_input(path: &Path, config: &Config) -> Result<RawDataset, IndexError> {
    let format = detect_format(path)?;
    check_readable(path)?;

    let dataset = match format {
        SourceFormat::Delimited => read_delimited(path, config)?,
        SourceFormat::Spreadsheet => read_spreadsheet(path, config)?,
        SourceFormat::Structured => read_structured(path, config)?,
    };

    if dataset.rows.is_empty() {
        let detail = if dataset.malformed.is_empty() {
            "the file has a header but no data rows".to_string()
        } else {
            format!("all {} data rows were malformed", dataset.malformed.len())
        };
        return Err(IndexError::empty(path, detail));
    }

    Ok(dataset)
}

fn check_readable(path: &Path) -> Result<(), IndexError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(IndexError::FileNotFound {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        }),
        Err(e) => Err(IndexError::FileNotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Read the whole file. The handle is closed before this returns.
pub(crate) fn read_source(path: &Path) -> Result<Vec<u8>, IndexError> {
    std::fs::read(path).map_err(|e| IndexError::FileNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
