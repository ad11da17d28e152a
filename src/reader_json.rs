//! JSON reader.
//!
//! Accepts a bare array of row objects or an object wrapping that array.
//! The first object's keys stand in for a header row; every later row is
//! looked up by its own keys, so a missing key is just an empty value.

use std::path::Path;

use serde_json::{Map, Value};

use crate::columns::{resolve_columns, Field};
use crate::config::Config;
use crate::error::IndexError;
use crate::models::{MalformedRow, RawDataset, RawRow};
use crate::reader::read_source;

pub fn read_structured(path: &Path, config: &Config) -> Result<RawDataset, IndexError> {
    let bytes = read_source(path)?;
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    let root: Value = serde_json::from_slice(body)
        .map_err(|e| IndexError::parse(path, format!("Invalid JSON format: {}", e)))?;

    let items = locate_rows(path, &root, &config.input.entries_key)?;
    if items.is_empty() {
        return Err(IndexError::empty(path, "the entries list is empty"));
    }

    let first = items
        .iter()
        .find_map(Value::as_object)
        .ok_or_else(|| IndexError::parse(path, "no entry is a JSON object"))?;
    let headers: Vec<String> = first.keys().cloned().collect();
    let mapping = resolve_columns(path, &headers, config.validation.suggestion_threshold)?;

    let mut rows = Vec::new();
    let mut malformed = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        // Numbered like a sheet whose row 1 is the header.
        let row = idx + 2;
        let result = match item.as_object() {
            Some(obj) => extract_row(obj, row),
            None => Err(format!("entry is a JSON {}, not an object", kind(item))),
        };
        match result {
            Ok(raw) => rows.push(raw),
            Err(reason) => malformed.push(MalformedRow { row, reason }),
        }
    }

    let mut dataset = RawDataset::new(rows, malformed);
    dataset.shadowed = mapping.shadowed().to_vec();
    Ok(dataset)
}

fn locate_rows<'a>(
    path: &Path,
    root: &'a Value,
    entries_key: &str,
) -> Result<&'a Vec<Value>, IndexError> {
    match root {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            if let Some((key, value)) = map
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(entries_key))
            {
                return value.as_array().ok_or_else(|| {
                    IndexError::parse(
                        path,
                        format!("\"{}\" must be an array of entries, found {}", key, kind(value)),
                    )
                });
            }
            let mut arrays = map.values().filter_map(Value::as_array);
            match (arrays.next(), arrays.next()) {
                (Some(items), None) => Ok(items),
                _ => Err(IndexError::parse(
                    path,
                    format!(
                        "expected an array of entries or an object with an \"{}\" array",
                        entries_key
                    ),
                )),
            }
        }
        other => Err(IndexError::parse(
            path,
            format!(
                "expected an array of entries or an object with an \"{}\" array, found {}",
                entries_key,
                kind(other)
            ),
        )),
    }
}

fn extract_row(obj: &Map<String, Value>, row: usize) -> Result<RawRow, String> {
    let mut raw = RawRow {
        row,
        ..RawRow::default()
    };
    for (key, value) in obj {
        let Some(field) = Field::from_header(key) else {
            continue;
        };
        let text = match value {
            Value::Null => String::new(),
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(format!("field \"{}\" holds a nested {}", key, kind(value)));
            }
        };
        match field {
            Field::Title => raw.title = text,
            Field::Description => raw.description = text,
            Field::Page => raw.page = text,
            Field::Book => raw.book = text,
            Field::Course => raw.course = text,
        }
    }
    Ok(raw)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
