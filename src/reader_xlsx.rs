//! Spreadsheet (OOXML `.xlsx`) reader.
//!
//! Only the first sheet in workbook order is read; row 1 of that sheet is
//! the header. Formulas are never evaluated: the value cached in the file
//! is used as-is. A sheet row whose cells are all blank is handed on like
//! any other row, so it is counted with the empty titles just as a blank
//! CSV record is. Spreadsheet support sits behind the `xlsx` feature.

use std::path::Path;

use crate::config::Config;
use crate::error::IndexError;
use crate::models::RawDataset;

#[cfg(not(feature = "xlsx"))]
pub fn read_spreadsheet(_path: &Path, _config: &Config) -> Result<RawDataset, IndexError> {
    Err(IndexError::DependencyMissing {
        capability: "Spreadsheet (.xlsx) support",
        hint: "Rebuild with the `xlsx` feature (`cargo install notedex --features xlsx`) \
               or export the sheet as CSV.",
    })
}

#[cfg(feature = "xlsx")]
pub fn read_spreadsheet(path: &Path, config: &Config) -> Result<RawDataset, IndexError> {
    use crate::columns::{require_header_row, resolve_columns, Field};
    use crate::models::RawRow;
    use crate::reader::read_source;

    let bytes = read_source(path)?;
    let sheet = ooxml::first_sheet_rows(&bytes).map_err(|e| IndexError::parse(path, e))?;

    let mut sheet_rows = sheet.into_iter();
    let Some(header) = sheet_rows.next() else {
        return Err(IndexError::empty(path, "the first sheet is empty"));
    };
    let headers: Vec<String> = header.cells.iter().map(|c| c.trim().to_string()).collect();
    require_header_row(path, &headers)?;
    let mapping = resolve_columns(path, &headers, config.validation.suggestion_threshold)?;

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let get = |field: Field| -> String {
            mapping
                .get(field)
                .and_then(|c| sheet_row.cells.get(c.index))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        rows.push(RawRow {
            row: sheet_row.number,
            title: get(Field::Title),
            description: get(Field::Description),
            page: get(Field::Page),
            book: get(Field::Book),
            course: get(Field::Course),
        });
    }

    let mut dataset = RawDataset::new(rows, Vec::new());
    dataset.shadowed = mapping.shadowed().to_vec();
    Ok(dataset)
}

#[cfg(feature = "xlsx")]
mod ooxml {
    use std::io::Read;

    use quick_xml::events::{BytesStart, Event};
    use quick_xml::Reader;

    type Archive<'a> = zip::ZipArchive<std::io::Cursor<&'a [u8]>>;

    /// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
    const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

    const WORKBOOK: &str = "xl/workbook.xml";
    const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
    const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

    /// Columns in a worksheet, `A` through `XFD`.
    pub const MAX_COLUMNS: usize = 16_384;

    /// Upper bound on cells held for one sheet once rows are expanded.
    const MAX_CELLS_PER_SHEET: usize = 2_000_000;

    /// One sheet row, cells expanded so index == column position.
    #[derive(Debug)]
    pub struct SheetRow {
        pub number: usize,
        pub cells: Vec<String>,
    }

    pub fn first_sheet_rows(bytes: &[u8]) -> Result<Vec<SheetRow>, String> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
            .map_err(|e| format!("not a valid .xlsx workbook: {}", e))?;
        let sheet = first_sheet_path(&mut archive)?;
        let shared = match read_optional_entry(&mut archive, SHARED_STRINGS)? {
            Some(xml) => read_shared_strings(&xml)?,
            None => Vec::new(),
        };
        let xml = read_zip_entry_bounded(&mut archive, &sheet)?;
        parse_sheet(&xml, &shared)
    }

    fn has_entry(archive: &Archive<'_>, name: &str) -> bool {
        archive.file_names().any(|n| n == name)
    }

    fn read_zip_entry_bounded(archive: &mut Archive<'_>, name: &str) -> Result<Vec<u8>, String> {
        let entry = archive.by_name(name).map_err(|e| format!("{}: {}", name, e))?;
        let mut out = Vec::new();
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut out)
            .map_err(|e| format!("{}: {}", name, e))?;
        if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(format!(
                "ZIP entry {} exceeds size limit ({} bytes)",
                name, MAX_XML_ENTRY_BYTES
            ));
        }
        Ok(out)
    }

    fn read_optional_entry(archive: &mut Archive<'_>, name: &str) -> Result<Option<Vec<u8>>, String> {
        if !has_entry(archive, name) {
            return Ok(None);
        }
        read_zip_entry_bounded(archive, name).map(Some)
    }

    /// Resolve the first `<sheet>` of the workbook through its relationship
    /// target, falling back to the lowest-numbered worksheet part.
    fn first_sheet_path(archive: &mut Archive<'_>) -> Result<String, String> {
        if let (Some(workbook), Some(rels)) = (
            read_optional_entry(archive, WORKBOOK)?,
            read_optional_entry(archive, WORKBOOK_RELS)?,
        ) {
            if let Some(rel_id) = first_sheet_rel_id(&workbook)? {
                if let Some(target) = relationship_target(&rels, &rel_id)? {
                    let path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("xl/{}", target),
                    };
                    if has_entry(archive, &path) {
                        return Ok(path);
                    }
                }
            }
        }

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();
        names.sort_by_key(|name| {
            name.trim_start_matches("xl/worksheets/sheet")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(u32::MAX)
        });
        names
            .into_iter()
            .next()
            .ok_or_else(|| "workbook contains no worksheets".to_string())
    }

    fn first_sheet_rel_id(xml: &[u8]) -> Result<Option<String>, String> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| e.to_string())?;
                        if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                            let value = attr.unescape_value().map_err(|e| e.to_string())?;
                            return Ok(Some(value.into_owned()));
                        }
                    }
                    return Ok(None);
                }
                Ok(Event::Eof) => return Ok(None),
                Err(e) => return Err(format!("{}: {}", WORKBOOK, e)),
                _ => {}
            }
            buf.clear();
        }
    }

    fn relationship_target(xml: &[u8], rel_id: &str) -> Result<Option<String>, String> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    if attr(&e, b"Id")?.as_deref() == Some(rel_id) {
                        return attr(&e, b"Target");
                    }
                }
                Ok(Event::Eof) => return Ok(None),
                Err(e) => return Err(format!("{}: {}", WORKBOOK_RELS, e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Shared string table. Rich-text runs are concatenated; phonetic
    /// hints (`rPh`) are left out.
    fn read_shared_strings(xml: &[u8]) -> Result<Vec<String>, String> {
        let mut strings = Vec::new();
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut current: Option<String> = None;
        let mut in_t = false;
        let mut in_phonetic = false;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => current = Some(String::new()),
                    b"rPh" => in_phonetic = true,
                    b"t" => in_t = !in_phonetic,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::Text(te)) if in_t => {
                    if let Some(s) = current.as_mut() {
                        s.push_str(&te.unescape().map_err(|e| e.to_string())?);
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => strings.push(current.take().unwrap_or_default()),
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(format!("{}: {}", SHARED_STRINGS, e)),
                _ => {}
            }
            buf.clear();
        }
        Ok(strings)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum CellKind {
        Number,
        Shared,
        Bool,
        Inline,
        Text,
    }

    #[derive(Debug)]
    struct CellState {
        col: usize,
        kind: CellKind,
        value: String,
        inline: String,
    }

    impl CellState {
        fn resolve(self, shared: &[String]) -> Result<String, String> {
            match self.kind {
                CellKind::Shared if self.value.trim().is_empty() => Ok(String::new()),
                CellKind::Shared => {
                    let idx: usize = self
                        .value
                        .trim()
                        .parse()
                        .map_err(|_| format!("bad shared string index '{}'", self.value))?;
                    shared
                        .get(idx)
                        .cloned()
                        .ok_or_else(|| format!("shared string index {} out of range", idx))
                }
                CellKind::Bool => Ok(if self.value.trim() == "1" { "TRUE" } else { "FALSE" }.to_string()),
                CellKind::Inline if !self.inline.is_empty() => Ok(self.inline),
                CellKind::Inline | CellKind::Text => Ok(self.value),
                CellKind::Number => Ok(format_number(&self.value)),
            }
        }
    }

    fn parse_sheet(xml: &[u8], shared: &[String]) -> Result<Vec<SheetRow>, String> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut rows = Vec::new();
        let mut next_row = 1usize;
        let mut row: Option<SheetRow> = None;
        let mut cell: Option<CellState> = None;
        let mut in_v = false;
        let mut in_t = false;
        let mut held_cells = 0usize;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => row = Some(start_row(&e, &mut next_row)?),
                    b"c" => cell = Some(start_cell(&e, row.as_ref())?),
                    b"v" => in_v = cell.is_some(),
                    b"t" => in_t = cell.is_some(),
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"row" => {
                    rows.push(start_row(&e, &mut next_row)?);
                }
                Ok(Event::Text(te)) if in_v || in_t => {
                    if let Some(c) = cell.as_mut() {
                        let text = te.unescape().map_err(|e| e.to_string())?;
                        if in_v {
                            c.value.push_str(&text);
                        } else {
                            c.inline.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"v" => in_v = false,
                    b"t" => in_t = false,
                    b"c" => {
                        if let (Some(c), Some(r)) = (cell.take(), row.as_mut()) {
                            let col = c.col;
                            let text = c.resolve(shared)?;
                            if r.cells.len() <= col {
                                held_cells += col + 1 - r.cells.len();
                                if held_cells > MAX_CELLS_PER_SHEET {
                                    return Err(format!(
                                        "worksheet holds more than {} cells",
                                        MAX_CELLS_PER_SHEET
                                    ));
                                }
                                r.cells.resize(col + 1, String::new());
                            }
                            r.cells[col] = text;
                        }
                    }
                    b"row" => {
                        if let Some(r) = row.take() {
                            rows.push(r);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(format!("worksheet: {}", e)),
                _ => {}
            }
            buf.clear();
        }
        Ok(rows)
    }

    fn start_row(e: &BytesStart<'_>, next_row: &mut usize) -> Result<SheetRow, String> {
        let number = attr(e, b"r")?
            .and_then(|r| r.trim().parse::<usize>().ok())
            .unwrap_or(*next_row);
        *next_row = number + 1;
        Ok(SheetRow {
            number,
            cells: Vec::new(),
        })
    }

    fn start_cell(e: &BytesStart<'_>, row: Option<&SheetRow>) -> Result<CellState, String> {
        let reference = attr(e, b"r")?;
        let col = match reference.as_deref().map(column_index).transpose()?.flatten() {
            Some(col) => col,
            None => row.map(|r| r.cells.len()).unwrap_or(0),
        };
        if col >= MAX_COLUMNS {
            return Err(format!("row has more than {} columns", MAX_COLUMNS));
        }
        let kind = match attr(e, b"t")?.as_deref() {
            Some("s") => CellKind::Shared,
            Some("b") => CellKind::Bool,
            Some("inlineStr") => CellKind::Inline,
            Some("str") | Some("e") | Some("d") => CellKind::Text,
            _ => CellKind::Number,
        };
        Ok(CellState {
            col,
            kind,
            value: String::new(),
            inline: String::new(),
        })
    }

    fn attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, String> {
        for a in e.attributes() {
            let a = a.map_err(|e| e.to_string())?;
            if a.key.as_ref() == name {
                let value = a.unescape_value().map_err(|e| e.to_string())?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    /// Zero-based column of a cell reference such as `B7` or `AA12`.
    /// `Ok(None)` when the reference has no column letters.
    pub fn column_index(reference: &str) -> Result<Option<usize>, String> {
        let mut idx = 0usize;
        let mut seen = false;
        for c in reference.chars().take_while(|c| c.is_ascii_alphabetic()) {
            let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
            idx = idx
                .checked_mul(26)
                .and_then(|i| i.checked_add(digit))
                .filter(|i| *i <= MAX_COLUMNS)
                .ok_or_else(|| format!("cell reference '{}' is beyond column XFD", reference))?;
            seen = true;
        }
        Ok(seen.then(|| idx - 1))
    }

    /// Whole numbers lose their `.0`; anything else keeps the stored text.
    pub fn format_number(raw: &str) -> String {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
            _ => raw.to_string(),
        }
    }
}
