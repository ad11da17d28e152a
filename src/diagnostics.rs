//! Run diagnostics.
//!
//! Advisory messages (detected delimiter, GSE mode, skipped rows,
//! duplicates) and the final summary. Everything goes to **stderr** so the
//! HTML on stdout stays clean when no output file is given.

use std::io::Write;
use std::path::Path;

use serde_json::{json, Value};

use crate::columns::ShadowedHeader;
use crate::models::{DelimiterGuess, MalformedRow};
use crate::process::DuplicateGroup;

/// A single diagnostic event.
#[derive(Clone, Debug)]
pub enum DiagnosticEvent<'a> {
    /// Delimited input: which separator was picked.
    DelimiterDetected(DelimiterGuess),
    /// Some row has a course, so references carry a course segment.
    CourseMode,
    /// A header lost to a later header mapping to the same field.
    ShadowedHeader(&'a ShadowedHeader),
    MalformedRow(&'a MalformedRow),
    EmptyTitlesSkipped { count: usize },
    /// Duplicate groups; only the first `limit` are listed.
    Duplicates {
        groups: &'a [DuplicateGroup],
        limit: usize,
    },
    Success {
        entries: usize,
        sections: usize,
        has_course: bool,
        /// `None` when the document went to stdout.
        output: Option<&'a Path>,
    },
}

/// Reports diagnostics. Implementations write to stderr (human or JSON).
pub trait DiagnosticsReporter {
    fn report(&self, event: DiagnosticEvent<'_>);
}

/// Human-readable lines: `Info:`, `Warning:` and `Success:` prefixes.
pub struct StderrDiagnostics;

impl DiagnosticsReporter for StderrDiagnostics {
    fn report(&self, event: DiagnosticEvent<'_>) {
        let mut err = std::io::stderr().lock();
        for line in human_lines(&event) {
            let _ = writeln!(err, "{}", line);
        }
        let _ = err.flush();
    }
}

/// Machine-readable diagnostics: one JSON object per line on stderr.
pub struct JsonDiagnostics;

impl DiagnosticsReporter for JsonDiagnostics {
    fn report(&self, event: DiagnosticEvent<'_>) {
        if let Ok(line) = serde_json::to_string(&json_event(&event)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when diagnostics are disabled.
pub struct NoDiagnostics;

impl DiagnosticsReporter for NoDiagnostics {
    fn report(&self, _event: DiagnosticEvent<'_>) {}
}

pub fn human_lines(event: &DiagnosticEvent<'_>) -> Vec<String> {
    match event {
        DiagnosticEvent::DelimiterDetected(guess) if guess.defaulted => vec![format!(
            "Warning: No tab or comma in the header line, assuming {}-delimited input",
            guess.delimiter.as_str()
        )],
        DiagnosticEvent::DelimiterDetected(guess) => vec![format!(
            "Info: Detected {}-delimited input",
            guess.delimiter.as_str()
        )],
        DiagnosticEvent::CourseMode => {
            vec!["Info: Course column detected, generating GSE index".to_string()]
        }
        DiagnosticEvent::ShadowedHeader(shadowed) => vec![format!(
            "Warning: Column '{}' (column {}) is ignored, a later column also maps to {}",
            shadowed.header,
            shadowed.index + 1,
            shadowed.field
        )],
        DiagnosticEvent::MalformedRow(malformed) => vec![format!(
            "Warning: Skipped malformed row {}: {}",
            malformed.row, malformed.reason
        )],
        DiagnosticEvent::EmptyTitlesSkipped { count } => vec![format!(
            "Warning: Skipped {} {} with empty titles",
            count,
            if *count == 1 { "row" } else { "rows" }
        )],
        DiagnosticEvent::Duplicates { groups, limit } => {
            let mut lines = vec![format!(
                "Warning: Found {} duplicate {}:",
                groups.len(),
                if groups.len() == 1 { "entry" } else { "entries" }
            )];
            for group in groups.iter().take(*limit) {
                lines.push(format!("  - {}", describe_group(group)));
            }
            if groups.len() > *limit {
                lines.push(format!("  ... and {} more duplicates", groups.len() - limit));
            }
            lines
        }
        DiagnosticEvent::Success {
            entries,
            has_course,
            output,
            ..
        } => {
            let mode = if *has_course { " (GSE mode)" } else { "" };
            let target = match output {
                Some(path) => path.display().to_string(),
                None => "stdout".to_string(),
            };
            vec![format!(
                "Success: Generated index with {} entries{} → {}",
                entries, mode, target
            )]
        }
    }
}

fn describe_group(group: &DuplicateGroup) -> String {
    let rows = group
        .rows
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match &group.course {
        Some(course) => format!(
            "'{}' (Course: {}, Book: {}, Page: {}) on rows: {}",
            group.title, course, group.book, group.page, rows
        ),
        None => format!(
            "'{}' (Book: {}, Page: {}) on rows: {}",
            group.title, group.book, group.page, rows
        ),
    }
}

pub fn json_event(event: &DiagnosticEvent<'_>) -> Value {
    match event {
        DiagnosticEvent::DelimiterDetected(guess) => json!({
            "event": "delimiter",
            "delimiter": guess.delimiter.as_str(),
            "defaulted": guess.defaulted
        }),
        DiagnosticEvent::CourseMode => json!({ "event": "course_mode" }),
        DiagnosticEvent::ShadowedHeader(shadowed) => json!({
            "event": "shadowed_header",
            "field": shadowed.field.name(),
            "header": shadowed.header,
            "column": shadowed.index + 1
        }),
        DiagnosticEvent::MalformedRow(malformed) => json!({
            "event": "malformed_row",
            "row": malformed.row,
            "reason": malformed.reason
        }),
        DiagnosticEvent::EmptyTitlesSkipped { count } => json!({
            "event": "empty_titles_skipped",
            "count": count
        }),
        DiagnosticEvent::Duplicates { groups, limit } => {
            let listed: Vec<Value> = groups
                .iter()
                .take(*limit)
                .map(|g| {
                    json!({
                        "title": g.title,
                        "book": g.book,
                        "page": g.page,
                        "course": g.course,
                        "rows": g.rows
                    })
                })
                .collect();
            json!({
                "event": "duplicates",
                "total": groups.len(),
                "groups": listed
            })
        }
        DiagnosticEvent::Success {
            entries,
            sections,
            has_course,
            output,
        } => json!({
            "event": "success",
            "entries": entries,
            "sections": sections,
            "gse": has_course,
            "output": output.map(|p| p.display().to_string())
        }),
    }
}

/// Diagnostics mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum DiagnosticsMode {
    Off,
    #[default]
    Human,
    Json,
}

impl DiagnosticsMode {
    pub fn reporter(&self) -> Box<dyn DiagnosticsReporter> {
        match self {
            DiagnosticsMode::Off => Box::new(NoDiagnostics),
            DiagnosticsMode::Human => Box::new(StderrDiagnostics),
            DiagnosticsMode::Json => Box::new(JsonDiagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Field;
    use crate::models::Delimiter;

    fn group(title: &str, rows: Vec<usize>) -> DuplicateGroup {
        DuplicateGroup {
            title: title.to_string(),
            book: "SEC401".to_string(),
            page: "142".to_string(),
            course: None,
            rows,
        }
    }

    #[test]
    fn duplicate_lines() {
        let groups = vec![group("AES", vec![2, 3])];
        let lines = human_lines(&DiagnosticEvent::Duplicates {
            groups: &groups,
            limit: 5,
        });
        assert_eq!(
            lines,
            vec![
                "Warning: Found 1 duplicate entry:",
                "  - 'AES' (Book: SEC401, Page: 142) on rows: 2, 3",
            ]
        );
    }

    #[test]
    fn duplicate_list_is_capped() {
        let groups: Vec<DuplicateGroup> = (0..7)
            .map(|i| group(&format!("T{}", i), vec![i + 2, i + 20]))
            .collect();
        let lines = human_lines(&DiagnosticEvent::Duplicates {
            groups: &groups,
            limit: 5,
        });
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Warning: Found 7 duplicate entries:");
        assert_eq!(lines[6], "  ... and 2 more duplicates");
    }

    #[test]
    fn duplicate_with_course() {
        let mut g = group("RSA", vec![4, 9]);
        g.course = Some("SEC575".to_string());
        assert_eq!(
            describe_group(&g),
            "'RSA' (Course: SEC575, Book: SEC401, Page: 142) on rows: 4, 9"
        );
    }

    #[test]
    fn success_line() {
        let lines = human_lines(&DiagnosticEvent::Success {
            entries: 12,
            sections: 3,
            has_course: true,
            output: Some(Path::new("index.html")),
        });
        assert_eq!(
            lines,
            vec!["Success: Generated index with 12 entries (GSE mode) → index.html"]
        );

        let lines = human_lines(&DiagnosticEvent::Success {
            entries: 1,
            sections: 1,
            has_course: false,
            output: None,
        });
        assert_eq!(lines, vec!["Success: Generated index with 1 entries → stdout"]);
    }

    #[test]
    fn delimiter_lines() {
        let detected = human_lines(&DiagnosticEvent::DelimiterDetected(DelimiterGuess {
            delimiter: Delimiter::Comma,
            defaulted: false,
        }));
        assert_eq!(detected, vec!["Info: Detected comma-delimited input"]);

        let defaulted = human_lines(&DiagnosticEvent::DelimiterDetected(DelimiterGuess {
            delimiter: Delimiter::Tab,
            defaulted: true,
        }));
        assert!(defaulted[0].starts_with("Warning:"));
        assert!(defaulted[0].contains("tab"));
    }

    #[test]
    fn shadowed_header_is_one_based() {
        let shadowed = ShadowedHeader {
            field: Field::Title,
            header: "title".to_string(),
            index: 0,
        };
        let lines = human_lines(&DiagnosticEvent::ShadowedHeader(&shadowed));
        assert!(lines[0].contains("'title' (column 1)"));
        assert_eq!(json_event(&DiagnosticEvent::ShadowedHeader(&shadowed))["column"], 1);
    }

    #[test]
    fn json_duplicates_report_total() {
        let groups: Vec<DuplicateGroup> = (0..3).map(|i| group("X", vec![i, i + 1])).collect();
        let value = json_event(&DiagnosticEvent::Duplicates {
            groups: &groups,
            limit: 2,
        });
        assert_eq!(value["event"], "duplicates");
        assert_eq!(value["total"], 3);
        assert_eq!(value["groups"].as_array().unwrap().len(), 2);
        assert_eq!(value["groups"][0]["course"], Value::Null);
    }

    #[test]
    fn json_success_to_stdout() {
        let value = json_event(&DiagnosticEvent::Success {
            entries: 2,
            sections: 1,
            has_course: false,
            output: None,
        });
        assert_eq!(value["event"], "success");
        assert_eq!(value["entries"], 2);
        assert_eq!(value["gse"], false);
        assert!(value["output"].is_null());
    }

    #[test]
    fn mode_builds_reporter() {
        // Off must accept any event silently.
        DiagnosticsMode::Off.reporter().report(DiagnosticEvent::CourseMode);
        assert_eq!(DiagnosticsMode::default(), DiagnosticsMode::Human);
    }
}
