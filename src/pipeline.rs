//! End-to-end index generation: read → process → section → render.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::columns::ShadowedHeader;
use crate::config::Config;
use crate::diagnostics::{DiagnosticEvent, DiagnosticsReporter};
use crate::error::IndexError;
use crate::models::DelimiterGuess;
use crate::process::{process_rows, ProcessReport};
use crate::reader::read_input;
use crate::render::{render_index, RenderOptions};
use crate::sections::{build_index, IndexDocument};

/// A built, not yet rendered, index plus what was noticed on the way.
#[derive(Debug, Clone)]
pub struct IndexBuild {
    pub document: IndexDocument,
    pub report: ProcessReport,
    pub delimiter: Option<DelimiterGuess>,
    pub shadowed: Vec<ShadowedHeader>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub entries: usize,
    pub sections: usize,
    pub has_course: bool,
}

pub fn build_index_from_file(path: &Path, config: &Config) -> Result<IndexBuild, IndexError> {
    let mut dataset = read_input(path, config)?;
    let delimiter = dataset.delimiter;
    let shadowed = std::mem::take(&mut dataset.shadowed);

    let processed = process_rows(path, dataset, &config.duplicates)?;
    let document = build_index(processed.entries, processed.has_course);

    Ok(IndexBuild {
        document,
        report: processed.report,
        delimiter,
        shadowed,
    })
}

/// Generate the index for `input`, writing HTML to `output` or stdout.
///
/// Nothing is written unless the whole input was read and processed.
pub fn generate_index(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    reporter: &dyn DiagnosticsReporter,
) -> Result<RunSummary, IndexError> {
    let build = build_index_from_file(input, config)?;
    report_build(&build, config, reporter);

    let options = RenderOptions {
        uppercase_titles: config.output.uppercase_titles,
    };
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| output_error(path, e))?;
            let mut writer = BufWriter::new(file);
            render_index(&build.document, &options, &mut writer)
                .map_err(|e| output_error(path, e))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            render_index(&build.document, &options, &mut lock)
                .and_then(|_| lock.flush())
                .map_err(|e| output_error(Path::new("<stdout>"), e))?;
        }
    }

    let summary = RunSummary {
        entries: build.document.entry_count(),
        sections: build.document.sections.len(),
        has_course: build.document.has_course,
    };
    reporter.report(DiagnosticEvent::Success {
        entries: summary.entries,
        sections: summary.sections,
        has_course: summary.has_course,
        output,
    });
    Ok(summary)
}

fn report_build(build: &IndexBuild, config: &Config, reporter: &dyn DiagnosticsReporter) {
    if let Some(guess) = build.delimiter {
        reporter.report(DiagnosticEvent::DelimiterDetected(guess));
    }
    for shadowed in &build.shadowed {
        reporter.report(DiagnosticEvent::ShadowedHeader(shadowed));
    }
    for malformed in &build.report.malformed {
        reporter.report(DiagnosticEvent::MalformedRow(malformed));
    }
    if build.document.has_course {
        reporter.report(DiagnosticEvent::CourseMode);
    }
    if build.report.empty_titles_skipped > 0 {
        reporter.report(DiagnosticEvent::EmptyTitlesSkipped {
            count: build.report.empty_titles_skipped,
        });
    }
    if !build.report.duplicates.is_empty() {
        reporter.report(DiagnosticEvent::Duplicates {
            groups: &build.report.duplicates,
            limit: config.duplicates.report_limit,
        });
    }
}

fn output_error(path: &Path, err: std::io::Error) -> IndexError {
    IndexError::Output {
        path: PathBuf::from(path),
        message: err.to_string(),
    }
}
