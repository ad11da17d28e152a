//! # Notedex CLI (`notedex`)
//!
//! Generates an alphabetized HTML index from a CSV, TSV, TXT, XLSX or JSON
//! file of study notes.
//!
//! ## Usage
//!
//! ```bash
//! notedex <INPUT> [OUTPUT] [--config <PATH>] [--diagnostics human|json|off]
//! ```
//!
//! The HTML goes to `OUTPUT`, or to stdout when it is omitted. Warnings and
//! the final summary go to stderr.
//!
//! ## Examples
//!
//! ```bash
//! # Spreadsheet to file
//! notedex notes.xlsx index.html
//!
//! # Pipe the document somewhere else, keep diagnostics machine-readable
//! notedex notes.tsv --diagnostics json > index.html
//!
//! # Treat the same topic under different courses as distinct entries
//! notedex gse.csv index.html --config notedex.toml
//! ```

use clap::Parser;
use std::path::PathBuf;

use notedex::config::{self, Config};
use notedex::diagnostics::DiagnosticsMode;
use notedex::pipeline::generate_index;

/// Notedex: an alphabetized study index from a spreadsheet of notes.
#[derive(Parser)]
#[command(
    name = "notedex",
    about = "Generate an alphabetized HTML study index from CSV, TSV, TXT, XLSX or JSON notes",
    version,
    long_about = "Reads rows with Title, Description, Page and Book columns (plus an optional \
    Course column), reports duplicates and skipped rows, and renders the entries into letter \
    sections as HTML."
)]
struct Cli {
    /// Input file (.csv, .tsv, .txt, .xlsx, .xlsm or .json).
    input: PathBuf,

    /// Output HTML file. Defaults to stdout.
    output: Option<PathBuf>,

    /// Path to configuration file (TOML).
    ///
    /// Every setting has a default, so the file is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Diagnostics on stderr: human-readable lines, JSON lines, or nothing.
    #[arg(long, value_enum, default_value_t = DiagnosticsMode::Human)]
    diagnostics: DiagnosticsMode,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    let reporter = cli.diagnostics.reporter();
    generate_index(&cli.input, cli.output.as_deref(), &cfg, reporter.as_ref())?;
    Ok(())
}
