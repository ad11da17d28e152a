//! # Notedex
//!
//! Turns a spreadsheet of study notes into a printable, alphabetized index.
//!
//! Each row of the input names a topic (`Title`), a short `Description`, and
//! where it lives (`Book`, `Page`, and optionally `Course`). Notedex reads
//! the rows, checks the columns, reports duplicates, sorts everything into
//! letter sections and renders an HTML document ready to paste into a word
//! processor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌───────────┐   ┌──────────┐
//! │   Readers    │──▶│  Process  │──▶│ Sections  │──▶│  Render  │
//! │ CSV/XLSX/JSON│   │ dups,blank│   │ A..Z, #   │   │   HTML   │
//! └──────────────┘   └───────────┘   └───────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! notedex notes.xlsx index.html
//! notedex notes.tsv > index.html
//! notedex notes.json index.html --config notedex.toml --diagnostics json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`format`] | Extension-based format detection |
//! | [`columns`] | Header normalization, validation and suggestions |
//! | [`reader`] | Input dispatch |
//! | [`reader_delimited`] | CSV / TSV / TXT reader |
//! | [`reader_xlsx`] | XLSX reader |
//! | [`reader_json`] | JSON reader |
//! | [`process`] | Empty-title filtering and duplicate detection |
//! | [`sections`] | Ordering and section assignment |
//! | [`render`] | HTML output |
//! | [`diagnostics`] | Human and JSON diagnostics on stderr |
//! | [`pipeline`] | End-to-end generation |
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Pipeline errors |

pub mod columns;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod models;
pub mod pipeline;
pub mod process;
pub mod reader;
pub mod reader_delimited;
pub mod reader_json;
pub mod reader_xlsx;
pub mod render;
pub mod sections;
