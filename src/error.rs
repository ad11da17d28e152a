//! Fatal pipeline errors.
//!
//! Every variant stems from a static property of the input file, so none of
//! them is retried: the run stops and the message is shown to the user.

use std::path::PathBuf;

use crate::columns::MissingColumns;

/// Error raised while turning an input file into an index.
#[derive(Debug)]
pub enum IndexError {
    /// The file extension is not one we can read.
    UnsupportedFormat { extension: String },
    /// The input path is missing or cannot be opened.
    FileNotFound { path: PathBuf, reason: String },
    /// Support for this format was compiled out.
    DependencyMissing {
        capability: &'static str,
        hint: &'static str,
    },
    /// The content does not follow the syntax of its format.
    ParseError { path: PathBuf, message: String },
    /// Required columns are absent after case-insensitive matching.
    MissingColumns(MissingColumns),
    /// The file parsed but holds nothing to index.
    EmptyDataset { path: PathBuf, detail: String },
    /// The generated document could not be written.
    Output { path: PathBuf, message: String },
}

impl IndexError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        IndexError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn empty(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        IndexError::EmptyDataset {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::UnsupportedFormat { extension } => {
                let shown = if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                };
                write!(
                    f,
                    "Unsupported file format: {}. Supported extensions: {}",
                    shown,
                    crate::format::SUPPORTED_EXTENSIONS
                        .iter()
                        .map(|e| format!(".{}", e))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            IndexError::FileNotFound { path, reason } => {
                write!(f, "File '{}' not found or unreadable: {}", path.display(), reason)
            }
            IndexError::DependencyMissing { capability, hint } => {
                write!(f, "{} is not available in this build. {}", capability, hint)
            }
            IndexError::ParseError { path, message } => {
                write!(f, "Failed to parse '{}': {}", path.display(), message)
            }
            IndexError::MissingColumns(missing) => write!(f, "{}", missing),
            IndexError::EmptyDataset { path, detail } => {
                write!(f, "No entries found in '{}': {}", path.display(), detail)
            }
            IndexError::Output { path, message } => {
                write!(f, "Failed to write '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for IndexError {}

impl From<MissingColumns> for IndexError {
    fn from(missing: MissingColumns) -> Self {
        IndexError::MissingColumns(missing)
    }
}
