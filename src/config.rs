use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::columns::DEFAULT_SUGGESTION_THRESHOLD;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub duplicates: DuplicatesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Key of the row array when a JSON file wraps it in an object.
    #[serde(default = "default_entries_key")]
    pub entries_key: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            entries_key: default_entries_key(),
        }
    }
}

fn default_entries_key() -> String {
    "entries".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValidationConfig {
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

fn default_suggestion_threshold() -> f64 {
    DEFAULT_SUGGESTION_THRESHOLD
}

#[derive(Debug, Deserialize, Clone)]
pub struct DuplicatesConfig {
    /// Treat the same title/book/page under different courses as distinct.
    #[serde(default)]
    pub include_course: bool,
    /// How many duplicate groups to list before summarizing the rest.
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,
}

impl Default for DuplicatesConfig {
    fn default() -> Self {
        Self {
            include_course: false,
            report_limit: default_report_limit(),
        }
    }
}

fn default_report_limit() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_uppercase_titles")]
    pub uppercase_titles: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            uppercase_titles: default_uppercase_titles(),
        }
    }
}

fn default_uppercase_titles() -> bool {
    true
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.input.entries_key.trim().is_empty() {
        anyhow::bail!("input.entries_key must not be empty");
    }

    if !(0.0..=1.0).contains(&config.validation.suggestion_threshold) {
        anyhow::bail!("validation.suggestion_threshold must be in [0.0, 1.0]");
    }

    if config.duplicates.report_limit < 1 {
        anyhow::bail!("duplicates.report_limit must be >= 1");
    }

    Ok(())
}
