use crate::utils::DEFAULT_STATUS_KEY;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid path pattern '{0}': {1}")]
    InvalidPattern(String, String),

    #[error("Invalid start row {0}: rows are numbered from 1")]
    InvalidStartRow(usize),

    #[error("At least one file extension is required")]
    NoExtensions,

    #[error("Invalid timeout of {0}s: must be positive and fit a wall-clock deadline")]
    InvalidTimeout(u64),

    #[error("Invalid column selection '{0}': expected \"all\" or a list of positions")]
    InvalidColumns(String),
}

/// Field delimiter of the source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Delimiter {
    #[default]
    #[serde(rename = ",", alias = "comma")]
    Comma,
    #[serde(rename = ";", alias = "semicolon")]
    Semicolon,
    #[serde(rename = "\t", alias = "tab")]
    Tab,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Which fields of each record are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "RawColumnSelection", into = "RawColumnSelection")]
pub enum ColumnSelection {
    #[default]
    All,
    Positions(Vec<usize>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawColumnSelection {
    Keyword(String),
    Positions(Vec<usize>),
}

impl TryFrom<RawColumnSelection> for ColumnSelection {
    type Error = ConfigError;

    fn try_from(raw: RawColumnSelection) -> Result<Self, Self::Error> {
        match raw {
            RawColumnSelection::Keyword(k) if k.eq_ignore_ascii_case("all") => {
                Ok(ColumnSelection::All)
            }
            RawColumnSelection::Keyword(k) => Err(ConfigError::InvalidColumns(k)),
            RawColumnSelection::Positions(p) => Ok(ColumnSelection::Positions(p)),
        }
    }
}

impl From<ColumnSelection> for RawColumnSelection {
    fn from(selection: ColumnSelection) -> Self {
        match selection {
            ColumnSelection::All => RawColumnSelection::Keyword("all".to_string()),
            ColumnSelection::Positions(p) => RawColumnSelection::Positions(p),
        }
    }
}

/// Decimal separator conventions of the source files and of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalSeparators {
    pub source: char,
    pub destination: char,
}

fn default_path_pattern() -> String {
    ".*".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_skip_rows() -> usize {
    1
}

fn default_start_row() -> usize {
    2
}

fn default_sync_deletions() -> bool {
    true
}

fn default_status_key() -> String {
    DEFAULT_STATUS_KEY.to_string()
}

fn default_timeout_secs() -> u64 {
    360
}

/// Sync configuration, loaded once per run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Root of the source folder tree
    pub folder_root: PathBuf,
    /// Case-insensitive regex matched against each file's relative path
    #[serde(default = "default_path_pattern")]
    pub path_pattern: String,
    /// File extensions listed in each folder (without the dot)
    #[serde(default = "default_extensions")]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub delimiter: Delimiter,
    /// Leading records dropped from every file (usually the header)
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    #[serde(default)]
    pub columns: ColumnSelection,
    /// Target sheet
    pub sheet: PathBuf,
    /// First managed row (1-based). Rows above it are never touched.
    #[serde(default = "default_start_row")]
    pub start_row: usize,
    #[serde(default = "default_sync_deletions")]
    pub sync_deletions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_separators: Option<DecimalSeparators>,
    #[serde(default = "default_status_key")]
    pub status_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SyncConfig {
    /// Config with defaults for everything but the folder and the sheet
    pub fn new(folder_root: impl Into<PathBuf>, sheet: impl Into<PathBuf>) -> Self {
        Self {
            folder_root: folder_root.into(),
            path_pattern: default_path_pattern(),
            file_extensions: default_extensions(),
            delimiter: Delimiter::default(),
            skip_rows: default_skip_rows(),
            columns: ColumnSelection::default(),
            sheet: sheet.into(),
            start_row: default_start_row(),
            sync_deletions: default_sync_deletions(),
            decimal_separators: None,
            status_key: default_status_key(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Check the values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_row == 0 {
            return Err(ConfigError::InvalidStartRow(self.start_row));
        }
        if self.file_extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        if self.timeout_secs == 0 || Instant::now().checked_add(self.timeout()).is_none() {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }
        self.compiled_pattern()?;
        Ok(())
    }

    pub fn compiled_pattern(&self) -> Result<Regex, ConfigError> {
        RegexBuilder::new(&self.path_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern(self.path_pattern.clone(), e.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Read the configuration file
pub async fn read_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    let content = fs::read_to_string(path).await?;
    let config: SyncConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
