use super::writer::WriteError;
use crate::config::ConfigError;
use crate::folder::FolderError;
use crate::parser::ParseError;
use crate::sheet::SheetError;
use std::fmt;
use thiserror::Error;

/// States of one import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Scanning,
    DeletionCheck,
    ReadingNewFiles,
    Writing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "initialization",
            Phase::Scanning => "folder scan",
            Phase::DeletionCheck => "deletion check",
            Phase::ReadingNewFiles => "reading new files",
            Phase::Writing => "sheet write",
            Phase::Done => "completion",
        };
        f.write_str(name)
    }
}

/// Underlying cause of a failed run
#[derive(Error, Debug)]
pub enum SyncFailure {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Folder error: {0}")]
    Folder(#[from] FolderError),

    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Run exceeded its {0}s time budget")]
    TimedOut(u64),
}

/// A failed run: where it stopped and why
#[derive(Error, Debug)]
#[error("Import failed during {phase}{}: {failure}", file_context(.file))]
pub struct SyncError {
    pub phase: Phase,
    /// Identifier of the file being processed, if any
    pub file: Option<String>,
    #[source]
    pub failure: SyncFailure,
}

fn file_context(file: &Option<String>) -> String {
    match file {
        Some(id) => format!(" (file: {})", id),
        None => String::new(),
    }
}

impl SyncError {
    pub fn new(phase: Phase, failure: impl Into<SyncFailure>) -> Self {
        Self {
            phase,
            file: None,
            failure: failure.into(),
        }
    }

    pub fn with_file(mut self, id: impl Into<String>) -> Self {
        self.file = Some(id.into());
        self
    }
}
