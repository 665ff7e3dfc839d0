#![allow(dead_code)]

use sheetsync::{Row, SyncConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write a source file, creating parent folders as needed
pub fn write_source(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create source folder");
    }
    fs::write(path, content).expect("Failed to write source file");
}

/// Config for a folder under `root`/source and a sheet at `root`/sheet.csv
pub fn test_config(root: &Path) -> SyncConfig {
    let source = root.join("source");
    fs::create_dir_all(&source).expect("Failed to create source root");
    SyncConfig::new(source, root.join("sheet.csv"))
}

pub fn row(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}
