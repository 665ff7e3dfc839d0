//! Destination sheet access.
//!
//! Rows are 1-based, matching what a spreadsheet user sees. A store only
//! exposes whole-row operations; the managed region is always "from a start
//! row to the last populated row".

mod file;
mod memory;

pub use file::CsvSheetStore;
pub use memory::MemorySheetStore;

use async_trait::async_trait;
use thiserror::Error;

/// One sheet row: field 0 is the owning file's identifier
pub type Row = Vec<String>;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Invalid start row {0}: rows are numbered from 1")]
    InvalidStartRow(usize),

    #[error("Sheet write failed: {0}")]
    WriteFailed(String),
}

#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Last row holding any non-empty cell (0 for an empty sheet).
    async fn last_row(&self) -> Result<usize, SheetError>;

    /// Last column holding any non-empty cell (0 for an empty sheet).
    async fn last_col(&self) -> Result<usize, SheetError>;

    /// Rows `start_row..=last_row`, each exactly `col_count` cells wide.
    async fn get_region(&self, start_row: usize, col_count: usize) -> Result<Vec<Row>, SheetError>;

    /// Remove every row from `start_row` down.
    async fn clear_region(&self, start_row: usize) -> Result<(), SheetError>;

    /// Write `rows` starting at `start_row`, overwriting cells in place.
    async fn write_region(&self, start_row: usize, rows: &[Row]) -> Result<(), SheetError>;
}

fn check_start_row(start_row: usize) -> Result<usize, SheetError> {
    if start_row == 0 {
        Err(SheetError::InvalidStartRow(start_row))
    } else {
        Ok(start_row - 1)
    }
}

pub(crate) fn last_row_of(rows: &[Row]) -> usize {
    rows.iter()
        .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
        .map_or(0, |i| i + 1)
}

pub(crate) fn last_col_of(rows: &[Row]) -> usize {
    rows.iter()
        .filter_map(|row| row.iter().rposition(|cell| !cell.is_empty()))
        .map(|i| i + 1)
        .max()
        .unwrap_or(0)
}

pub(crate) fn region_of(
    rows: &[Row],
    start_row: usize,
    col_count: usize,
) -> Result<Vec<Row>, SheetError> {
    let first = check_start_row(start_row)?;
    let last = last_row_of(rows);
    if first >= last {
        return Ok(Vec::new());
    }

    Ok(rows[first..last]
        .iter()
        .map(|row| {
            let mut cells: Row = row.iter().take(col_count).cloned().collect();
            cells.resize(col_count, String::new());
            cells
        })
        .collect())
}

pub(crate) fn clear_from(rows: &mut Vec<Row>, start_row: usize) -> Result<(), SheetError> {
    let first = check_start_row(start_row)?;
    rows.truncate(first);
    Ok(())
}

pub(crate) fn overwrite_from(
    rows: &mut Vec<Row>,
    start_row: usize,
    new_rows: &[Row],
) -> Result<(), SheetError> {
    let first = check_start_row(start_row)?;
    let needed = first + new_rows.len();
    if rows.len() < needed {
        rows.resize(needed, Row::new());
    }

    for (offset, new_row) in new_rows.iter().enumerate() {
        let target = &mut rows[first + offset];
        if target.len() < new_row.len() {
            target.resize(new_row.len(), String::new());
        }
        target[..new_row.len()].clone_from_slice(new_row);
    }
    Ok(())
}
