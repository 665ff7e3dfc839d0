use crate::sheet::{Row, SheetError, SheetStore};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to clear region: {0}")]
    ClearFailed(SheetError),

    #[error("Failed to write {rows} rows ({source}); previous rows were restored")]
    WriteFailed { rows: usize, source: SheetError },

    #[error("Failed to write {rows} rows ({source}); restoring previous rows also failed: {restore}")]
    RestoreFailed {
        rows: usize,
        source: SheetError,
        restore: SheetError,
    },
}

/// What the batch write committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_written: usize,
    pub columns: usize,
}

/// Right-pad every row with empty cells to the widest row's width.
///
/// Returns that width. Rows are never truncated.
pub fn normalize_widths(rows: &mut [Row]) -> usize {
    let max_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in rows.iter_mut() {
        row.resize(max_cols, String::new());
    }
    max_cols
}

/// Replace the managed region with `rows` in one clear + write.
///
/// `previous` is the region as it was read at the start of the run. If the
/// write fails after the clear, it is written back before reporting the
/// failure.
pub async fn write_rows(
    sheet: &dyn SheetStore,
    start_row: usize,
    mut rows: Vec<Row>,
    previous: &[Row],
) -> Result<WriteOutcome, WriteError> {
    let columns = normalize_widths(&mut rows);

    sheet
        .clear_region(start_row)
        .await
        .map_err(WriteError::ClearFailed)?;

    if rows.is_empty() {
        info!(start_row, "Managed region cleared, no rows left to write");
        return Ok(WriteOutcome {
            rows_written: 0,
            columns: 0,
        });
    }

    if let Err(source) = sheet.write_region(start_row, &rows).await {
        warn!(error = %source, "Batch write failed, restoring previous region");
        return Err(match restore(sheet, start_row, previous).await {
            Ok(()) => WriteError::WriteFailed {
                rows: rows.len(),
                source,
            },
            Err(restore) => WriteError::RestoreFailed {
                rows: rows.len(),
                source,
                restore,
            },
        });
    }

    info!(rows = rows.len(), columns, start_row, "Managed region written");
    Ok(WriteOutcome {
        rows_written: rows.len(),
        columns,
    })
}

async fn restore(sheet: &dyn SheetStore, start_row: usize, previous: &[Row]) -> Result<(), SheetError> {
    sheet.clear_region(start_row).await?;
    if !previous.is_empty() {
        sheet.write_region(start_row, previous).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemorySheetStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_normalize_pads_without_truncating() {
        let mut rows = vec![row(&["a"]), row(&["b", "1", "2"]), row(&["c", "3"])];
        let width = normalize_widths(&mut rows);

        assert_eq!(width, 3);
        assert_eq!(
            rows,
            vec![row(&["a", "", ""]), row(&["b", "1", "2"]), row(&["c", "3", ""])]
        );
    }

    #[tokio::test]
    async fn test_write_replaces_region_only() {
        let sheet = MemorySheetStore::with_rows(vec![
            row(&["Header"]),
            row(&["old.csv", "1", "2", "3"]),
            row(&["old.csv", "4"]),
        ]);

        let outcome = write_rows(&sheet, 2, vec![row(&["a.csv", "x"]), row(&["b.csv"])], &[])
            .await
            .unwrap();

        assert_eq!(outcome.rows_written, 2);
        assert_eq!(outcome.columns, 2);
        assert_eq!(
            sheet.rows().await,
            vec![row(&["Header"]), row(&["a.csv", "x"]), row(&["b.csv", ""])]
        );
        assert_eq!(sheet.mutation_count().await, 2);
    }

    #[tokio::test]
    async fn test_empty_result_only_clears() {
        let sheet = MemorySheetStore::with_rows(vec![row(&["Header"]), row(&["gone.csv", "1"])]);

        let outcome = write_rows(&sheet, 2, Vec::new(), &[]).await.unwrap();

        assert_eq!(outcome.rows_written, 0);
        assert_eq!(sheet.rows().await, vec![row(&["Header"])]);
        assert_eq!(sheet.mutation_count().await, 1);
    }

    /// Sheet whose first `fail_writes` writes fail
    struct FlakySheet {
        inner: MemorySheetStore,
        fail_writes: AtomicUsize,
    }

    #[async_trait]
    impl SheetStore for FlakySheet {
        async fn last_row(&self) -> Result<usize, SheetError> {
            self.inner.last_row().await
        }
        async fn last_col(&self) -> Result<usize, SheetError> {
            self.inner.last_col().await
        }
        async fn get_region(&self, start_row: usize, col_count: usize) -> Result<Vec<Row>, SheetError> {
            self.inner.get_region(start_row, col_count).await
        }
        async fn clear_region(&self, start_row: usize) -> Result<(), SheetError> {
            self.inner.clear_region(start_row).await
        }
        async fn write_region(&self, start_row: usize, rows: &[Row]) -> Result<(), SheetError> {
            let remaining = self.fail_writes.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_writes.store(remaining - 1, Ordering::SeqCst);
                return Err(SheetError::WriteFailed("quota exceeded".to_string()));
            }
            self.inner.write_region(start_row, rows).await
        }
    }

    #[tokio::test]
    async fn test_failed_write_restores_previous_rows() {
        let original = vec![row(&["Header"]), row(&["a.csv", "1"])];
        let sheet = FlakySheet {
            inner: MemorySheetStore::with_rows(original.clone()),
            fail_writes: AtomicUsize::new(1),
        };
        let previous = sheet.get_region(2, 2).await.unwrap();

        let result = write_rows(&sheet, 2, vec![row(&["b.csv", "2"])], &previous).await;

        assert!(matches!(result, Err(WriteError::WriteFailed { rows: 1, .. })));
        assert_eq!(sheet.inner.rows().await, original);
    }

    #[tokio::test]
    async fn test_failed_restore_is_reported() {
        let sheet = FlakySheet {
            inner: MemorySheetStore::with_rows(vec![row(&["Header"]), row(&["a.csv", "1"])]),
            fail_writes: AtomicUsize::new(2),
        };
        let previous = sheet.get_region(2, 2).await.unwrap();

        let result = write_rows(&sheet, 2, vec![row(&["b.csv", "2"])], &previous).await;

        assert!(matches!(result, Err(WriteError::RestoreFailed { .. })));
    }
}
