use super::{clear_from, last_col_of, last_row_of, overwrite_from, region_of, Row, SheetError, SheetStore};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MemorySheet {
    rows: Vec<Row>,
    clears: usize,
    writes: usize,
}

/// In-process sheet that counts its mutations
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    inner: Mutex<MemorySheet>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            inner: Mutex::new(MemorySheet {
                rows,
                ..Default::default()
            }),
        }
    }

    /// Snapshot of every row, including the unmanaged ones
    pub async fn rows(&self) -> Vec<Row> {
        self.inner.lock().await.rows.clone()
    }

    /// Number of `clear_region` plus `write_region` calls so far
    pub async fn mutation_count(&self) -> usize {
        let sheet = self.inner.lock().await;
        sheet.clears + sheet.writes
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn last_row(&self) -> Result<usize, SheetError> {
        Ok(last_row_of(&self.inner.lock().await.rows))
    }

    async fn last_col(&self) -> Result<usize, SheetError> {
        Ok(last_col_of(&self.inner.lock().await.rows))
    }

    async fn get_region(&self, start_row: usize, col_count: usize) -> Result<Vec<Row>, SheetError> {
        region_of(&self.inner.lock().await.rows, start_row, col_count)
    }

    async fn clear_region(&self, start_row: usize) -> Result<(), SheetError> {
        let mut sheet = self.inner.lock().await;
        clear_from(&mut sheet.rows, start_row)?;
        sheet.clears += 1;
        Ok(())
    }

    async fn write_region(&self, start_row: usize, rows: &[Row]) -> Result<(), SheetError> {
        let mut sheet = self.inner.lock().await;
        overwrite_from(&mut sheet.rows, start_row, rows)?;
        sheet.writes += 1;
        Ok(())
    }
}
