use super::{clear_from, last_col_of, last_row_of, overwrite_from, region_of, Row, SheetError, SheetStore};
use crate::utils::write_atomic;
use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Sheet stored as a CSV file on disk.
///
/// Every mutation rewrites the whole file through a temp file + rename, so a
/// reader never sees a half-written sheet.
#[derive(Debug, Clone)]
pub struct CsvSheetStore {
    path: PathBuf,
}

impl CsvSheetStore {
    /// Open an existing sheet file. A missing file is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SheetError> {
        let path = path.into();
        if !fs::try_exists(&path).await? {
            return Err(SheetError::SheetNotFound(path.display().to_string()));
        }
        Ok(Self { path })
    }

    async fn load(&self) -> Result<Vec<Row>, SheetError> {
        let content = fs::read(&self.path).await?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_slice());

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    async fn store(&self, rows: &[Row]) -> Result<(), SheetError> {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        for row in rows {
            // An empty record would be written as a blank line, which readers skip
            if row.is_empty() {
                writer.write_record([""])?;
            } else {
                writer.write_record(row)?;
            }
        }
        let content = writer
            .into_inner()
            .map_err(|e| SheetError::WriteFailed(e.to_string()))?;

        write_atomic(&self.path, &content).await?;
        debug!(path = %self.path.display(), rows = rows.len(), "Sheet saved");
        Ok(())
    }
}

#[async_trait]
impl SheetStore for CsvSheetStore {
    async fn last_row(&self) -> Result<usize, SheetError> {
        Ok(last_row_of(&self.load().await?))
    }

    async fn last_col(&self) -> Result<usize, SheetError> {
        Ok(last_col_of(&self.load().await?))
    }

    async fn get_region(&self, start_row: usize, col_count: usize) -> Result<Vec<Row>, SheetError> {
        region_of(&self.load().await?, start_row, col_count)
    }

    async fn clear_region(&self, start_row: usize) -> Result<(), SheetError> {
        let mut rows = self.load().await?;
        clear_from(&mut rows, start_row)?;
        self.store(&rows).await
    }

    async fn write_region(&self, start_row: usize, rows: &[Row]) -> Result<(), SheetError> {
        let mut sheet = self.load().await?;
        overwrite_from(&mut sheet, start_row, rows)?;
        self.store(&sheet).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_missing_sheet() {
        let result = CsvSheetStore::open("/nonexistent/sheet.csv").await;
        assert!(matches!(result, Err(SheetError::SheetNotFound(_))));
    }

    #[tokio::test]
    async fn test_write_preserves_rows_above_region() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        std::fs::write(&path, "Title\n\"Source, file\",Value\nold.csv,1\n").unwrap();

        let store = CsvSheetStore::open(&path).await.unwrap();
        assert_eq!(store.last_row().await.unwrap(), 3);
        assert_eq!(store.last_col().await.unwrap(), 2);

        store.clear_region(3).await.unwrap();
        store
            .write_region(3, &[vec!["a.csv".to_string(), "x, y".to_string()]])
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Title\n\"Source, file\",Value\na.csv,\"x, y\"\n");
    }

    #[tokio::test]
    async fn test_blank_padding_rows_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        std::fs::write(&path, "").unwrap();

        let store = CsvSheetStore::open(&path).await.unwrap();
        store
            .write_region(3, &[vec!["a.csv".to_string()]])
            .await
            .unwrap();

        assert_eq!(store.last_row().await.unwrap(), 3);
        let region = store.get_region(3, 1).await.unwrap();
        assert_eq!(region, vec![vec!["a.csv".to_string()]]);
    }
}
