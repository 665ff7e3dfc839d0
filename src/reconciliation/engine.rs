use super::deadline::Deadline;
use super::error::{Phase, SyncError};
use super::plan::{files_to_import, partition_survivors};
use crate::config::{DecimalSeparators, SyncConfig};
use crate::folder::{FileMap, FolderStore, SourceFile};
use crate::locale::LocaleNormalizer;
use crate::parser::{parse_records, ParseOptions};
use crate::sheet::Row;
use crate::status::StatusSink;
use tracing::{debug, info};

/// The parts of [`SyncConfig`] that reconciliation depends on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcileOptions {
    pub parse: ParseOptions,
    pub sync_deletions: bool,
    pub decimal_separators: Option<DecimalSeparators>,
    /// Bounds each file read; a timeout names the file
    pub deadline: Option<Deadline>,
}

impl ReconcileOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            parse: ParseOptions::from_config(config),
            sync_deletions: config.sync_deletions,
            decimal_separators: config.decimal_separators,
            deadline: None,
        }
    }
}

/// Outcome of reconciling the sheet against the folder snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationResult {
    pub surviving_rows: Vec<Row>,
    pub new_rows: Vec<Row>,
    pub deleted_file_count: usize,
    pub deleted_row_count: usize,
    pub imported_file_count: usize,
    /// Data rows produced by new files (placeholder rows excluded)
    pub imported_row_count: usize,
}

impl ReconciliationResult {
    /// Whether the sheet needs to be rewritten at all
    pub fn has_changes(&self) -> bool {
        self.deleted_row_count > 0 || !self.new_rows.is_empty()
    }

    /// Survivors first, then new rows in file and record order
    pub fn merged_rows(&self) -> Vec<Row> {
        let mut rows = Vec::with_capacity(self.surviving_rows.len() + self.new_rows.len());
        rows.extend(self.surviving_rows.iter().cloned());
        rows.extend(self.new_rows.iter().cloned());
        rows
    }

    /// Human-readable tally, e.g.
    /// "Imported 1 file(s) [1 rows], removed 1 file(s) [2 rows]."
    pub fn summary(&self) -> String {
        let mut clauses = Vec::new();
        if self.imported_file_count > 0 {
            clauses.push(format!(
                "imported {} file(s) [{} rows]",
                self.imported_file_count, self.imported_row_count
            ));
        }
        if self.deleted_file_count > 0 {
            clauses.push(format!(
                "removed {} file(s) [{} rows]",
                self.deleted_file_count, self.deleted_row_count
            ));
        }

        if clauses.is_empty() {
            return "No changes.".to_string();
        }

        let joined = clauses.join(", ");
        let mut chars = joined.chars();
        match chars.next() {
            Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
            None => "No changes.".to_string(),
        }
    }
}

/// Reconcile the existing region rows with the current file snapshot.
///
/// Rows of files that are still present are carried forward untouched; files
/// not represented yet are read and parsed once. The first file that fails to
/// read or parse aborts the whole reconciliation.
pub async fn reconcile(
    existing_rows: Vec<Row>,
    current_files: &FileMap,
    options: &ReconcileOptions,
    folder: &dyn FolderStore,
    status: &dyn StatusSink,
) -> Result<ReconciliationResult, SyncError> {
    let partition = partition_survivors(existing_rows, current_files, options.sync_deletions);
    if partition.deleted_row_count > 0 {
        info!(
            files = partition.deleted_file_count,
            rows = partition.deleted_row_count,
            "Rows of removed files dropped"
        );
    }

    let normalizer = options
        .decimal_separators
        .and_then(|s| LocaleNormalizer::new(s.source, s.destination));

    let pending = files_to_import(current_files, &partition.imported);
    let total = pending.len();

    let mut result = ReconciliationResult {
        surviving_rows: partition.surviving_rows,
        deleted_file_count: partition.deleted_file_count,
        deleted_row_count: partition.deleted_row_count,
        ..Default::default()
    };

    for (index, file) in pending.into_iter().enumerate() {
        status
            .report(
                &format!("Reading file {}/{}: {}...", index + 1, total, file.id),
                false,
            )
            .await;

        let ingest = ingest_file(folder, file, options, normalizer.as_ref());
        let records = match options.deadline {
            Some(deadline) => deadline
                .run(Phase::ReadingNewFiles, ingest)
                .await
                .map_err(|e| e.with_file(&file.id))??,
            None => ingest.await?,
        };
        debug!(file = %file.id, records = records.len(), "File parsed");

        result.imported_file_count += 1;
        result.imported_row_count += records.len();

        if records.is_empty() {
            // Keeps the file visible to the next run's already-imported check
            result.new_rows.push(vec![file.id.clone()]);
            continue;
        }

        for record in records {
            let mut row = Vec::with_capacity(record.len() + 1);
            row.push(file.id.clone());
            row.extend(record);
            result.new_rows.push(row);
        }
    }

    Ok(result)
}

async fn ingest_file(
    folder: &dyn FolderStore,
    file: &SourceFile,
    options: &ReconcileOptions,
    normalizer: Option<&LocaleNormalizer>,
) -> Result<Vec<Vec<String>>, SyncError> {
    let bytes = folder
        .read_all(&file.handle)
        .await
        .map_err(|e| SyncError::new(Phase::ReadingNewFiles, e).with_file(&file.id))?;

    let records = parse_records(&bytes, &options.parse)
        .map_err(|e| SyncError::new(Phase::ReadingNewFiles, e).with_file(&file.id))?;

    Ok(match normalizer {
        Some(n) => records.into_iter().map(|r| n.normalize_row(r)).collect(),
        None => records,
    })
}
