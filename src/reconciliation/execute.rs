use super::deadline::Deadline;
use super::engine::{reconcile, ReconcileOptions, ReconciliationResult};
use super::error::{Phase, SyncError};
use super::writer::write_rows;
use crate::config::{ConfigError, SyncConfig};
use crate::folder::{enumerate_files, FileTypeFilter, FolderStore};
use crate::sheet::{SheetError, SheetStore};
use crate::status::{StatusReporter, StatusSink};
use tracing::{error, info, warn};

/// Run one import with a fresh status record.
///
/// Clears the previous status first, then behaves like [`execute_sync`].
pub async fn run_import(
    config: SyncConfig,
    folder: &dyn FolderStore,
    sheet: &dyn SheetStore,
    reporter: &StatusReporter,
) -> Result<ReconciliationResult, SyncError> {
    if let Err(e) = reporter.clear().await {
        warn!(error = %e, "Failed to clear previous import status");
    }
    execute_sync(config, folder, sheet, reporter).await
}

/// Bring the sheet's managed region in line with the source folder.
///
/// Every phase transition is reported to `status`. The run ends with exactly
/// one terminal report (`done = true`): the summary on success, the error
/// message on failure.
pub async fn execute_sync(
    config: SyncConfig,
    folder: &dyn FolderStore,
    sheet: &dyn SheetStore,
    status: &dyn StatusSink,
) -> Result<ReconciliationResult, SyncError> {
    match sync(config, folder, sheet, status).await {
        Ok(result) => {
            let summary = result.summary();
            info!(
                imported_files = result.imported_file_count,
                imported_rows = result.imported_row_count,
                removed_files = result.deleted_file_count,
                removed_rows = result.deleted_row_count,
                "Import finished"
            );
            status.report(&summary, true).await;
            Ok(result)
        }
        Err(e) => {
            error!(phase = %e.phase, file = ?e.file, "{}", e);
            status.report(&e.to_string(), true).await;
            Err(e)
        }
    }
}

async fn sync(
    config: SyncConfig,
    folder: &dyn FolderStore,
    sheet: &dyn SheetStore,
    status: &dyn StatusSink,
) -> Result<ReconciliationResult, SyncError> {
    status.report("Starting import...", false).await;
    config
        .validate()
        .map_err(|e| SyncError::new(Phase::Init, e))?;
    let deadline = Deadline::after(config.timeout_secs).ok_or_else(|| {
        SyncError::new(Phase::Init, ConfigError::InvalidTimeout(config.timeout_secs))
    })?;
    let pattern = config
        .compiled_pattern()
        .map_err(|e| SyncError::new(Phase::Init, e))?;
    let filter = FileTypeFilter::new(&config.file_extensions);
    let options = ReconcileOptions {
        deadline: Some(deadline),
        ..ReconcileOptions::from_config(&config)
    };

    status.report("Scanning folder...", false).await;
    let location = config.folder_root.to_string_lossy();
    let root = deadline
        .run(Phase::Scanning, folder.root(&location))
        .await?
        .map_err(|e| SyncError::new(Phase::Scanning, e))?;
    let files = deadline
        .run(
            Phase::Scanning,
            enumerate_files(folder, &root, &pattern, &filter),
        )
        .await?
    .map_err(|e| SyncError::new(Phase::Scanning, e))?;
    info!(files = files.len(), root = %location, "Folder scanned");

    status.report("Checking for deleted files...", false).await;
    let existing = deadline
        .run(Phase::DeletionCheck, async {
            let col_count = sheet.last_col().await?;
            let rows = sheet.get_region(config.start_row, col_count).await?;
            Ok::<_, SheetError>(rows)
        })
        .await?
    .map_err(|e| SyncError::new(Phase::DeletionCheck, e))?;
    info!(rows = existing.len(), start_row = config.start_row, "Managed region read");

    let result = deadline
        .run(
            Phase::ReadingNewFiles,
            reconcile(existing.clone(), &files, &options, folder, status),
        )
        .await??;

    if !result.has_changes() {
        info!("Sheet already up to date, skipping write");
        return Ok(result);
    }

    // The write is never interrupted once started
    if deadline.has_passed() {
        return Err(deadline.exceeded(Phase::Writing));
    }

    let rows = result.merged_rows();
    status
        .report(&format!("Writing {} rows...", rows.len()), false)
        .await;
    write_rows(sheet, config.start_row, rows, &existing)
        .await
        .map_err(|e| SyncError::new(Phase::Writing, e))?;

    Ok(result)
}
