use crate::folder::{FileMap, SourceFile};
use crate::sheet::Row;
use std::collections::HashSet;

/// Existing rows split into the ones that stay and the deletion tally
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurvivorPartition {
    /// Rows carried forward untouched, in their original order
    pub surviving_rows: Vec<Row>,
    /// Distinct identifiers whose rows were dropped
    pub deleted_file_count: usize,
    pub deleted_row_count: usize,
    /// Identifiers already represented among the survivors
    pub imported: HashSet<String>,
}

/// Split the existing region by whether each row's file is still present.
///
/// With `sync_deletions` off every row survives. Rows with an empty
/// identifier cell belong to no file and always survive.
pub fn partition_survivors(
    existing_rows: Vec<Row>,
    current_files: &FileMap,
    sync_deletions: bool,
) -> SurvivorPartition {
    let mut partition = SurvivorPartition::default();
    let mut deleted_ids: HashSet<String> = HashSet::new();

    for row in existing_rows {
        let id = row.first().map(String::as_str).unwrap_or("");

        if id.is_empty() {
            partition.surviving_rows.push(row);
            continue;
        }

        if sync_deletions && !current_files.contains_key(id) {
            deleted_ids.insert(id.to_string());
            partition.deleted_row_count += 1;
            continue;
        }

        partition.imported.insert(id.to_string());
        partition.surviving_rows.push(row);
    }

    partition.deleted_file_count = deleted_ids.len();
    partition
}

/// Files not yet represented in the sheet, in enumeration order
pub fn files_to_import<'a>(
    current_files: &'a FileMap,
    imported: &HashSet<String>,
) -> Vec<&'a SourceFile> {
    current_files
        .values()
        .filter(|file| !imported.contains(&file.id))
        .collect()
}
