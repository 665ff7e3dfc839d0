use super::types::{FileTypeFilter, FolderHandle, SourceFile};
use super::{FolderError, FolderStore};
use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

/// Source files keyed by identifier, in discovery order
pub type FileMap = IndexMap<String, SourceFile>;

/// Walk `root` and every folder below it, collecting files whose relative
/// path matches `pattern`.
///
/// A folder's files are visited before its subfolders. Identifiers are the
/// folder names below the root joined with '/', then the file name.
pub async fn enumerate_files(
    store: &dyn FolderStore,
    root: &FolderHandle,
    pattern: &Regex,
    filter: &FileTypeFilter,
) -> Result<FileMap, FolderError> {
    let mut files = FileMap::new();
    // (prefix, folder), popped from the back; children pushed in reverse
    let mut pending: Vec<(String, FolderHandle)> = vec![(String::new(), root.clone())];

    while let Some((prefix, folder)) = pending.pop() {
        for entry in store.list_files(&folder, filter).await? {
            let id = format!("{}{}", prefix, entry.name);
            if !pattern.is_match(&id) {
                debug!(file = %id, "Skipping file that does not match pattern");
                continue;
            }
            if files.contains_key(&id) {
                return Err(FolderError::DuplicateIdentifier(id));
            }
            files.insert(
                id.clone(),
                SourceFile {
                    id,
                    handle: entry.handle,
                },
            );
        }

        let subfolders = store.list_subfolders(&folder).await?;
        for (name, handle) in subfolders.into_iter().rev() {
            pending.push((format!("{}{}/", prefix, name), handle));
        }
    }

    Ok(files)
}
