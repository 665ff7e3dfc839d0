use super::types::{FileEntry, FileHandle, FileTypeFilter, FolderHandle};
use super::{FolderError, FolderStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Folder store backed by the local filesystem
#[derive(Debug, Clone, Default)]
pub struct LocalFolderStore;

impl LocalFolderStore {
    pub fn new() -> Self {
        Self
    }
}

/// Direct children of a folder, sorted by name
fn list_children(folder: &Path) -> Result<Vec<walkdir::DirEntry>, FolderError> {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FolderError::ListFailed(folder.display().to_string(), e.to_string()))
}

#[async_trait]
impl FolderStore for LocalFolderStore {
    async fn root(&self, location: &str) -> Result<FolderHandle, FolderError> {
        let path = PathBuf::from(location);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(FolderHandle(path)),
            _ => Err(FolderError::FolderNotFound(location.to_string())),
        }
    }

    async fn list_files(
        &self,
        folder: &FolderHandle,
        filter: &FileTypeFilter,
    ) -> Result<Vec<FileEntry>, FolderError> {
        let files = list_children(folder.path())?
            .into_iter()
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                filter.matches(&name).then(|| FileEntry {
                    name,
                    handle: FileHandle(entry.into_path()),
                })
            })
            .collect();
        Ok(files)
    }

    async fn list_subfolders(
        &self,
        folder: &FolderHandle,
    ) -> Result<Vec<(String, FolderHandle)>, FolderError> {
        let folders = list_children(folder.path())?
            .into_iter()
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                Some((name, FolderHandle(entry.into_path())))
            })
            .collect();
        Ok(folders)
    }

    async fn read_all(&self, file: &FileHandle) -> Result<Vec<u8>, FolderError> {
        Ok(fs::read(file.path()).await?)
    }
}
