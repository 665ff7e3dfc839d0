//! Source folder access and file enumeration.

mod enumerate;
mod local;
mod types;

pub use enumerate::{enumerate_files, FileMap};
pub use local::LocalFolderStore;
pub use types::{FileEntry, FileHandle, FileTypeFilter, FolderHandle, SourceFile};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Failed to list folder {0}: {1}")]
    ListFailed(String, String),

    #[error("Duplicate file identifier: {0}")]
    DuplicateIdentifier(String),
}

/// Read-only view of a hierarchical folder store.
///
/// Listings are narrowed by a [`FileTypeFilter`] at each folder level so the
/// store never hands back files the caller would discard anyway.
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Resolve the configured root location. A missing root is an error.
    async fn root(&self, location: &str) -> Result<FolderHandle, FolderError>;

    /// Files directly inside `folder` that pass `filter`.
    async fn list_files(
        &self,
        folder: &FolderHandle,
        filter: &FileTypeFilter,
    ) -> Result<Vec<FileEntry>, FolderError>;

    /// Direct subfolders of `folder`, paired with their names.
    async fn list_subfolders(
        &self,
        folder: &FolderHandle,
    ) -> Result<Vec<(String, FolderHandle)>, FolderError>;

    /// Full content of a file.
    async fn read_all(&self, file: &FileHandle) -> Result<Vec<u8>, FolderError>;
}
