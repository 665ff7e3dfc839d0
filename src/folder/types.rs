use std::path::{Path, PathBuf};

/// Store-specific location of a folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderHandle(pub PathBuf);

impl FolderHandle {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Store-specific location of a file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle(pub PathBuf);

impl FileHandle {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A file as listed by a folder store
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub handle: FileHandle,
}

/// A source file discovered during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the root, joined with '/'
    pub id: String,
    pub handle: FileHandle,
}

/// Narrows folder listings to the target format
#[derive(Debug, Clone)]
pub struct FileTypeFilter {
    extensions: Vec<String>,
}

impl FileTypeFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn csv() -> Self {
        Self::new(["csv"])
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }
}
