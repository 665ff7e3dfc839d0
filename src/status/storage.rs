use super::{StatusError, StatusStore};
use crate::utils::write_atomic;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::fs;
use tokio::sync::Mutex;

/// Global mutex for status file access
static STATUS_FILE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_lock() -> &'static Mutex<()> {
    STATUS_FILE_LOCK.get_or_init(|| Mutex::new(()))
}

/// Status store persisted as a JSON object file
#[derive(Debug, Clone)]
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>, StatusError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), StatusError> {
        let content = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.path, content.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl StatusStore for FileStatusStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StatusError> {
        let _guard = get_lock().lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StatusError> {
        let _guard = get_lock().lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<(), StatusError> {
        let _guard = get_lock().lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

/// In-process status store
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StatusError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StatusError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StatusError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStatusStore::new(dir.path().join("status.json"));

        assert!(store.get("importStatus").await.unwrap().is_none());

        store.set("other", "kept").await.unwrap();
        store.set("importStatus", "{\"done\":false}").await.unwrap();
        store.set("importStatus", "{\"done\":true}").await.unwrap();
        assert_eq!(
            store.get("importStatus").await.unwrap().as_deref(),
            Some("{\"done\":true}")
        );

        store.delete("importStatus").await.unwrap();
        assert!(store.get("importStatus").await.unwrap().is_none());
        assert_eq!(store.get("other").await.unwrap().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let store = FileStatusStore::new(&path);
        store.delete("importStatus").await.unwrap();
        assert!(!path.exists());
    }
}
