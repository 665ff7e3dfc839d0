//! Import progress reporting.
//!
//! The status record lives in a key-value store so a separate process can
//! poll it while a run is in progress. It is always written as a single JSON
//! value under a single key.

mod storage;

pub use storage::{FileStatusStore, MemoryStatusStore};

use crate::utils::now_iso;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Latest progress snapshot of an import run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatus {
    pub message: String,
    pub done: bool,
    #[serde(default)]
    pub updated_at: String,
}

impl ImportStatus {
    pub fn new(message: impl Into<String>, done: bool) -> Self {
        Self {
            message: message.into(),
            done,
            updated_at: now_iso(),
        }
    }
}

/// Key-value store holding the status record
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StatusError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StatusError>;
    async fn delete(&self, key: &str) -> Result<(), StatusError>;
}

/// Anything that can receive progress updates
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn report(&self, message: &str, done: bool);
}

/// Publishes [`ImportStatus`] records under one key of a [`StatusStore`]
#[derive(Clone)]
pub struct StatusReporter {
    store: Arc<dyn StatusStore>,
    key: String,
}

impl StatusReporter {
    pub fn new(store: Arc<dyn StatusStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Latest status, or `None` when nothing was reported since the last clear
    pub async fn read(&self) -> Result<Option<ImportStatus>, StatusError> {
        match self.store.get(&self.key).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    pub async fn clear(&self) -> Result<(), StatusError> {
        self.store.delete(&self.key).await
    }

    pub async fn write(&self, status: &ImportStatus) -> Result<(), StatusError> {
        let value = serde_json::to_string(status)?;
        self.store.set(&self.key, &value).await
    }
}

#[async_trait]
impl StatusSink for StatusReporter {
    async fn report(&self, message: &str, done: bool) {
        if let Err(e) = self.write(&ImportStatus::new(message, done)).await {
            warn!(key = %self.key, error = %e, "Failed to publish import status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> StatusReporter {
        StatusReporter::new(Arc::new(MemoryStatusStore::new()), "importStatus")
    }

    #[tokio::test]
    async fn test_read_without_status() {
        assert!(reporter().read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_report_overwrites_previous() {
        let reporter = reporter();
        reporter.report("Scanning folder...", false).await;
        reporter.report("No changes.", true).await;

        let status = reporter.read().await.unwrap().unwrap();
        assert_eq!(status.message, "No changes.");
        assert!(status.done);
    }

    #[tokio::test]
    async fn test_clear_removes_status() {
        let reporter = reporter();
        reporter.report("Writing...", false).await;
        reporter.clear().await.unwrap();
        assert!(reporter.read().await.unwrap().is_none());
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = ImportStatus::new("Done", true);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["message"], "Done");
        assert_eq!(json["done"], true);
        assert!(json.get("updatedAt").is_some());
    }

    #[tokio::test]
    async fn test_read_record_without_timestamp() {
        let store = Arc::new(MemoryStatusStore::new());
        store
            .set("importStatus", r#"{"message":"Scanning folder...","done":false}"#)
            .await
            .unwrap();

        let status = StatusReporter::new(store, "importStatus")
            .read()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.message, "Scanning folder...");
        assert!(!status.done);
        assert!(status.updated_at.is_empty());
    }
}
