//! File-based key/value store.
//!
//! Each key is stored as `<key>.json` under a base directory. Every write
//! goes to its own uniquely named temporary file that is renamed over the
//! target, so readers never observe a half-written value and concurrent
//! writers of one key never share a file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::ports::{validate_key, KeyValueStore, StorageError};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", key, EXTENSION))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        match fs::read_to_string(self.key_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.ensure_dir().await?;

        let target = self.key_path(key);
        let tmp = self
            .base_path
            .join(format!(".{}.{}.{}.tmp", key, EXTENSION, Uuid::new_v4().simple()));
        let written = match fs::write(&tmp, value).await {
            Ok(()) => fs::rename(&tmp, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(StorageError::Io(e.to_string()));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        match fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = match fs::read_dir(&self.base_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_key(stem).is_ok() {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileKeyValueStore) {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("kv"));
        (dir, store)
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let (_dir, store) = store();
        assert_eq!(store.get("decisions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn value_survives_a_new_store_instance() {
        let (dir, store) = store();
        store.set("decisionRules", "[{\"id\":\"r1\"}]").await.unwrap();

        let reopened = FileKeyValueStore::new(dir.path().join("kv"));
        assert_eq!(
            reopened.get("decisionRules").await.unwrap().as_deref(),
            Some("[{\"id\":\"r1\"}]")
        );
    }

    #[tokio::test]
    async fn set_replaces_previous_value() {
        let (_dir, store) = store();
        store.set("theme", "\"light\"").await.unwrap();
        store.set("theme", "\"dark\"").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("\"dark\""));
    }

    #[tokio::test]
    async fn keys_lists_only_stored_values() {
        let (_dir, store) = store();
        assert!(store.keys().await.unwrap().is_empty());

        store.set("decisions", "[]").await.unwrap();
        store.set("theme", "\"system\"").await.unwrap();
        store.remove("theme").await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["decisions"]);
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.get("../secrets").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_writes_to_one_key_all_land_whole() {
        let (dir, store) = store();
        let values: Vec<String> = (0..16)
            .map(|i| format!("[{}]", "\"x\",".repeat(i * 64) + "\"end\""))
            .collect();

        let writes = values.iter().map(|value| store.set("decisions", value));
        for result in futures::future::join_all(writes).await {
            result.unwrap();
        }

        let stored = store.get("decisions").await.unwrap().unwrap();
        assert!(values.contains(&stored));
        serde_json::from_str::<serde_json::Value>(&stored).unwrap();

        let leftovers = std::fs::read_dir(dir.path().join("kv"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
