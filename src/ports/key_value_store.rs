//! Key/value store port - string values under short string keys.
//!
//! Stands in for the browser's local storage: collections are stored whole
//! as JSON under a well-known key and replaced on every write.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Errors from key/value storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage IO error: {0}")]
    Io(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl StorageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StorageError::InvalidKey(_) => ErrorCode::ValidationFailed,
            StorageError::Io(_) | StorageError::Serialization(_) => ErrorCode::StorageError,
        }
    }
}

/// Checks a key against `[A-Za-z0-9_-]+`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys, sorted.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}
