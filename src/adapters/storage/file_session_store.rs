//! File-based Session Store Adapter
//!
//! Stores each key as one JSON file under a base directory. Writes go to a
//! temporary sibling first and are renamed into place, so a crash mid-write
//! leaves the previous value intact.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{SessionStore, SessionStoreError};

const FILE_EXTENSION: &str = "json";

/// File-based storage for session state
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new("./data/sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Keys become file names, so only a conservative character set is allowed.
    fn validate_key(key: &str) -> Result<(), SessionStoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if valid {
            Ok(())
        } else {
            Err(SessionStoreError::InvalidKey(key.to_string()))
        }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", key, FILE_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!(".{}.{}.tmp", key, FILE_EXTENSION))
    }

    async fn ensure_dir(&self) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, SessionStoreError> {
        Self::validate_key(key)?;
        let path = self.file_path(key);

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionStoreError::IoError(e.to_string())),
        };

        let value = serde_json::from_str(&raw)
            .map_err(|e| SessionStoreError::DeserializationFailed(e.to_string()))?;

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), SessionStoreError> {
        Self::validate_key(key)?;
        self.ensure_dir().await?;

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        let temp = self.temp_path(key);
        fs::write(&temp, json)
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))?;
        fs::rename(&temp, self.file_path(key))
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        Self::validate_key(key)?;

        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStoreError::IoError(e.to_string())),
        }
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(SessionStoreError::IoError(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SessionStoreError::IoError(e.to_string()))?
        {
            let path = entry.path();
            let is_ours = path
                .extension()
                .is_some_and(|ext| ext == FILE_EXTENSION || ext == "tmp");
            if is_ours {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| SessionStoreError::IoError(e.to_string()))?;
            }
        }

        Ok(())
    }
}
