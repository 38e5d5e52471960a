//! Implements StoragePort using one JSON file per key.
//!
//! `<base_dir>/<key>.json`. Writes replace the whole file atomically.

use crate::domain::DomainError;
use crate::ports::StoragePort;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File-backed key-value storage.
pub struct JsonFileStorage {
    base_dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Keys become file names, so only a conservative character set is allowed.
    fn key_path(&self, key: &str) -> Result<PathBuf, DomainError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(DomainError::Storage(format!("invalid storage key: {:?}", key)));
        }
        Ok(self.base_dir.join(format!("{}.json", key)))
    }

    /// Atomic save using write-replace pattern.
    /// 1. Write to temp file
    /// 2. sync_all() to ensure flush to disk
    /// 3. Atomic rename to target path
    async fn write_atomic(path: &Path, contents: &str) -> Result<(), DomainError> {
        let temp_path = path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(contents.as_bytes())
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {}", e)))?;
        drop(f); // Close file handle before rename

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| DomainError::Storage(format!("atomic rename failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StoragePort for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Storage(format!(
                "read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        Self::write_atomic(&path, value).await?;
        debug!(path = %path.display(), bytes = value.len(), "storage entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert_eq!(storage.get("as_expenses").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));
        storage.set("as_expenses", "[1,2,3]").await.unwrap();
        storage.set("as_expenses", "[]").await.unwrap();
        assert_eq!(
            storage.get("as_expenses").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(!dir.path().join("nested/as_expenses.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.set("../escape", "x").await.is_err());
        assert!(storage.get("a/b").await.is_err());
    }
}
