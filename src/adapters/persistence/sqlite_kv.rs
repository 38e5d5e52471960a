//! SQLite-backed StoragePort via libsql.
//!
//! Single `kv` table keyed by storage key; writes are upserts that replace the whole value.
//! Database file: data/expenses.db

use crate::domain::DomainError;
use crate::ports::StoragePort;
use libsql::{Database, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const KV_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)"#;

/// SQLite key-value storage. One database file (expenses.db) in the given base directory.
pub struct SqliteStorage {
    db: Database,
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Connect to (or create) the database and ensure the schema exists.
    ///
    /// Sets WAL mode so a crash mid-write never leaves a torn value behind.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Storage(e.to_string()))?;
        let db_path = base.join("expenses.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Storage(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .is_some()
        {}

        conn.execute(KV_TABLE, ())
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        info!(path = %db_path.display(), "SQLite storage connected");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<libsql::Connection, DomainError> {
        self.db
            .connect()
            .map_err(|e| DomainError::Storage(e.to_string()))
    }
}

#[async_trait::async_trait]
impl StoragePort for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT value FROM kv WHERE key = ?1", params![key])
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        if let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?
        {
            let value: String = row
                .get(0)
                .map_err(|e| DomainError::Storage(e.to_string()))?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;
        debug!(key, bytes = value.len(), "kv entry upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::connect(dir.path()).await.unwrap();
        assert_eq!(storage.get("as_expenses").await.unwrap(), None);

        storage.set("as_expenses", "[]").await.unwrap();
        storage.set("as_expenses", r#"[{"a":1}]"#).await.unwrap();
        assert_eq!(
            storage.get("as_expenses").await.unwrap().as_deref(),
            Some(r#"[{"a":1}]"#)
        );
    }

    #[tokio::test]
    async fn test_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = SqliteStorage::connect(dir.path()).await.unwrap();
            storage.set("as_expenses", "[]").await.unwrap();
        }
        let reopened = SqliteStorage::connect(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("as_expenses").await.unwrap().as_deref(),
            Some("[]")
        );
    }
}
