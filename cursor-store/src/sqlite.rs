//! SQLite-backed store; values are kept as JSON text in a single `kv` table.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use tracing::info;

use crate::error::StoreError;
use crate::store::CursorStore;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database file and the `kv` table.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        info!(path = %path, "Initializing SQLite cursor store");

        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(path);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    async fn raw(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|text| serde_json::from_str(&text).map_err(StoreError::from))
            .transpose()
    }
}

#[async_trait]
impl CursorStore for SqliteStore {
    async fn get(&self, key: &str, default: Value) -> Result<Value, StoreError> {
        Ok(match self.raw(key).await? {
            Some(v) if !v.is_null() => v,
            _ => default,
        })
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(serde_json::to_string(&value)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.raw(key).await?.is_some())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv").execute(&self.pool).await?;
        Ok(())
    }
}
