//! # tf-store-sqlite Implementation
//!
//! This module keeps the forum's key-value area in a single SQLite table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tf_core::traits::KvStore;

pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Opens (or creates) the database at `url` and ensures the table exists.
    ///
    /// # Developer Note
    /// The pool holds a single connection. Every forum operation is one
    /// read-modify-write, and `sqlite::memory:` databases are private to the
    /// connection that created them.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        log::info!("sqlite store ready at {url}");
        Ok(Self { pool })
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// Upsert: the whole value is replaced, last write wins.
    async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn contains(&self, key: &str) -> anyhow::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let store = SqliteKvStore::new("sqlite::memory:").await.unwrap();
        assert_eq!(store.get("forum_posts").await.unwrap(), None);

        store.set("forum_posts", "[]".into()).await.unwrap();
        store.set("forum_posts", "[{}]".into()).await.unwrap();
        assert_eq!(store.get("forum_posts").await.unwrap().as_deref(), Some("[{}]"));

        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM kv_entries")
            .fetch_one(&store.pool)
            .await
            .unwrap()
            .get("n");
        assert_eq!(count, 1);

        store.remove("forum_posts").await.unwrap();
        store.remove("forum_posts").await.unwrap();
        assert!(!store.contains("forum_posts").await.unwrap());
    }

    #[tokio::test]
    async fn test_presence_marker() {
        let store = SqliteKvStore::new("sqlite::memory:").await.unwrap();
        store.set("purchased_3_4", "true".into()).await.unwrap();
        assert!(store.contains("purchased_3_4").await.unwrap());
        assert!(!store.contains("purchased_4_3").await.unwrap());
    }
}
