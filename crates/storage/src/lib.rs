use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

/// Durable key-value map holding at most one token per key.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn store(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct StoredToken {
    pub origin: String,
    pub token: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SqliteTokenStorage {
    pool: Pool<Sqlite>,
}

impl SqliteTokenStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?
            .create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open token database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run token storage migrations")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn stored_token(&self, origin: &str) -> Result<Option<StoredToken>> {
        let row = sqlx::query(
            "SELECT origin, token, updated_at FROM session_tokens WHERE origin = ?",
        )
        .bind(origin)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<StoredToken> {
            let raw_updated_at: String = row.try_get("updated_at")?;
            Ok(StoredToken {
                origin: row.try_get("origin")?,
                token: row.try_get("token")?,
                updated_at: parse_sqlite_timestamp(&raw_updated_at)?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl TokenStorage for SqliteTokenStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT token FROM session_tokens WHERE origin = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("failed to read session token")?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO session_tokens (origin, token, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(origin) DO UPDATE SET token = excluded.token, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .context("failed to write session token")?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM session_tokens WHERE origin = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("failed to delete session token")?;
        Ok(())
    }
}

/// Process-local storage. `set_unavailable(true)` makes every call fail.
#[derive(Default)]
pub struct MemoryTokenStorage {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        storage
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("token storage unavailable"));
        }
        Ok(())
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("token storage lock poisoned"))
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.entries()?.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.entries()?.remove(key);
        Ok(())
    }
}

fn parse_sqlite_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let naive = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("invalid sqlite timestamp '{raw}'"))?;
    Ok(naive.and_utc())
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
