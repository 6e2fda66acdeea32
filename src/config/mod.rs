//! Key-value configuration storage backed by SQLite, and resolution of the
//! function endpoint from flags, stored values, and the environment.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::consts::{
    DEFAULT_FUNCTION_URL, KEY_CONFIG_KEY, KEY_ENV_VAR, URL_CONFIG_KEY, URL_ENV_VAR,
};
use crate::invoker::Endpoint;

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

/// Where the function lives and how to authenticate, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    pub url: String,
    pub key: Option<String>,
}

impl EndpointSettings {
    pub fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::new(&self.url, self.key.as_deref())?)
    }
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("config database lock poisoned"))
    }

    /// Get a config value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a config value (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a config key.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Resolve the endpoint settings from the process environment.
    /// Priority: flag → stored value → environment variable → default.
    pub fn endpoint_settings(
        &self,
        url_flag: Option<String>,
        key_flag: Option<String>,
    ) -> Result<EndpointSettings> {
        self.endpoint_settings_with(url_flag, key_flag, |name| std::env::var(name).ok())
    }

    /// Like [`endpoint_settings`](Self::endpoint_settings), reading
    /// environment variables through `env`.
    pub fn endpoint_settings_with(
        &self,
        url_flag: Option<String>,
        key_flag: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<EndpointSettings> {
        let url = first_non_empty([url_flag, self.get(URL_CONFIG_KEY)?, env(URL_ENV_VAR)])
            .unwrap_or_else(|| DEFAULT_FUNCTION_URL.to_string());
        let key = first_non_empty([key_flag, self.get(KEY_CONFIG_KEY)?, env(KEY_ENV_VAR)]);
        Ok(EndpointSettings { url, key })
    }
}

fn first_non_empty(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
