use serde::{Deserialize, Serialize};

use super::defaults;

/// Which state cache backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Process-local hash map. State is lost on restart.
    #[default]
    Memory,
    /// SQLite table, file-backed unless `db_path` is `:memory:`.
    Sqlite,
}

/// State cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Database file for the SQLite backend.
    pub db_path: String,
    /// Enable WAL journaling (SQLite only).
    pub wal_mode: bool,
    pub busy_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            db_path: defaults::DEFAULT_CACHE_DB_PATH.to_string(),
            wal_mode: true,
            busy_timeout_ms: defaults::DEFAULT_CACHE_BUSY_TIMEOUT_MS,
        }
    }
}
