//! SQLite-backed state cache: one table, JSON-encoded values, a single
//! mutex-guarded connection.

pub mod pragmas;
pub mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;

use driftwatch_core::config::CacheConfig;
use driftwatch_core::errors::{CacheError, DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{AggregateKey, CacheValue};
use driftwatch_core::traits::IStateCache;

use crate::{check_columns, to_cache_err};

const IN_MEMORY_PATH: &str = ":memory:";

pub struct SqliteStateCache {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStateCache {
    /// Open the database at `config.db_path` (`:memory:` for a private
    /// in-memory database), applying pragmas and creating the table.
    pub fn open(config: &CacheConfig) -> DriftwatchResult<Self> {
        if config.db_path == IN_MEMORY_PATH {
            return Self::open_in_memory_with(config);
        }
        let path = Path::new(&config.db_path);
        let conn = Connection::open(path).map_err(|e| to_cache_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn, config, true)?;
        schema::create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database (for testing).
    pub fn open_in_memory() -> DriftwatchResult<Self> {
        Self::open_in_memory_with(&CacheConfig::default())
    }

    fn open_in_memory_with(config: &CacheConfig) -> DriftwatchResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_cache_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn, config, false)?;
        schema::create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> DriftwatchResult<T>
    where
        F: FnOnce(&mut Connection) -> DriftwatchResult<T>,
    {
        let mut guard = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        f(&mut guard)
    }

    /// Total stored entries across namespaces.
    pub fn len(&self) -> DriftwatchResult<u64> {
        self.with_conn(|conn| schema::count_rows(conn))
    }
}

impl IStateCache for SqliteStateCache {
    fn upsert(
        &self,
        namespace: &str,
        ids: &[AggregateKey],
        columns: &[(&str, Vec<CacheValue>)],
    ) -> DriftwatchResult<()> {
        check_columns(ids.len(), columns)?;
        self.with_conn(|conn| {
            let tx = conn.transaction().map_err(|e| to_cache_err(e.to_string()))?;
            for (column, values) in columns {
                for (id, value) in ids.iter().zip(values) {
                    let encoded = serde_json::to_string(value).map_err(|e| CacheError::Encode {
                        column: (*column).to_string(),
                        reason: e.to_string(),
                    })?;
                    schema::upsert_value(&tx, namespace, column, &id.encode(), &encoded)?;
                }
            }
            tx.commit().map_err(|e| to_cache_err(e.to_string()))
        })
    }

    fn fetch(
        &self,
        namespace: &str,
        ids: &[AggregateKey],
        columns: &[&str],
    ) -> DriftwatchResult<Vec<HashMap<AggregateKey, CacheValue>>> {
        self.with_conn(|conn| {
            let mut out = Vec::with_capacity(columns.len());
            for column in columns {
                let mut found = HashMap::new();
                for id in ids {
                    let Some(raw) = schema::get_value(conn, namespace, column, &id.encode())? else {
                        continue;
                    };
                    let value: CacheValue = serde_json::from_str(&raw).map_err(|e| CacheError::Decode {
                        column: (*column).to_string(),
                        reason: e.to_string(),
                    })?;
                    found.insert(id.clone(), value);
                }
                out.push(found);
            }
            Ok(out)
        })
    }

    fn remove(&self, namespace: &str, ids: &[AggregateKey], column: &str) -> DriftwatchResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction().map_err(|e| to_cache_err(e.to_string()))?;
            for id in ids {
                schema::delete_value(&tx, namespace, column, &id.encode())?;
            }
            tx.commit().map_err(|e| to_cache_err(e.to_string()))
        })
    }

    fn ids(&self, namespace: &str, column: &str) -> DriftwatchResult<Vec<AggregateKey>> {
        let raw = self.with_conn(|conn| schema::list_ids(conn, namespace, column))?;
        let mut ids = raw
            .iter()
            .map(|r| {
                AggregateKey::decode(r).ok_or_else(|| {
                    DriftwatchError::from(CacheError::Decode {
                        column: column.to_string(),
                        reason: format!("malformed id '{r}'"),
                    })
                })
            })
            .collect::<DriftwatchResult<Vec<_>>>()?;
        // Stored ids sort by their encoded form, not by key order.
        ids.sort_unstable();
        Ok(ids)
    }
}
