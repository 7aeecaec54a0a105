//! # driftwatch-cache
//!
//! Keyed per-aggregate state for the trackers: an in-memory map backend and a
//! SQLite backend for state that must survive restarts or outgrow memory.
//! Trackers talk to a [`CacheHandle`], which pins a namespace on a shared
//! [`IStateCache`].

pub mod handle;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use driftwatch_core::config::{CacheBackend, CacheConfig};
use driftwatch_core::errors::{CacheError, DriftwatchError, DriftwatchResult};
use driftwatch_core::models::CacheValue;
use driftwatch_core::traits::IStateCache;

pub use handle::CacheHandle;
pub use memory::InMemoryStateCache;
pub use sqlite::SqliteStateCache;

/// Open the backend selected by `config`.
pub fn open_state_cache(config: &CacheConfig) -> DriftwatchResult<Arc<dyn IStateCache>> {
    match config.backend {
        CacheBackend::Memory => {
            tracing::info!(backend = "memory", "opening state cache");
            Ok(Arc::new(InMemoryStateCache::new()))
        }
        CacheBackend::Sqlite => {
            tracing::info!(backend = "sqlite", db_path = %config.db_path, "opening state cache");
            Ok(Arc::new(SqliteStateCache::open(config)?))
        }
    }
}

/// Convert a SQLite error message into a `DriftwatchError`.
pub(crate) fn to_cache_err(message: impl Into<String>) -> DriftwatchError {
    DriftwatchError::Cache(CacheError::SqliteError {
        message: message.into(),
    })
}

/// Reject column value lists that are not parallel to `ids`, and vectors
/// holding NaN or infinities (JSON has no encoding for them).
pub(crate) fn check_columns(ids: usize, columns: &[(&str, Vec<CacheValue>)]) -> DriftwatchResult<()> {
    for (column, values) in columns {
        if values.len() != ids {
            return Err(CacheError::LengthMismatch {
                column: (*column).to_string(),
                ids,
                values: values.len(),
            }
            .into());
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DriftwatchError::invalid_value(
                format!("cache column {column}"),
                "non-finite values cannot be stored",
            ));
        }
    }
    Ok(())
}
