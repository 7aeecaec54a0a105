//! PRAGMA configuration applied to the state cache connection.
//!
//! WAL mode (file-backed databases only), NORMAL sync, configurable busy_timeout.

use rusqlite::Connection;

use driftwatch_core::config::CacheConfig;
use driftwatch_core::errors::DriftwatchResult;

use crate::to_cache_err;

/// Apply pragmas to a connection. `file_backed` gates WAL, which in-memory
/// databases do not support.
pub fn apply_pragmas(conn: &Connection, config: &CacheConfig, file_backed: bool) -> DriftwatchResult<()> {
    let journal = if config.wal_mode && file_backed {
        "WAL"
    } else {
        "MEMORY"
    };
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {journal};
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = {};
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_cache_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> DriftwatchResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_cache_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
