//! The single `state_cache` table and its raw SQL operations.

use rusqlite::{params, Connection, OptionalExtension};

use driftwatch_core::errors::DriftwatchResult;

use crate::to_cache_err;

pub fn create_schema(conn: &Connection) -> DriftwatchResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS state_cache (
            namespace TEXT NOT NULL,
            col       TEXT NOT NULL,
            id        TEXT NOT NULL,
            value     TEXT NOT NULL,
            PRIMARY KEY (namespace, col, id)
        ) WITHOUT ROWID;
        ",
    )
    .map_err(|e| to_cache_err(e.to_string()))
}

pub fn upsert_value(conn: &Connection, namespace: &str, col: &str, id: &str, value: &str) -> DriftwatchResult<()> {
    conn.prepare_cached(
        "INSERT INTO state_cache (namespace, col, id, value) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (namespace, col, id) DO UPDATE SET value = excluded.value",
    )
    .and_then(|mut stmt| stmt.execute(params![namespace, col, id, value]))
    .map_err(|e| to_cache_err(e.to_string()))?;
    Ok(())
}

pub fn get_value(conn: &Connection, namespace: &str, col: &str, id: &str) -> DriftwatchResult<Option<String>> {
    conn.prepare_cached("SELECT value FROM state_cache WHERE namespace = ?1 AND col = ?2 AND id = ?3")
        .and_then(|mut stmt| {
            stmt.query_row(params![namespace, col, id], |row| row.get(0))
                .optional()
        })
        .map_err(|e| to_cache_err(e.to_string()))
}

pub fn delete_value(conn: &Connection, namespace: &str, col: &str, id: &str) -> DriftwatchResult<()> {
    conn.prepare_cached("DELETE FROM state_cache WHERE namespace = ?1 AND col = ?2 AND id = ?3")
        .and_then(|mut stmt| stmt.execute(params![namespace, col, id]))
        .map_err(|e| to_cache_err(e.to_string()))?;
    Ok(())
}

pub fn list_ids(conn: &Connection, namespace: &str, col: &str) -> DriftwatchResult<Vec<String>> {
    conn.prepare_cached("SELECT id FROM state_cache WHERE namespace = ?1 AND col = ?2")
        .and_then(|mut stmt| {
            let ids = stmt
                .query_map(params![namespace, col], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>();
            ids
        })
        .map_err(|e| to_cache_err(e.to_string()))
}

pub fn count_rows(conn: &Connection) -> DriftwatchResult<u64> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM state_cache", [], |row| row.get(0))
        .map_err(|e| to_cache_err(e.to_string()))?;
    Ok(n as u64)
}
