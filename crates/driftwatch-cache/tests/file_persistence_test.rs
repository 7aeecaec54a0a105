use driftwatch_cache::sqlite::pragmas::verify_wal_mode;
use driftwatch_cache::SqliteStateCache;
use driftwatch_core::config::{CacheBackend, CacheConfig};
use driftwatch_core::models::{AggregateKey, CacheValue};
use driftwatch_core::traits::IStateCache;

fn config_for(dir: &tempfile::TempDir) -> CacheConfig {
    CacheConfig {
        backend: CacheBackend::Sqlite,
        db_path: dir.path().join("state.db").display().to_string(),
        ..CacheConfig::default()
    }
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir);
    let ids = [AggregateKey::from("user-1"), AggregateKey::Int(42)];

    {
        let cache = SqliteStateCache::open(&config).unwrap();
        cache
            .upsert(
                "convergence",
                &ids,
                &[
                    ("count", vec![CacheValue::Count(200), CacheValue::Count(500)]),
                    (
                        "value",
                        vec![CacheValue::Values(vec![0.1, 0.2]), CacheValue::Values(vec![0.3])],
                    ),
                ],
            )
            .unwrap();
    }

    let reopened = SqliteStateCache::open(&config).unwrap();
    assert_eq!(reopened.len().unwrap(), 4);
    let fetched = reopened.fetch("convergence", &ids, &["count", "value"]).unwrap();
    assert_eq!(fetched[0][&ids[0]], CacheValue::Count(200));
    assert_eq!(fetched[0][&ids[1]], CacheValue::Count(500));
    assert_eq!(fetched[1][&ids[0]], CacheValue::Values(vec![0.1, 0.2]));
}

#[test]
fn file_backed_cache_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SqliteStateCache::open(&config_for(&dir)).unwrap();
    assert!(cache.with_conn(|conn| verify_wal_mode(conn)).unwrap());
    assert!(cache.db_path().is_some());
}

#[test]
fn wal_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = CacheConfig {
        wal_mode: false,
        ..config_for(&dir)
    };
    let cache = SqliteStateCache::open(&config).unwrap();
    assert!(!cache.with_conn(|conn| verify_wal_mode(conn)).unwrap());
}
