use std::sync::Arc;

use driftwatch_cache::{open_state_cache, CacheHandle, InMemoryStateCache, SqliteStateCache};
use driftwatch_core::config::{CacheBackend, CacheConfig};
use driftwatch_core::errors::CacheError;
use driftwatch_core::models::{AggregateKey, CacheValue};
use driftwatch_core::traits::IStateCache;
use driftwatch_core::DriftwatchError;

fn backends() -> Vec<(&'static str, Arc<dyn IStateCache>)> {
    vec![
        ("memory", Arc::new(InMemoryStateCache::new())),
        ("sqlite", Arc::new(SqliteStateCache::open_in_memory().unwrap())),
    ]
}

fn key(i: i64) -> AggregateKey {
    AggregateKey::Int(i)
}

#[test]
fn upsert_then_fetch_round_trips() {
    for (name, cache) in backends() {
        cache
            .upsert(
                "ns",
                &[key(1), AggregateKey::from("u2")],
                &[
                    ("count", vec![CacheValue::Count(5), CacheValue::Count(9)]),
                    (
                        "value",
                        vec![CacheValue::Values(vec![0.5, 1.5]), CacheValue::Values(vec![-1.0])],
                    ),
                ],
            )
            .unwrap();

        let fetched = cache
            .fetch("ns", &[key(1), AggregateKey::from("u2")], &["count", "value"])
            .unwrap();
        assert_eq!(fetched.len(), 2, "{name}");
        assert_eq!(fetched[0][&key(1)], CacheValue::Count(5), "{name}");
        assert_eq!(fetched[0][&AggregateKey::from("u2")], CacheValue::Count(9), "{name}");
        assert_eq!(fetched[1][&key(1)], CacheValue::Values(vec![0.5, 1.5]), "{name}");
    }
}

#[test]
fn fetching_unwritten_ids_returns_no_entry() {
    for (name, cache) in backends() {
        cache
            .upsert("ns", &[key(1)], &[("count", vec![CacheValue::Count(1)])])
            .unwrap();
        let fetched = cache.fetch("ns", &[key(2)], &["count", "missing"]).unwrap();
        assert!(fetched[0].is_empty(), "{name}");
        assert!(fetched[1].is_empty(), "{name}");
    }
}

#[test]
fn upsert_overwrites_previous_value() {
    for (name, cache) in backends() {
        cache
            .upsert("ns", &[key(1)], &[("count", vec![CacheValue::Count(1)])])
            .unwrap();
        cache
            .upsert("ns", &[key(1)], &[("count", vec![CacheValue::Count(2)])])
            .unwrap();
        let fetched = cache.fetch("ns", &[key(1)], &["count"]).unwrap();
        assert_eq!(fetched[0][&key(1)], CacheValue::Count(2), "{name}");
    }
}

#[test]
fn namespaces_are_isolated() {
    for (name, cache) in backends() {
        cache
            .upsert("a", &[key(1)], &[("count", vec![CacheValue::Count(1)])])
            .unwrap();
        let fetched = cache.fetch("b", &[key(1)], &["count"]).unwrap();
        assert!(fetched[0].is_empty(), "{name}");
    }
}

#[test]
fn remove_deletes_only_the_named_column() {
    for (name, cache) in backends() {
        cache
            .upsert(
                "ns",
                &[key(1)],
                &[
                    ("count", vec![CacheValue::Count(1)]),
                    ("value", vec![CacheValue::Values(vec![1.0])]),
                ],
            )
            .unwrap();
        cache.remove("ns", &[key(1)], "value").unwrap();
        let fetched = cache.fetch("ns", &[key(1)], &["count", "value"]).unwrap();
        assert_eq!(fetched[0].len(), 1, "{name}");
        assert!(fetched[1].is_empty(), "{name}");
    }
}

#[test]
fn mismatched_column_length_is_rejected() {
    for (name, cache) in backends() {
        let err = cache
            .upsert("ns", &[key(1), key(2)], &[("count", vec![CacheValue::Count(1)])])
            .unwrap_err();
        assert!(
            matches!(err, DriftwatchError::Cache(CacheError::LengthMismatch { ids: 2, values: 1, .. })),
            "{name}: {err:?}"
        );
    }
}

#[test]
fn non_finite_values_are_rejected_by_every_backend() {
    for (name, cache) in backends() {
        cache
            .upsert("ns", &[key(1)], &[("value", vec![CacheValue::Values(vec![1.0])])])
            .unwrap();
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = cache
                .upsert(
                    "ns",
                    &[key(1), key(2)],
                    &[("value", vec![CacheValue::Values(vec![0.0]), CacheValue::Values(vec![bad])])],
                )
                .unwrap_err();
            assert!(matches!(err, DriftwatchError::InvalidValue { .. }), "{name}: {err:?}");
            assert!(err.is_row_level(), "{name}");
        }

        // Nothing from the rejected upserts was written and the id stays readable.
        let fetched = cache.fetch("ns", &[key(1), key(2)], &["value"]).unwrap();
        assert_eq!(fetched[0][&key(1)], CacheValue::Values(vec![1.0]), "{name}");
        assert!(!fetched[0].contains_key(&key(2)), "{name}");
    }
}

#[test]
fn ids_lists_every_stored_key_in_order() {
    for (name, cache) in backends() {
        let ids = [AggregateKey::from("b"), key(10), AggregateKey::from(""), key(-2), key(3)];
        cache
            .upsert("ns", &ids, &[("value", vec![CacheValue::Count(0); ids.len()])])
            .unwrap();
        cache
            .upsert("other", &[key(99)], &[("value", vec![CacheValue::Count(0)])])
            .unwrap();
        cache.remove("ns", &[key(3)], "value").unwrap();

        assert_eq!(
            cache.ids("ns", "value").unwrap(),
            vec![key(-2), key(10), AggregateKey::from(""), AggregateKey::from("b")],
            "{name}"
        );
        assert!(cache.ids("ns", "missing").unwrap().is_empty(), "{name}");
    }
}

#[test]
fn handle_pins_namespace_and_child_derives_one() {
    let cache: Arc<dyn IStateCache> = Arc::new(InMemoryStateCache::new());
    let parent = CacheHandle::new(Arc::clone(&cache), "tracker");
    let child = parent.child("model=gpt");
    assert_eq!(child.namespace(), "tracker/model=gpt");

    child
        .upsert(&[key(3)], &[("count", vec![CacheValue::Count(3)])])
        .unwrap();
    assert!(parent.fetch(&[key(3)], &["count"]).unwrap()[0].is_empty());
    assert_eq!(
        cache.fetch("tracker/model=gpt", &[key(3)], &["count"]).unwrap()[0][&key(3)],
        CacheValue::Count(3)
    );
}

#[test]
fn handle_short_circuits_empty_id_lists() {
    let handle = CacheHandle::new(Arc::new(InMemoryStateCache::new()), "ns");
    let fetched = handle.fetch(&[], &["a", "b"]).unwrap();
    assert_eq!(fetched.len(), 2);
    handle.upsert(&[], &[("a", vec![])]).unwrap();
    handle.remove(&[], "a").unwrap();
}

#[test]
fn factory_opens_configured_backend() {
    let memory = open_state_cache(&CacheConfig::default()).unwrap();
    memory
        .upsert("ns", &[key(1)], &[("c", vec![CacheValue::Count(1)])])
        .unwrap();

    let sqlite = open_state_cache(&CacheConfig {
        backend: CacheBackend::Sqlite,
        db_path: ":memory:".to_string(),
        ..CacheConfig::default()
    })
    .unwrap();
    sqlite
        .upsert("ns", &[key(1)], &[("c", vec![CacheValue::Count(1)])])
        .unwrap();
    assert_eq!(
        sqlite.fetch("ns", &[key(1)], &["c"]).unwrap()[0][&key(1)],
        CacheValue::Count(1)
    );
}
