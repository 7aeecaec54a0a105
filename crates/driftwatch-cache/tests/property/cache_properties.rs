//! Property tests for state cache backends.

use std::collections::HashMap;

use proptest::prelude::*;

use driftwatch_cache::{InMemoryStateCache, SqliteStateCache};
use driftwatch_core::models::{AggregateKey, CacheValue};
use driftwatch_core::traits::IStateCache;

fn aggregate_key() -> impl Strategy<Value = AggregateKey> {
    prop_oneof![
        any::<i64>().prop_map(AggregateKey::Int),
        "[a-z]{1,8}".prop_map(AggregateKey::Text),
    ]
}

fn cache_value() -> impl Strategy<Value = CacheValue> {
    prop_oneof![
        any::<u64>().prop_map(CacheValue::Count),
        prop::collection::vec(-1e6f64..1e6, 0..8).prop_map(CacheValue::Values),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn last_write_wins_on_both_backends(
        writes in prop::collection::vec((aggregate_key(), cache_value()), 1..40),
    ) {
        let memory = InMemoryStateCache::new();
        let sqlite = SqliteStateCache::open_in_memory().unwrap();
        let mut expected: HashMap<AggregateKey, CacheValue> = HashMap::new();

        for (id, value) in &writes {
            for cache in [&memory as &dyn IStateCache, &sqlite as &dyn IStateCache] {
                cache.upsert("ns", &[id.clone()], &[("v", vec![value.clone()])]).unwrap();
            }
            expected.insert(id.clone(), value.clone());
        }

        let ids: Vec<AggregateKey> = expected.keys().cloned().collect();
        for cache in [&memory as &dyn IStateCache, &sqlite as &dyn IStateCache] {
            let fetched = cache.fetch("ns", &ids, &["v"]).unwrap();
            prop_assert_eq!(&fetched[0], &expected);
        }
    }
}
