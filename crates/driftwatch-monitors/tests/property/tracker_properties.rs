//! Property tests for the aggregate trackers' counter handling.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use driftwatch_core::config::CheckConfig;
use driftwatch_monitors::{ConvergenceTracker, DistanceTracker, MonitorContext};
use driftwatch_observability::RecordingSink;
use test_fixtures::{aggregate_batch, AggregateUpdate};

fn context() -> MonitorContext {
    MonitorContext::in_memory(Arc::new(RecordingSink::new()))
}

fn convergence(checkpoints: &[u64]) -> ConvergenceTracker {
    let config = CheckConfig::from_json(&json!({
        "type": "convergence",
        "name": "prop",
        "measurable_args": {"type": "input_feature", "feature_name": "embs"},
        "aggregate_args": {"type": "extra", "field": "user_id"},
        "count_args": {"type": "extra", "field": "num_messages"},
        "distance_types": ["l2_distance"],
        "count_checkpoints": checkpoints,
    }))
    .unwrap();
    match config {
        CheckConfig::Convergence(c) => ConvergenceTracker::new(&c, &context()).unwrap(),
        other => panic!("expected convergence config, got {other:?}"),
    }
}

fn distance(reference: &str) -> DistanceTracker {
    let config = CheckConfig::from_json(&json!({
        "type": "distance",
        "name": "prop",
        "measurable_args": {"type": "input_feature", "feature_name": "embs"},
        "aggregate_args": {"type": "extra", "field": "user_id"},
        "count_args": {"type": "extra", "field": "num_messages"},
        "distance_types": ["l2_distance"],
        "reference": reference,
    }))
    .unwrap();
    match config {
        CheckConfig::Distance(c) => DistanceTracker::new(&c, &context()).unwrap(),
        other => panic!("expected distance config, got {other:?}"),
    }
}

/// Strictly increasing counts built from positive steps.
fn increasing_counts() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..120, 1..40).prop_map(|steps| {
        steps
            .into_iter()
            .scan(0u64, |total, step| {
                *total += step;
                Some(*total)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn crossings_are_increasing_configured_checkpoints(
        checkpoints in prop::collection::btree_set(1u64..1_500, 1..8),
        counts in increasing_counts(),
        one_by_one in any::<bool>(),
    ) {
        let checkpoints: Vec<u64> = checkpoints.into_iter().collect();
        let mut tracker = convergence(&checkpoints);
        let updates: Vec<AggregateUpdate> = counts
            .iter()
            .map(|c| AggregateUpdate::new("u1", *c, vec![*c as f64]))
            .collect();

        let crossings: Vec<(u64, u64)> = if one_by_one {
            updates
                .iter()
                .flat_map(|u| tracker.check(&aggregate_batch(&[u.clone()])).unwrap().crossings)
                .map(|c| (c.checkpoint, c.count))
                .collect()
        } else {
            tracker
                .check(&aggregate_batch(&updates))
                .unwrap()
                .crossings
                .into_iter()
                .map(|c| (c.checkpoint, c.count))
                .collect()
        };

        let max_count = *counts.last().unwrap();
        prop_assert!(crossings.len() <= checkpoints.len());
        prop_assert!(crossings.windows(2).all(|w| w[0].0 < w[1].0));
        for (checkpoint, count) in &crossings {
            prop_assert!(checkpoints.contains(checkpoint));
            prop_assert!(checkpoint <= count);
            prop_assert!(*count <= max_count);
        }

        let highest_reached = checkpoints.iter().copied().filter(|c| *c <= max_count).max();
        prop_assert_eq!(crossings.last().map(|c| c.0), highest_reached);
    }

    #[test]
    fn initial_reference_is_always_the_first_value(
        values in prop::collection::vec(-100.0f64..100.0, 1..30),
    ) {
        let mut tracker = distance("initial");
        let updates: Vec<AggregateUpdate> = values
            .iter()
            .enumerate()
            .map(|(i, v)| AggregateUpdate::new("u1", i as u64 + 1, vec![*v]))
            .collect();
        let report = tracker.check(&aggregate_batch(&updates)).unwrap();

        prop_assert_eq!(report.observations.len(), values.len());
        for (observation, v) in report.observations.iter().zip(&values) {
            let expected = (v - values[0]) * (v - values[0]);
            prop_assert!((observation.distances["l2_distance"] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn only_new_maxima_advance_the_counter(
        counts in prop::collection::vec(0u64..50, 1..40),
    ) {
        let mut tracker = distance("running_diff");
        let updates: Vec<AggregateUpdate> = counts
            .iter()
            .map(|c| AggregateUpdate::new("u1", *c, vec![0.0]))
            .collect();
        let report = tracker.check(&aggregate_batch(&updates)).unwrap();

        let mut best: Option<u64> = None;
        let mut advancing = 0;
        for c in &counts {
            if best.map_or(true, |b| *c > b) {
                best = Some(*c);
                advancing += 1;
            }
        }
        prop_assert_eq!(report.stats.processed, advancing);
        prop_assert_eq!(report.stats.stale, counts.len() - advancing);
    }
}
