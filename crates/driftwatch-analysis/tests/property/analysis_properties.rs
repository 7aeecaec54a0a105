//! Property tests for divergence measures and change detectors.

use proptest::prelude::*;

use driftwatch_analysis::bucketing::{Cluster, ScalarBuckets};
use driftwatch_analysis::detectors::{ChangeDetector, Ddm, DetectorState};
use driftwatch_analysis::divergence::{centroid_cost_matrix, population_stability_index, transport_cost};
use driftwatch_core::config::DdmParams;

const EPS: f64 = 1e-4;

fn normalise(weights: Vec<f64>) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn distribution(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1f64..10.0, len).prop_map(normalise)
}

fn two_distributions() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..12).prop_flat_map(|n| (distribution(n), distribution(n)))
}

proptest! {
    #[test]
    fn psi_identity(p in (2usize..20).prop_flat_map(distribution)) {
        prop_assert_eq!(population_stability_index(&p, &p, EPS).unwrap(), 0.0);
    }

    #[test]
    fn psi_is_non_negative((p, q) in two_distributions()) {
        prop_assert!(population_stability_index(&p, &q, EPS).unwrap() >= 0.0);
    }

    #[test]
    fn psi_grows_as_mass_moves_away(q in (2usize..12).prop_flat_map(distribution), steps in 2usize..10) {
        // Move a growing share of every bucket's mass into bucket 0.
        let mut last = 0.0;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let mut p: Vec<f64> = q.iter().map(|x| x * (1.0 - t)).collect();
            p[0] += t * (1.0 - q[0]) + q[0] * t;
            let psi = population_stability_index(&p, &q, EPS).unwrap();
            prop_assert!(psi + 1e-12 >= last, "psi {} fell below {} at t={}", psi, last, t);
            last = psi;
        }
    }

    #[test]
    fn transport_identity_and_non_negativity(
        (p, q) in two_distributions(),
        seed in 0.0f64..5.0,
    ) {
        let clusters: Vec<Cluster> = (0..p.len())
            .map(|i| Cluster { centroid: vec![i as f64 * seed, seed], spread: 0.0, count: 1 })
            .collect();
        let costs = centroid_cost_matrix(&clusters);
        prop_assert_eq!(transport_cost(&p, &p, &costs).unwrap(), 0.0);
        prop_assert!(transport_cost(&p, &q, &costs).unwrap() >= 0.0);
    }

    #[test]
    fn scalar_assignment_is_monotone(
        values in prop::collection::vec(-1e3f64..1e3, 1..200),
        k in 1usize..25,
        a in -2e3f64..2e3,
        b in -2e3f64..2e3,
    ) {
        let buckets = ScalarBuckets::fit(&values, k).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(buckets.assign(lo) <= buckets.assign(hi));
        prop_assert!(buckets.assign(hi) < buckets.len());
        prop_assert_eq!(buckets.clusters().iter().map(|c| c.count).sum::<usize>(), values.len());
    }

    #[test]
    fn ddm_never_fires_during_warm_up(stream in prop::collection::vec(prop::bool::ANY, 0..499)) {
        let mut ddm = Ddm::new(DdmParams::default());
        for x in stream {
            prop_assert_eq!(ddm.update(if x { 1.0 } else { 0.0 }), DetectorState::Stable);
        }
    }
}
