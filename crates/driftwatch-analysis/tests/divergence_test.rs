use driftwatch_analysis::bucketing::Cluster;
use driftwatch_analysis::divergence::*;

const EPS: f64 = 1e-4;

fn cluster(centroid: Vec<f64>) -> Cluster {
    Cluster {
        centroid,
        spread: 0.0,
        count: 1,
    }
}

#[test]
fn psi_of_identical_distributions_is_zero() {
    let p = [0.1, 0.2, 0.3, 0.4];
    assert_eq!(population_stability_index(&p, &p, EPS).unwrap(), 0.0);
}

#[test]
fn psi_handles_empty_buckets() {
    let psi = population_stability_index(&[1.0, 0.0], &[0.0, 1.0], EPS).unwrap();
    assert!(psi.is_finite());
    assert!(psi > 10.0);
}

#[test]
fn psi_rejects_mismatched_lengths() {
    assert!(population_stability_index(&[1.0], &[0.5, 0.5], EPS).is_err());
}

#[test]
fn transport_identity_is_zero() {
    let clusters = vec![cluster(vec![0.0]), cluster(vec![1.0]), cluster(vec![3.0])];
    let costs = centroid_cost_matrix(&clusters);
    let p = [0.2, 0.5, 0.3];
    assert_eq!(transport_cost(&p, &p, &costs).unwrap(), 0.0);
}

#[test]
fn transport_moves_mass_to_cheapest_deficit_first() {
    let clusters = vec![cluster(vec![0.0]), cluster(vec![1.0]), cluster(vec![3.0])];
    let costs = centroid_cost_matrix(&clusters);
    // 0.5 excess at bucket 0; deficits at 1 (0.25, cost 1) and 2 (0.25, cost 3).
    let cost = transport_cost(&[1.0, 0.0, 0.0], &[0.5, 0.25, 0.25], &costs).unwrap();
    assert!((cost - (0.25 * 1.0 + 0.25 * 3.0)).abs() < 1e-12);
}

#[test]
fn cost_matrix_uses_mean_absolute_difference() {
    let costs = centroid_cost_matrix(&[cluster(vec![0.0, 0.0]), cluster(vec![1.0, 3.0])]);
    assert_eq!(costs[0][1], 2.0);
    assert_eq!(costs[1][0], 2.0);
    assert_eq!(costs[0][0], 0.0);
}

#[test]
fn transport_rejects_bad_cost_matrix() {
    assert!(transport_cost(&[0.5, 0.5], &[0.5, 0.5], &[vec![0.0]]).is_err());
}
