use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};

use super::check_lengths;
use crate::bucketing::{mean_abs_diff, Cluster};

/// Unit cost of moving mass between two clusters: mean absolute difference
/// of their centroids.
pub fn centroid_cost_matrix(clusters: &[Cluster]) -> Vec<Vec<f64>> {
    clusters
        .iter()
        .map(|a| {
            clusters
                .iter()
                .map(|b| mean_abs_diff(&a.centroid, &b.centroid))
                .collect()
        })
        .collect()
}

/// Greedy transport cost from `production` to `reference`.
///
/// Buckets holding more production mass than reference mass ship their
/// excess to buckets with a deficit, cheapest pairs first. Identical
/// distributions cost 0; the cost is never negative.
pub fn transport_cost(production: &[f64], reference: &[f64], costs: &[Vec<f64>]) -> DriftwatchResult<f64> {
    check_lengths(production, reference)?;
    let n = production.len();
    if costs.len() != n || costs.iter().any(|row| row.len() != n) {
        return Err(DriftwatchError::Shape {
            base: (n, n),
            reference: (costs.len(), costs.first().map_or(0, Vec::len)),
        });
    }

    let mut excess: Vec<f64> = production.iter().zip(reference).map(|(p, q)| (p - q).max(0.0)).collect();
    let mut deficit: Vec<f64> = production.iter().zip(reference).map(|(p, q)| (q - p).max(0.0)).collect();

    let sources: Vec<usize> = (0..n).filter(|i| excess[*i] > 0.0).collect();
    let sinks: Vec<usize> = (0..n).filter(|j| deficit[*j] > 0.0).collect();
    let mut pairs: Vec<(usize, usize)> = sources
        .iter()
        .flat_map(|&i| sinks.iter().map(move |&j| (i, j)))
        .collect();
    pairs.sort_by(|a, b| costs[a.0][a.1].total_cmp(&costs[b.0][b.1]));

    let mut total = 0.0;
    for (i, j) in pairs {
        let mass = excess[i].min(deficit[j]);
        if mass <= 0.0 {
            continue;
        }
        excess[i] -= mass;
        deficit[j] -= mass;
        total += mass * costs[i][j].max(0.0);
    }
    Ok(total)
}
