//! k-means over max-abs normalised vectors.
//!
//! Seeding is k-means++ driven by a seeded `StdRng`, so the same reference
//! population and seed always produce the same clusters.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::FeatureVector;

use super::{spread_ratio, Cluster};

#[derive(Debug, Clone)]
pub struct KMeansModel {
    clusters: Vec<Cluster>,
    /// Divisor per dimension applied to every point before clustering.
    max_abs: Vec<f64>,
}

impl KMeansModel {
    pub fn fit(
        points: &FeatureVector,
        k: usize,
        seed: u64,
        max_iterations: usize,
    ) -> DriftwatchResult<Self> {
        if points.is_empty() || points.dims() == 0 {
            return Err(DriftwatchError::invalid_value(
                "k-means",
                "reference population has no numeric dimensions",
            ));
        }
        if points.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(DriftwatchError::invalid_value(
                "k-means",
                "reference contains non-finite values",
            ));
        }

        let max_abs: Vec<f64> = (0..points.dims())
            .map(|d| {
                let m = points.rows().map(|r| r[d].abs()).fold(0.0, f64::max);
                if m == 0.0 {
                    1.0
                } else {
                    m
                }
            })
            .collect();
        let normalised: Vec<Vec<f64>> = points.rows().map(|r| scale(r, &max_abs)).collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = seed_centroids(&normalised, k.min(normalised.len()), &mut rng);

        let mut assignments = vec![usize::MAX; normalised.len()];
        for iteration in 0..max_iterations.max(1) {
            let mut changed = false;
            for (point, slot) in normalised.iter().zip(assignments.iter_mut()) {
                let nearest = nearest(&centroids, point);
                if *slot != nearest {
                    *slot = nearest;
                    changed = true;
                }
            }
            if !changed {
                tracing::debug!(iteration, clusters = centroids.len(), "k-means converged");
                break;
            }
            recompute_centroids(&normalised, &assignments, &mut centroids);
        }
        for (point, slot) in normalised.iter().zip(assignments.iter_mut()) {
            *slot = nearest(&centroids, point);
        }

        let clusters = centroids
            .into_iter()
            .enumerate()
            .map(|(c, centroid)| {
                let members: Vec<&Vec<f64>> = normalised
                    .iter()
                    .zip(&assignments)
                    .filter(|(_, a)| **a == c)
                    .map(|(p, _)| p)
                    .collect();
                let spread = if members.is_empty() {
                    0.0
                } else {
                    members.iter().map(|p| mean_abs_diff(p, &centroid)).sum::<f64>()
                        / members.len() as f64
                };
                Cluster {
                    centroid,
                    spread,
                    count: members.len(),
                }
            })
            .collect();

        Ok(Self { clusters, max_abs })
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn max_abs_per_dim(&self) -> &[f64] {
        &self.max_abs
    }

    pub fn dims(&self) -> usize {
        self.max_abs.len()
    }

    /// Apply the reference normalisation to a raw point.
    pub fn normalise(&self, point: &[f64]) -> Vec<f64> {
        scale(point, &self.max_abs)
    }

    /// Nearest centroid (L2) of the normalised point.
    pub fn assign(&self, point: &[f64]) -> usize {
        let centroids: Vec<&[f64]> = self.clusters.iter().map(|c| c.centroid.as_slice()).collect();
        nearest_slices(&centroids, &self.normalise(point))
    }

    pub(crate) fn outlier_score(&self, point: &[f64], cluster: usize) -> f64 {
        self.clusters
            .get(cluster)
            .map(|c| spread_ratio(mean_abs_diff(&self.normalise(point), &c.centroid), c.spread))
            .unwrap_or_default()
    }
}

/// Mean absolute per-dimension difference.
pub fn mean_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64
}

fn scale(point: &[f64], max_abs: &[f64]) -> Vec<f64> {
    point.iter().zip(max_abs).map(|(v, m)| v / m).collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(centroids: &[Vec<f64>], point: &[f64]) -> usize {
    let slices: Vec<&[f64]> = centroids.iter().map(Vec::as_slice).collect();
    nearest_slices(&slices, point)
}

fn nearest_slices(centroids: &[&[f64]], point: &[f64]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(c, point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// k-means++: first centroid uniform, then proportional to squared distance
/// from the nearest chosen centroid. Stops early when every point already
/// coincides with a centroid.
fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = vec![points[rng.gen_range(0..points.len())].clone()];
    let mut min_d2: Vec<f64> = points.iter().map(|p| squared_distance(p, &centroids[0])).collect();

    while centroids.len() < k {
        let Ok(weights) = WeightedIndex::new(&min_d2) else {
            break;
        };
        let chosen = points[weights.sample(rng)].clone();
        for (d, p) in min_d2.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &chosen));
        }
        centroids.push(chosen);
    }
    centroids
}

/// Means of assigned points. Empty clusters keep their previous centroid.
fn recompute_centroids(points: &[Vec<f64>], assignments: &[usize], centroids: &mut [Vec<f64>]) {
    let dims = points[0].len();
    let mut sums = vec![vec![0.0; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (p, a) in points.iter().zip(assignments) {
        counts[*a] += 1;
        for (s, v) in sums[*a].iter_mut().zip(p) {
            *s += v;
        }
    }
    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *centroid = sum.into_iter().map(|s| s / count as f64).collect();
        }
    }
}
