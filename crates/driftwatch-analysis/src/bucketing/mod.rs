//! Reference bucketing: turn a reference population into a fixed set of
//! buckets, then assign production points to them.
//!
//! Three modes:
//! - scalar: equal-count quantile bins, one set per dimension
//! - categorical: one bucket per distinct value, grown on unseen values
//! - embedding: k-means over max-abs normalised vectors

mod categorical;
mod kmeans;
mod scalar;

pub use categorical::CategoricalBuckets;
pub use kmeans::{mean_abs_diff, KMeansModel};
pub use scalar::ScalarBuckets;

use serde::Serialize;

use driftwatch_core::config::defaults;
use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{Datum, FeatureVector};

/// A fitted bucket: representative, spread, and reference membership.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub centroid: Vec<f64>,
    /// Variance for scalar bins, mean absolute deviation for vector clusters.
    pub spread: f64,
    pub count: usize,
}

/// Fitting parameters.
#[derive(Debug, Clone)]
pub struct BucketingConfig {
    pub num_buckets: usize,
    /// Cluster whole vectors instead of bucketing each dimension.
    pub is_embedding: bool,
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for BucketingConfig {
    fn default() -> Self {
        Self {
            num_buckets: defaults::DEFAULT_NUM_BUCKETS,
            is_embedding: false,
            seed: defaults::DEFAULT_KMEANS_SEED,
            max_iterations: defaults::DEFAULT_KMEANS_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BucketKind {
    /// One set of quantile bins per dimension.
    Scalar(Vec<ScalarBuckets>),
    Categorical(CategoricalBuckets),
    Embedding(KMeansModel),
}

/// The fitted artifact a data-drift monitor keeps for its whole lifetime.
///
/// A model has one or more channels. Scalar features get one channel per
/// dimension; categorical and embedding features have a single channel.
/// Each channel owns a reference distribution over its buckets.
#[derive(Debug, Clone)]
pub struct BucketModel {
    kind: BucketKind,
    reference_distribution: Vec<Vec<f64>>,
}

impl BucketModel {
    /// Fit on the reference population. All data must be of one kind.
    pub fn fit(reference: &[Datum], config: &BucketingConfig) -> DriftwatchResult<Self> {
        if reference.is_empty() {
            return Err(DriftwatchError::invalid_value(
                "reference dataset",
                "cannot fit buckets on an empty population",
            ));
        }
        if config.num_buckets == 0 {
            return Err(DriftwatchError::invalid_value(
                "num_buckets",
                "must be at least 1",
            ));
        }

        let kind = if reference.iter().all(Datum::is_text) {
            let labels: Vec<String> = reference.iter().map(Datum::label).collect();
            BucketKind::Categorical(CategoricalBuckets::fit(&labels))
        } else {
            let points = FeatureVector::from_data(reference, "reference dataset")?;
            if config.is_embedding {
                BucketKind::Embedding(KMeansModel::fit(
                    &points,
                    config.num_buckets,
                    config.seed,
                    config.max_iterations,
                )?)
            } else {
                let per_dim = (0..points.dims())
                    .map(|d| ScalarBuckets::fit(&points.column(d), config.num_buckets))
                    .collect::<DriftwatchResult<Vec<_>>>()?;
                BucketKind::Scalar(per_dim)
            }
        };

        let mut model = Self {
            reference_distribution: Vec::new(),
            kind,
        };
        let mut counts: Vec<Vec<f64>> = model.bucket_counts().into_iter().map(|n| vec![0.0; n]).collect();
        for datum in reference {
            for (channel, bucket) in model.assign(datum)?.into_iter().enumerate() {
                counts[channel][bucket] += 1.0;
            }
        }
        let total = reference.len() as f64;
        model.reference_distribution = counts
            .into_iter()
            .map(|c| c.into_iter().map(|x| x / total).collect())
            .collect();
        Ok(model)
    }

    pub fn kind(&self) -> &BucketKind {
        &self.kind
    }

    pub fn is_embedding(&self) -> bool {
        matches!(self.kind, BucketKind::Embedding(_))
    }

    pub fn channels(&self) -> usize {
        match &self.kind {
            BucketKind::Scalar(dims) => dims.len(),
            BucketKind::Categorical(_) | BucketKind::Embedding(_) => 1,
        }
    }

    /// Number of buckets per channel.
    pub fn bucket_counts(&self) -> Vec<usize> {
        match &self.kind {
            BucketKind::Scalar(dims) => dims.iter().map(ScalarBuckets::len).collect(),
            BucketKind::Categorical(c) => vec![c.len()],
            BucketKind::Embedding(k) => vec![k.clusters().len()],
        }
    }

    /// Normalised reference counts, one vector per channel.
    pub fn reference_distribution(&self) -> &[Vec<f64>] {
        &self.reference_distribution
    }

    pub fn clusters(&self, channel: usize) -> Vec<Cluster> {
        match &self.kind {
            BucketKind::Scalar(dims) => dims.get(channel).map(|d| d.clusters().to_vec()).unwrap_or_default(),
            BucketKind::Categorical(c) => c.clusters(),
            BucketKind::Embedding(k) => k.clusters().to_vec(),
        }
    }

    /// Per-dimension normalisation constants (embedding mode only).
    pub fn max_abs_per_dim(&self) -> Option<&[f64]> {
        match &self.kind {
            BucketKind::Embedding(k) => Some(k.max_abs_per_dim()),
            _ => None,
        }
    }

    /// Bucket index per channel. Unseen categories grow the model (and the
    /// reference distribution, with probability 0).
    pub fn assign(&mut self, datum: &Datum) -> DriftwatchResult<Vec<usize>> {
        match &mut self.kind {
            BucketKind::Categorical(c) => {
                let label = datum.label();
                let before = c.len();
                let bucket = c.assign(&label);
                if c.len() > before {
                    if let Some(reference) = self.reference_distribution.first_mut() {
                        reference.push(0.0);
                    }
                }
                Ok(vec![bucket])
            }
            BucketKind::Scalar(dims) => {
                let point = datum.to_vector("bucket assignment")?;
                check_dims(point.len(), dims.len())?;
                Ok(dims.iter().zip(&point).map(|(d, v)| d.assign(*v)).collect())
            }
            BucketKind::Embedding(k) => {
                let point = datum.to_vector("bucket assignment")?;
                check_dims(point.len(), k.dims())?;
                Ok(vec![k.assign(&point)])
            }
        }
    }

    /// Distance from the assigned bucket divided by that bucket's spread,
    /// maximised over channels. Categorical models always score 0.
    pub fn outlier_score(&self, datum: &Datum, assignment: &[usize]) -> DriftwatchResult<f64> {
        match &self.kind {
            BucketKind::Categorical(_) => Ok(0.0),
            BucketKind::Scalar(dims) => {
                let point = datum.to_vector("outlier score")?;
                Ok(dims
                    .iter()
                    .zip(&point)
                    .zip(assignment)
                    .map(|((d, v), b)| d.outlier_score(*v, *b))
                    .fold(0.0, f64::max))
            }
            BucketKind::Embedding(k) => {
                let point = datum.to_vector("outlier score")?;
                Ok(assignment
                    .first()
                    .map(|b| k.outlier_score(&point, *b))
                    .unwrap_or_default())
            }
        }
    }
}

fn check_dims(got: usize, expected: usize) -> DriftwatchResult<()> {
    if got != expected {
        return Err(DriftwatchError::Shape {
            base: (1, got),
            reference: (1, expected),
        });
    }
    Ok(())
}

/// Spread-normalised distance. A zero spread only tolerates exact hits.
pub(crate) fn spread_ratio(distance: f64, spread: f64) -> f64 {
    if spread > 0.0 {
        distance / spread
    } else if distance > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}
