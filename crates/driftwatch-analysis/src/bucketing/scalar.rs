use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};

use super::{spread_ratio, Cluster};

/// Equal-count quantile bins over one dimension.
#[derive(Debug, Clone)]
pub struct ScalarBuckets {
    /// First value of bins 1..k, ascending.
    boundaries: Vec<f64>,
    clusters: Vec<Cluster>,
}

impl ScalarBuckets {
    /// Split the sorted sample into `k` bins of (nearly) equal size.
    /// Fewer values than `k` yields one bin per value.
    pub fn fit(values: &[f64], k: usize) -> DriftwatchResult<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DriftwatchError::invalid_value(
                "scalar bucketing",
                "reference contains non-finite values",
            ));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let k = k.min(n).max(1);

        let mut boundaries = Vec::with_capacity(k.saturating_sub(1));
        let mut clusters = Vec::with_capacity(k);
        for bin in 0..k {
            let start = bin * n / k;
            let end = (bin + 1) * n / k;
            let members = &sorted[start..end];
            if bin > 0 {
                boundaries.push(members[0]);
            }
            let count = members.len();
            let mean = members.iter().sum::<f64>() / count as f64;
            let variance = members.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
            clusters.push(Cluster {
                centroid: vec![mean],
                spread: variance,
                count,
            });
        }
        Ok(Self {
            boundaries,
            clusters,
        })
    }

    /// Number of boundaries `<= value`.
    pub fn assign(&self, value: f64) -> usize {
        self.boundaries.partition_point(|b| *b <= value)
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub(crate) fn outlier_score(&self, value: f64, bucket: usize) -> f64 {
        self.clusters
            .get(bucket)
            .map(|c| spread_ratio((value - c.centroid[0]).abs(), c.spread))
            .unwrap_or_default()
    }
}
