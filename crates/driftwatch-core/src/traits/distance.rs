use crate::errors::DriftwatchResult;
use crate::models::FeatureVector;

/// Row-wise distance between two equally shaped feature vectors.
pub trait IDistance: Send + Sync {
    /// Name used in plot and series names.
    fn name(&self) -> &'static str;

    /// One scalar per row. Fails with `Shape` when the shapes differ.
    fn distance(&self, base: &FeatureVector, reference: &FeatureVector)
        -> DriftwatchResult<Vec<f64>>;
}
