//! Row-wise distance strategies.

mod cosine;
mod hamming;
mod l2;
mod norm_ratio;

pub use cosine::CosineDistance;
pub use hamming::HammingDistance;
pub use l2::L2Distance;
pub use norm_ratio::NormRatio;

use std::sync::Arc;

use driftwatch_core::config::defaults;
use driftwatch_core::config::DistanceType;
use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::FeatureVector;
use driftwatch_core::traits::IDistance;

/// Resolve a configured distance type into its strategy.
pub fn resolve_distance(distance_type: DistanceType) -> Arc<dyn IDistance> {
    match distance_type {
        DistanceType::CosineDistance => Arc::new(CosineDistance),
        DistanceType::L2Distance => Arc::new(L2Distance),
        DistanceType::NormRatio => Arc::new(NormRatio::new(defaults::DEFAULT_NORM_RATIO_EPSILON)),
        DistanceType::HammingDistance => Arc::new(HammingDistance::default()),
    }
}

/// Distance between two single rows.
pub fn row_distance(distance: &dyn IDistance, base: &[f64], reference: &[f64]) -> DriftwatchResult<f64> {
    let d = distance.distance(
        &FeatureVector::single(base.to_vec()),
        &FeatureVector::single(reference.to_vec()),
    )?;
    Ok(d.first().copied().unwrap_or_default())
}

pub(crate) fn check_shapes(base: &FeatureVector, reference: &FeatureVector) -> DriftwatchResult<()> {
    if base.shape() != reference.shape() {
        return Err(DriftwatchError::Shape {
            base: base.shape(),
            reference: reference.shape(),
        });
    }
    Ok(())
}

pub(crate) fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
