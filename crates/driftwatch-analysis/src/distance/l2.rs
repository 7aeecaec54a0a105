use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::FeatureVector;
use driftwatch_core::traits::IDistance;

use super::check_shapes;

/// Sum of squared elementwise differences per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct L2Distance;

impl L2Distance {
    pub fn between(base: &[f64], reference: &[f64]) -> f64 {
        base.iter()
            .zip(reference)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl IDistance for L2Distance {
    fn name(&self) -> &'static str {
        "l2_distance"
    }

    fn distance(&self, base: &FeatureVector, reference: &FeatureVector) -> DriftwatchResult<Vec<f64>> {
        check_shapes(base, reference)?;
        Ok(base
            .rows()
            .zip(reference.rows())
            .map(|(b, r)| Self::between(b, r))
            .collect())
    }
}
