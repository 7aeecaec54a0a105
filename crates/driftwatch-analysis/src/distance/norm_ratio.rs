use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::FeatureVector;
use driftwatch_core::traits::IDistance;

use super::{check_shapes, norm};

/// `‖b‖ / max(‖r‖, epsilon)`.
#[derive(Debug, Clone, Copy)]
pub struct NormRatio {
    epsilon: f64,
}

impl NormRatio {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn between(&self, base: &[f64], reference: &[f64]) -> f64 {
        norm(base) / norm(reference).max(self.epsilon)
    }
}

impl IDistance for NormRatio {
    fn name(&self) -> &'static str {
        "norm_ratio"
    }

    fn distance(&self, base: &FeatureVector, reference: &FeatureVector) -> DriftwatchResult<Vec<f64>> {
        check_shapes(base, reference)?;
        Ok(base
            .rows()
            .zip(reference.rows())
            .map(|(b, r)| self.between(b, r))
            .collect())
    }
}
