use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::FeatureVector;
use driftwatch_core::traits::IDistance;

use super::{check_shapes, norm};

/// `1 - cos(b, r)`. A zero-norm row is maximally distant (1.0).
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDistance;

impl CosineDistance {
    pub fn between(base: &[f64], reference: &[f64]) -> f64 {
        let denom = norm(base) * norm(reference);
        if denom == 0.0 {
            return 1.0;
        }
        let dot: f64 = base.iter().zip(reference).map(|(a, b)| a * b).sum();
        1.0 - dot / denom
    }
}

impl IDistance for CosineDistance {
    fn name(&self) -> &'static str {
        "cosine_distance"
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
