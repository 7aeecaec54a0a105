use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::FeatureVector;
use driftwatch_core::traits::IDistance;

use super::check_shapes;

/// Number of positions where two 0/1 rows differ, optionally divided by dims.
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingDistance {
    pub normalize: bool,
}

impl HammingDistance {
    pub fn normalized() -> Self {
        Self { normalize: true }
    }
}

fn is_binary(x: f64) -> bool {
    x == 0.0 || x == 1.0
}

impl IDistance for HammingDistance {
    fn name(&self) -> &'static str {
        "hamming_distance"
    }

    fn distance(&self, base: &FeatureVector, reference: &FeatureVector) -> DriftwatchResult<Vec<f64>> {
        check_shapes(base, reference)?;
        if !base.as_slice().iter().chain(reference.as_slice()).copied().all(is_binary) {
            return Err(DriftwatchError::invalid_value(
                "hamming distance",
                "inputs must be binary (0 or 1)",
            ));
        }
        let dims = base.dims().max(1) as f64;
        Ok(base
            .rows()
            .zip(reference.rows())
            .map(|(b, r)| {
                let differing = b.iter().zip(r).filter(|(x, y)| x != y).count() as f64;
                if self.normalize {
                    differing / dims
                } else {
                    differing
                }
            })
            .collect())
    }
}
