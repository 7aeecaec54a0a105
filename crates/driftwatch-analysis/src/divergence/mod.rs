//! Divergence between a production distribution and a reference distribution
//! over the same bucket set.

mod psi;
mod transport;

pub use psi::population_stability_index;
pub use transport::{centroid_cost_matrix, transport_cost};

use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};

pub(crate) fn check_lengths(production: &[f64], reference: &[f64]) -> DriftwatchResult<()> {
    if production.len() != reference.len() {
        return Err(DriftwatchError::Shape {
            base: (1, production.len()),
            reference: (1, reference.len()),
        });
    }
    Ok(())
}
