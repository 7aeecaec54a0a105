use driftwatch_core::errors::DriftwatchResult;

use super::check_lengths;

/// Population Stability Index: `Σ (p_i - q_i) * ln(max(p_i, ε) / max(q_i, ε))`.
///
/// Zero for identical distributions and never negative: each term's log has
/// the sign of `p_i - q_i` (or is zero when both sit below `epsilon`).
pub fn population_stability_index(
    production: &[f64],
    reference: &[f64],
    epsilon: f64,
) -> DriftwatchResult<f64> {
    check_lengths(production, reference)?;
    Ok(production
        .iter()
        .zip(reference)
        .map(|(p, q)| (p - q) * (p.max(epsilon) / q.max(epsilon)).ln())
        .sum())
}
