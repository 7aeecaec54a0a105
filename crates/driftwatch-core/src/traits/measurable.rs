use crate::errors::DriftwatchResult;
use crate::models::{Batch, Datum, Record};

/// Extracts (or derives) one value per row.
pub trait IMeasurable: Send + Sync {
    /// Column name used in plot names and labels.
    fn name(&self) -> String;

    /// One datum per row of `batch`, in row order.
    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>>;

    /// Same measurement applied to a flat reference-dataset record.
    fn extract(&self, record: &Record) -> DriftwatchResult<Datum>;
}

impl std::fmt::Debug for dyn IMeasurable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IMeasurable").field("name", &self.name()).finish()
    }
}
