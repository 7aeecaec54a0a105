use serde::Serialize;

use driftwatch_core::errors::DriftwatchError;
use driftwatch_observability::tracing_setup::events;

/// A row left out of a batch because of a row-level failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row_id: String,
    pub reason: String,
}

impl SkippedRow {
    /// Log the skip and build its record.
    pub(crate) fn record(check: &str, row_id: &str, error: &DriftwatchError) -> Self {
        let reason = error.to_string();
        events::row_skipped(check, row_id, &reason);
        Self {
            row_id: row_id.to_string(),
            reason,
        }
    }
}
