//! Reference dataset loading: a JSON array of flat records, read once.

use std::path::Path;

use serde_json::Value;

use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{Datum, Record};
use driftwatch_core::traits::IMeasurable;

pub fn load_reference_records(path: &Path) -> DriftwatchResult<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|e| DriftwatchError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_reference_records(&content)
}

pub fn parse_reference_records(content: &str) -> DriftwatchResult<Vec<Record>> {
    let values: Vec<Value> = serde_json::from_str(content)?;
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(record) => Ok(record),
            other => Err(DriftwatchError::invalid_value(
                "reference dataset",
                format!("record {i} is not an object: {other}"),
            )),
        })
        .collect()
}

/// Apply `measurable` to every reference record.
pub fn extract_reference(measurable: &dyn IMeasurable, records: &[Record]) -> DriftwatchResult<Vec<Datum>> {
    records.iter().map(|r| measurable.extract(r)).collect()
}
