//! Measurables that read a field straight off the row.

use serde_json::Value;

use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{Batch, Datum, Record, Row};
use driftwatch_core::traits::IMeasurable;

/// Where a field lives on a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    Input(String),
    /// The whole output, or one field of an object output.
    Output(Option<String>),
    GroundTruth,
    Extra(String),
}

impl FieldSource {
    pub fn name(&self) -> String {
        match self {
            Self::Input(f) | Self::Extra(f) | Self::Output(Some(f)) => f.clone(),
            Self::Output(None) => "prediction".to_string(),
            Self::GroundTruth => "ground_truth".to_string(),
        }
    }

    /// The raw JSON value on `row`.
    pub fn value<'a>(&self, row: &'a Row) -> DriftwatchResult<&'a Value> {
        match self {
            Self::Input(field) => lookup(&row.inputs, field, "inputs"),
            Self::Extra(field) => lookup(&row.extra, field, "extra"),
            Self::GroundTruth => row
                .ground_truth
                .as_ref()
                .ok_or_else(|| DriftwatchError::missing_field("ground_truth", format!("row {}", row.id))),
            Self::Output(field) => {
                let output = row
                    .output
                    .as_ref()
                    .ok_or_else(|| DriftwatchError::missing_field("output", format!("row {}", row.id)))?;
                match field {
                    None => Ok(output),
                    Some(f) => match output {
                        Value::Object(map) => lookup(map, f, "output"),
                        _ => Err(DriftwatchError::missing_field(f.as_str(), "output")),
                    },
                }
            }
        }
    }

    /// The same field on a flat reference record. Outputs and ground
    /// truths are stored under `output` and `ground_truth`.
    pub fn record_value<'a>(&self, record: &'a Record) -> DriftwatchResult<&'a Value> {
        match self {
            Self::Input(field) | Self::Extra(field) | Self::Output(Some(field)) => {
                lookup(record, field, "reference record")
            }
            Self::Output(None) => lookup(record, "output", "reference record"),
            Self::GroundTruth => lookup(record, "ground_truth", "reference record"),
        }
    }
}

pub(crate) fn lookup<'a>(record: &'a Record, field: &str, section: &str) -> DriftwatchResult<&'a Value> {
    record
        .get(field)
        .ok_or_else(|| DriftwatchError::missing_field(field, section))
}

/// One field converted to a [`Datum`].
#[derive(Debug, Clone)]
pub struct FieldMeasurable {
    source: FieldSource,
}

impl FieldMeasurable {
    pub fn new(source: FieldSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &FieldSource {
        &self.source
    }

    pub(crate) fn row_datum(&self, row: &Row) -> DriftwatchResult<Datum> {
        Datum::from_json(self.source.value(row)?, &self.source.name())
    }
}

impl IMeasurable for FieldMeasurable {
    fn name(&self) -> String {
        self.source.name()
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        batch.iter().map(|row| self.row_datum(row)).collect()
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        Datum::from_json(self.source.record_value(record)?, &self.source.name())
    }
}

/// Several numeric inputs concatenated into one vector.
#[derive(Debug, Clone)]
pub struct FeatureConcat {
    features: Vec<String>,
}

impl FeatureConcat {
    pub fn new(features: Vec<String>) -> Self {
        Self { features }
    }

    fn concat(&self, record: &Record, section: &str) -> DriftwatchResult<Datum> {
        let mut out = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let datum = Datum::from_json(lookup(record, feature, section)?, feature)?;
            out.extend(datum.to_vector(feature)?);
        }
        Ok(Datum::Vector(out))
    }
}

impl IMeasurable for FeatureConcat {
    fn name(&self) -> String {
        self.features.join("_")
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        batch.iter().map(|row| self.concat(&row.inputs, "inputs")).collect()
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        self.concat(record, "reference record")
    }
}
