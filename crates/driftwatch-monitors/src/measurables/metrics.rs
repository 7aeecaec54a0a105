//! Measurables derived from the output and the ground truth.

use serde_json::Value;

use driftwatch_core::config::{ConditionArgs, ConditionFormula};
use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{Batch, Datum, Record};
use driftwatch_core::traits::IMeasurable;

use super::fields::{lookup, FieldMeasurable};

fn output_and_truth<'a>(output: Option<&'a Value>, truth: Option<&'a Value>, row: &str) -> DriftwatchResult<(&'a Value, &'a Value)> {
    let output = output.ok_or_else(|| DriftwatchError::missing_field("output", row))?;
    let truth = truth.ok_or_else(|| DriftwatchError::missing_field("ground_truth", row))?;
    Ok((output, truth))
}

fn record_pair(record: &Record) -> DriftwatchResult<(&Value, &Value)> {
    Ok((
        lookup(record, "output", "reference record")?,
        lookup(record, "ground_truth", "reference record")?,
    ))
}

/// Numbers compare by value (`1 == 1.0`), everything else structurally.
fn values_match(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn numeric(value: &Value, context: &str) -> DriftwatchResult<f64> {
    Datum::from_json(value, context)?
        .as_f64()
        .ok_or_else(|| DriftwatchError::invalid_value(context, "expected a scalar"))
}

/// `output == ground_truth`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl IMeasurable for Accuracy {
    fn name(&self) -> String {
        "accuracy".to_string()
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        batch
            .iter()
            .map(|row| {
                let (o, t) = output_and_truth(row.output.as_ref(), row.ground_truth.as_ref(), &row.id)?;
                Ok(Datum::Bool(values_match(o, t)))
            })
            .collect()
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        let (o, t) = record_pair(record)?;
        Ok(Datum::Bool(values_match(o, t)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `|output - truth|`
    Absolute,
    /// `|output - truth| / |truth|`
    AbsolutePercentage,
}

/// Per-row regression error.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMetric {
    kind: ErrorKind,
}

impl ErrorMetric {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    fn error(&self, output: &Value, truth: &Value) -> DriftwatchResult<Datum> {
        let name = self.name();
        let o = numeric(output, &name)?;
        let t = numeric(truth, &name)?;
        match self.kind {
            ErrorKind::Absolute => Ok(Datum::Scalar((o - t).abs())),
            ErrorKind::AbsolutePercentage if t == 0.0 => Err(DriftwatchError::invalid_value(
                name,
                "percentage error is undefined for a zero ground truth",
            )),
            ErrorKind::AbsolutePercentage => Ok(Datum::Scalar(((o - t) / t).abs())),
        }
    }
}

impl IMeasurable for ErrorMetric {
    fn name(&self) -> String {
        match self.kind {
            ErrorKind::Absolute => "mae".to_string(),
            ErrorKind::AbsolutePercentage => "mape".to_string(),
        }
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        batch
            .iter()
            .map(|row| {
                let (o, t) = output_and_truth(row.output.as_ref(), row.ground_truth.as_ref(), &row.id)?;
                self.error(o, t)
            })
            .collect()
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        let (o, t) = record_pair(record)?;
        self.error(o, t)
    }
}

/// A boolean from comparing a field against a threshold.
#[derive(Debug, Clone)]
pub struct ConditionMeasurable {
    field: FieldMeasurable,
    formula: ConditionFormula,
    threshold: f64,
}

impl ConditionMeasurable {
    pub fn new(field: FieldMeasurable, args: ConditionArgs) -> Self {
        Self {
            field,
            formula: args.formulae,
            threshold: args.threshold,
        }
    }

    fn test(&self, datum: Datum) -> DriftwatchResult<Datum> {
        let value = datum
            .as_f64()
            .ok_or_else(|| DriftwatchError::invalid_value(self.name(), "condition needs a scalar"))?;
        Ok(Datum::Bool(self.formula.apply(value, self.threshold)))
    }
}

impl IMeasurable for ConditionMeasurable {
    fn name(&self) -> String {
        format!("condition_{}", self.field.name())
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        batch
            .iter()
            .map(|row| self.test(self.field.row_datum(row)?))
            .collect()
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        self.test(self.field.extract(record)?)
    }
}
