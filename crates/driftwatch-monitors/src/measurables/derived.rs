//! Measurables computed from other measurables.

use std::fmt;
use std::sync::Arc;

use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{Batch, Datum, FeatureVector, Record};
use driftwatch_core::traits::{IDistance, IMeasurable};

use super::fields::FieldSource;

/// One coordinate of an embedding input.
#[derive(Debug, Clone)]
pub struct ScalarFromEmbedding {
    source: FieldSource,
    idx: usize,
}

impl ScalarFromEmbedding {
    pub fn new(source: FieldSource, idx: usize) -> Self {
        Self { source, idx }
    }

    fn pick(&self, datum: Datum) -> DriftwatchResult<Datum> {
        let name = self.name();
        let vector = datum.to_vector(&name)?;
        vector
            .get(self.idx)
            .copied()
            .map(Datum::Scalar)
            .ok_or_else(|| DriftwatchError::Shape {
                base: (1, vector.len()),
                reference: (1, self.idx + 1),
            })
    }
}

impl IMeasurable for ScalarFromEmbedding {
    fn name(&self) -> String {
        format!("{}_{}", self.source.name(), self.idx)
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        let name = self.source.name();
        batch
            .iter()
            .map(|row| self.pick(Datum::from_json(self.source.value(row)?, &name)?))
            .collect()
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        let name = self.source.name();
        self.pick(Datum::from_json(self.source.record_value(record)?, &name)?)
    }
}

/// Row-wise distance between two other measurables.
pub struct DistanceMeasurable {
    base: Arc<dyn IMeasurable>,
    reference: Arc<dyn IMeasurable>,
    distance: Arc<dyn IDistance>,
}

impl DistanceMeasurable {
    pub fn new(
        base: Arc<dyn IMeasurable>,
        reference: Arc<dyn IMeasurable>,
        distance: Arc<dyn IDistance>,
    ) -> Self {
        Self {
            base,
            reference,
            distance,
        }
    }
}

impl IMeasurable for DistanceMeasurable {
    fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.distance.name(),
            self.base.name(),
            self.reference.name()
        )
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        let name = self.name();
        let base = FeatureVector::from_data(&self.base.compute(batch)?, &name)?;
        let reference = FeatureVector::from_data(&self.reference.compute(batch)?, &name)?;
        Ok(self
            .distance
            .distance(&base, &reference)?
            .into_iter()
            .map(Datum::Scalar)
            .collect())
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        let name = self.name();
        let base = FeatureVector::single(self.base.extract(record)?.to_vector(&name)?);
        let reference = FeatureVector::single(self.reference.extract(record)?.to_vector(&name)?);
        let d = self.distance.distance(&base, &reference)?;
        Ok(Datum::Scalar(d.first().copied().unwrap_or_default()))
    }
}

impl fmt::Debug for DistanceMeasurable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistanceMeasurable")
            .field("name", &self.name())
            .finish()
    }
}
