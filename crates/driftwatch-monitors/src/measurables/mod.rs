//! Measurables: named extraction (or derivation) of one value per row.
//!
//! Every [`MeasurableArgs`] variant resolves once, at check build time, into
//! an `Arc<dyn IMeasurable>`. Per-row work never looks at the config again.

mod cached;
mod derived;
mod fields;
mod metrics;
mod registry;

pub use cached::CachedMeasurable;
pub use derived::{DistanceMeasurable, ScalarFromEmbedding};
pub use fields::{FeatureConcat, FieldMeasurable, FieldSource};
pub use metrics::{Accuracy, ConditionMeasurable, ErrorKind, ErrorMetric};
pub use registry::MeasurableRegistry;

use std::sync::Arc;

use driftwatch_analysis::resolve_distance;
use driftwatch_core::config::MeasurableArgs;
use driftwatch_core::errors::{ConfigError, DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{Batch, Datum};
use driftwatch_core::traits::IMeasurable;

/// Resolve a measurable config into its implementation. Custom measurables
/// are looked up in `registry`.
pub fn resolve_measurable(
    args: &MeasurableArgs,
    registry: &MeasurableRegistry,
) -> DriftwatchResult<Arc<dyn IMeasurable>> {
    let measurable: Arc<dyn IMeasurable> = match args {
        MeasurableArgs::InputFeature { feature_name } => {
            Arc::new(FieldMeasurable::new(FieldSource::Input(feature_name.clone())))
        }
        MeasurableArgs::Prediction { feature_name } => {
            Arc::new(FieldMeasurable::new(FieldSource::Output(feature_name.clone())))
        }
        MeasurableArgs::GroundTruth => Arc::new(FieldMeasurable::new(FieldSource::GroundTruth)),
        MeasurableArgs::Extra { field } => {
            Arc::new(FieldMeasurable::new(FieldSource::Extra(field.clone())))
        }
        MeasurableArgs::FeatureConcat { feat_name_list } => {
            if feat_name_list.is_empty() {
                return Err(ConfigError::MissingArgument {
                    argument: "feat_name_list".to_string(),
                    context: "feature_concat".to_string(),
                }
                .into());
            }
            Arc::new(FeatureConcat::new(feat_name_list.clone()))
        }
        MeasurableArgs::Accuracy => Arc::new(Accuracy),
        MeasurableArgs::Mae => Arc::new(ErrorMetric::new(ErrorKind::Absolute)),
        MeasurableArgs::Mape => Arc::new(ErrorMetric::new(ErrorKind::AbsolutePercentage)),
        MeasurableArgs::ConditionOnInput {
            feature_name,
            condition_args,
        } => Arc::new(ConditionMeasurable::new(
            FieldMeasurable::new(FieldSource::Input(feature_name.clone())),
            condition_args.clone(),
        )),
        MeasurableArgs::ConditionOnPrediction {
            feature_name,
            condition_args,
        } => Arc::new(ConditionMeasurable::new(
            FieldMeasurable::new(FieldSource::Output(feature_name.clone())),
            condition_args.clone(),
        )),
        MeasurableArgs::ScalarFromEmbedding { idx, extract_from } => Arc::new(
            ScalarFromEmbedding::new(FieldSource::Input(extract_from.feature_name.clone()), *idx),
        ),
        MeasurableArgs::Distance {
            base,
            reference,
            distance_types,
        } => {
            let distance_type = distance_types.first().copied().ok_or_else(|| {
                ConfigError::MissingArgument {
                    argument: "distance_types".to_string(),
                    context: "distance measurable".to_string(),
                }
            })?;
            Arc::new(DistanceMeasurable::new(
                resolve_measurable(base, registry)?,
                resolve_measurable(reference, registry)?,
                resolve_distance(distance_type),
            ))
        }
        MeasurableArgs::Custom { name } => registry
            .get(name)
            .ok_or_else(|| ConfigError::unknown("custom measurable", name))?,
        MeasurableArgs::Cached {
            measurable_args,
            max_capacity,
        } => Arc::new(CachedMeasurable::new(
            resolve_measurable(measurable_args, registry)?,
            *max_capacity,
        )),
    };
    Ok(measurable)
}

/// Compute with per-row failure isolation.
///
/// Batch-level errors (a missing field, a cache failure) propagate. When the
/// batch fails with a row-level error, each row is recomputed on its own so
/// only the offending rows carry the error.
pub fn compute_rows(
    measurable: &dyn IMeasurable,
    batch: &Batch,
) -> DriftwatchResult<Vec<DriftwatchResult<Datum>>> {
    match measurable.compute(batch) {
        Ok(data) => Ok(data.into_iter().map(Ok).collect()),
        Err(e) if e.is_row_level() => batch
            .iter()
            .map(|row| {
                match measurable.compute(&Batch::new(vec![row.clone()])) {
                    Ok(mut data) => Ok(data.pop().ok_or_else(|| {
                        DriftwatchError::invalid_value(measurable.name(), "no value computed for row")
                    })),
                    Err(e) if e.is_row_level() => Ok(Err(e)),
                    Err(e) => Err(e),
                }
            })
            .collect(),
        Err(e) => Err(e),
    }
}
