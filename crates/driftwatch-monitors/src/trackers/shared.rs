use std::sync::Arc;

use driftwatch_analysis::{resolve_distance, row_distance};
use driftwatch_cache::CacheHandle;
use driftwatch_core::config::{DistanceType, ReferenceMode, TrackerArgs};
use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{AggregateKey, Batch, Datum};
use driftwatch_core::traits::{IDistance, IMeasurable, Labels};

use super::{StateOverlay, TrackerStats, COUNT_COLUMN};
use crate::context::MonitorContext;
use crate::measurables::{compute_rows, resolve_measurable};
use crate::report::SkippedRow;

struct LabelFilter {
    name: String,
    measurable: Arc<dyn IMeasurable>,
    /// Rendered with `Datum::label`. Empty allows every value.
    allowed: Vec<String>,
}

/// One row that passed the label filters, with everything a tracker needs.
#[derive(Debug, Clone)]
pub(crate) struct TrackedRow {
    pub row_id: String,
    pub key: AggregateKey,
    pub count: u64,
    pub value: Vec<f64>,
    /// `model_<name>` and `feature_<name>` tags.
    pub labels: Labels,
    /// Cache namespace suffix for the row's label combination. Empty when
    /// the tracker has no label measurables.
    pub partition: String,
}

type RowResults = std::vec::IntoIter<DriftwatchResult<Datum>>;

pub(crate) struct TrackerCore {
    pub name: String,
    value: Arc<dyn IMeasurable>,
    aggregate: Arc<dyn IMeasurable>,
    counter: Arc<dyn IMeasurable>,
    labels: Vec<LabelFilter>,
    annotations: Vec<Arc<dyn IMeasurable>>,
    pub distances: Vec<(DistanceType, Arc<dyn IDistance>)>,
    pub reference: ReferenceMode,
    handle: CacheHandle,
}

impl TrackerCore {
    pub fn new(kind: &str, args: &TrackerArgs, ctx: &MonitorContext) -> DriftwatchResult<Self> {
        let labels = args
            .model_args
            .iter()
            .map(|label| {
                let measurable = resolve_measurable(&label.measurable_args, &ctx.registry)?;
                let allowed = label
                    .allowed_values
                    .iter()
                    .map(|v| Datum::from_json(v, "allowed_values").map(|d| d.label()))
                    .collect::<DriftwatchResult<Vec<_>>>()?;
                Ok(LabelFilter {
                    name: measurable.name(),
                    measurable,
                    allowed,
                })
            })
            .collect::<DriftwatchResult<Vec<_>>>()?;
        let annotations = args
            .feature_args
            .iter()
            .map(|a| resolve_measurable(a, &ctx.registry))
            .collect::<DriftwatchResult<Vec<_>>>()?;

        Ok(Self {
            name: args.name.clone(),
            value: resolve_measurable(&args.measurable_args, &ctx.registry)?,
            aggregate: resolve_measurable(&args.aggregate_args, &ctx.registry)?,
            counter: resolve_measurable(&args.count_args, &ctx.registry)?,
            labels,
            annotations,
            distances: args
                .distance_types
                .iter()
                .map(|t| (*t, resolve_distance(*t)))
                .collect(),
            reference: args.reference,
            handle: ctx.cache_handle(&format!("{kind}/{}", args.name)),
        })
    }

    /// Cache handle for one label partition.
    pub fn handle(&self, partition: &str) -> CacheHandle {
        if partition.is_empty() {
            self.handle.clone()
        } else {
            self.handle.child(partition)
        }
    }

    /// Measure every row, drop rows outside the allow-lists, and record
    /// row-level failures in `stats`.
    pub fn rows(&self, batch: &Batch, stats: &mut TrackerStats) -> DriftwatchResult<Vec<TrackedRow>> {
        let mut values = compute_rows(self.value.as_ref(), batch)?.into_iter();
        let mut ids = compute_rows(self.aggregate.as_ref(), batch)?.into_iter();
        let mut counts = compute_rows(self.counter.as_ref(), batch)?.into_iter();
        let mut labels = self
            .labels
            .iter()
            .map(|l| compute_rows(l.measurable.as_ref(), batch).map(Vec::into_iter))
            .collect::<DriftwatchResult<Vec<RowResults>>>()?;
        let mut annotations = self
            .annotations
            .iter()
            .map(|a| compute_rows(a.as_ref(), batch).map(Vec::into_iter))
            .collect::<DriftwatchResult<Vec<RowResults>>>()?;

        let mut out = Vec::with_capacity(batch.len());
        for row in batch.iter() {
            let label_data: Vec<DriftwatchResult<Datum>> = labels.iter_mut().map(next_datum).collect();
            let annotation_data: Vec<DriftwatchResult<Datum>> =
                annotations.iter_mut().map(next_datum).collect();
            let tracked = self.track_row(
                &row.id,
                next_datum(&mut values),
                next_datum(&mut ids),
                next_datum(&mut counts),
                label_data,
                annotation_data,
            );
            match tracked {
                Ok(Some(r)) => out.push(r),
                Ok(None) => stats.filtered += 1,
                Err(e) if e.is_row_level() => stats.skipped.push(SkippedRow::record(&self.name, &row.id, &e)),
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    fn track_row(
        &self,
        row_id: &str,
        value: DriftwatchResult<Datum>,
        id: DriftwatchResult<Datum>,
        count: DriftwatchResult<Datum>,
        label_data: Vec<DriftwatchResult<Datum>>,
        annotation_data: Vec<DriftwatchResult<Datum>>,
    ) -> DriftwatchResult<Option<TrackedRow>> {
        let mut labels = Labels::new();
        let mut partition = Vec::with_capacity(self.labels.len());
        for (filter, datum) in self.labels.iter().zip(label_data) {
            let label = datum?.label();
            if !filter.allowed.is_empty() && !filter.allowed.contains(&label) {
                return Ok(None);
            }
            partition.push(format!("model_{}={label}", filter.name));
            labels.insert(format!("model_{}", filter.name), label);
        }
        for (annotation, datum) in self.annotations.iter().zip(annotation_data) {
            labels.insert(format!("feature_{}", annotation.name()), datum?.label());
        }

        let value = value?.to_vector(&self.value.name())?;
        if value.iter().any(|x| !x.is_finite()) {
            return Err(DriftwatchError::invalid_value(self.value.name(), "non-finite value"));
        }
        Ok(Some(TrackedRow {
            row_id: row_id.to_string(),
            key: AggregateKey::from_datum(&id?)?,
            count: to_count(&count?)?,
            value,
            labels,
            partition: partition.join(","),
        }))
    }

    /// One distance per configured type, in config order.
    pub fn distances_between(&self, current: &[f64], reference: &[f64]) -> DriftwatchResult<Vec<(DistanceType, f64)>> {
        self.distances
            .iter()
            .map(|(t, d)| Ok((*t, row_distance(d.as_ref(), current, reference)?)))
            .collect()
    }
}

fn next_datum(iter: &mut RowResults) -> DriftwatchResult<Datum> {
    iter.next()
        .unwrap_or_else(|| Err(DriftwatchError::invalid_value("measurable", "fewer values than rows")))
}

fn to_count(datum: &Datum) -> DriftwatchResult<u64> {
    match datum.as_f64() {
        Some(x) if x.is_finite() && x >= 0.0 && x.fract() == 0.0 => Ok(x as u64),
        _ => Err(DriftwatchError::invalid_value(
            "count",
            format!("expected a non-negative integer, found {}", datum.label()),
        )),
    }
}

/// Rows grouped by partition, each group in batch order.
pub(crate) fn group_by_partition(rows: Vec<TrackedRow>) -> Vec<(String, Vec<TrackedRow>)> {
    let mut groups: Vec<(String, Vec<TrackedRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(p, _)| *p == row.partition) {
            Some((_, group)) => group.push(row),
            None => groups.push((row.partition.clone(), vec![row])),
        }
    }
    groups
}

/// The id's previous count when `count` advances it (0 for an unseen id),
/// `None` for out-of-order or duplicate counts.
pub(crate) fn advance(overlay: &StateOverlay, key: &AggregateKey, count: u64) -> Option<u64> {
    match overlay.get(COUNT_COLUMN, key).and_then(|c| c.as_count()) {
        Some(prev) if count <= prev => None,
        Some(prev) => Some(prev),
        None => Some(0),
    }
}
