//! Distance of each entity's current value from its first (`initial`) or
//! previous (`running_diff`) value.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use driftwatch_core::config::{DistanceTrackerConfig, ReferenceMode};
use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::{AggregateKey, Batch, CacheValue};
use driftwatch_core::traits::ILogSink;

use super::{advance, group_by_partition, StateOverlay, TrackedRow, TrackerCore, TrackerStats, COUNT_COLUMN};
use crate::context::MonitorContext;
use crate::report::SkippedRow;

pub const DASHBOARD: &str = "distance";
const VALUE_COLUMN: &str = "value";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceObservation {
    pub row_id: String,
    pub aggregate_id: AggregateKey,
    pub count: u64,
    /// Distance per type name.
    pub distances: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DistanceReport {
    pub stats: TrackerStats,
    pub observations: Vec<DistanceObservation>,
}

pub struct DistanceTracker {
    core: TrackerCore,
    sink: Arc<dyn ILogSink>,
}

impl DistanceTracker {
    pub fn new(config: &DistanceTrackerConfig, ctx: &MonitorContext) -> DriftwatchResult<Self> {
        Ok(Self {
            core: TrackerCore::new("distance", &config.tracker, ctx)?,
            sink: Arc::clone(&ctx.sink),
        })
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn need_ground_truth(&self) -> bool {
        false
    }

    pub fn check(&mut self, batch: &Batch) -> DriftwatchResult<DistanceReport> {
        let mut report = DistanceReport::default();
        let rows = self.core.rows(batch, &mut report.stats)?;

        for (partition, rows) in group_by_partition(rows) {
            let mut overlay = StateOverlay::new(self.core.handle(&partition));
            let ids: Vec<AggregateKey> = rows.iter().map(|r| r.key.clone()).collect();
            overlay.load(COUNT_COLUMN, &ids)?;
            overlay.load(VALUE_COLUMN, &ids)?;

            for row in rows {
                match self.observe(&mut overlay, &row, &mut report.stats) {
                    Ok(Some(observation)) => report.observations.push(observation),
                    Ok(None) => {}
                    Err(e) if e.is_row_level() => {
                        report.stats.skipped.push(SkippedRow::record(&self.core.name, &row.row_id, &e));
                    }
                    Err(e) => return Err(e),
                }
            }
            overlay.flush()?;
        }
        Ok(report)
    }

    fn observe(
        &self,
        overlay: &mut StateOverlay,
        row: &TrackedRow,
        stats: &mut TrackerStats,
    ) -> DriftwatchResult<Option<DistanceObservation>> {
        if advance(overlay, &row.key, row.count).is_none() {
            stats.stale += 1;
            return Ok(None);
        }
        let cached = overlay
            .get(VALUE_COLUMN, &row.key)
            .and_then(|v| v.as_values())
            .map(<[f64]>::to_vec);
        let first = cached.is_none();
        let reference = cached.unwrap_or_else(|| row.value.clone());
        let distances = self.core.distances_between(&row.value, &reference)?;

        overlay.set(COUNT_COLUMN, &row.key, CacheValue::Count(row.count));
        if first || self.core.reference == ReferenceMode::RunningDiff {
            overlay.set(VALUE_COLUMN, &row.key, CacheValue::Values(row.value.clone()));
        }
        stats.processed += 1;

        let mut labels = row.labels.clone();
        labels.insert("aggregate_id".to_string(), row.key.to_string());
        let reference_name = self.core.reference.as_str();
        for (distance_type, d) in &distances {
            let name = distance_type.as_str();
            self.sink.add_scalars(
                &format!("distance_{name}_{reference_name}"),
                &BTreeMap::from([(format!("y_{name}"), *d)]),
                row.count,
                DASHBOARD,
                &labels,
            );
        }

        Ok(Some(DistanceObservation {
            row_id: row.row_id.clone(),
            aggregate_id: row.key.clone(),
            count: row.count,
            distances: distances
                .into_iter()
                .map(|(t, d)| (t.as_str().to_string(), d))
                .collect(),
        }))
    }
}
