//! Per-entity convergence across checkpoints of the entity's counter.
//!
//! The first checkpoint an id crosses stores a snapshot of its value. Each
//! later crossing measures the distance from the first snapshot (`initial`)
//! or from the previous one (`running_diff`, which then takes its place).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use driftwatch_core::config::defaults;
use driftwatch_core::config::{ConvergenceConfig, DistanceType, ReferenceMode};
use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::{AggregateKey, Batch, CacheValue};
use driftwatch_core::traits::{ILogSink, Labels};
use driftwatch_observability::tracing_setup::events;

use super::{
    advance, crossed_checkpoint, group_by_partition, normalise_checkpoints, StateOverlay, TrackedRow,
    TrackerCore, TrackerStats, COUNT_COLUMN,
};
use crate::context::MonitorContext;
use crate::report::SkippedRow;

pub const DASHBOARD: &str = "convergence_stats";
const SNAPSHOT_COLUMN: &str = "snapshot";

/// One checkpoint crossing. `distances` is empty for an id's first crossing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossingEvent {
    pub row_id: String,
    pub aggregate_id: AggregateKey,
    pub checkpoint: u64,
    pub count: u64,
    pub distances: BTreeMap<String, f64>,
}

/// Running total of the distances recorded at one checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistanceSummary {
    pub sum: f64,
    pub samples: usize,
}

impl DistanceSummary {
    fn add(&mut self, distance: f64) {
        self.sum += distance;
        self.samples += 1;
    }

    fn merge(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            samples: self.samples + other.samples,
        }
    }

    pub fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvergenceReport {
    pub stats: TrackerStats,
    pub crossings: Vec<CrossingEvent>,
    /// Whether a periodic summary was emitted after this batch.
    pub summary_emitted: bool,
}

pub struct ConvergenceTracker {
    core: TrackerCore,
    sink: Arc<dyn ILogSink>,
    checkpoints: Vec<u64>,
    summary_interval: u64,
    total_rows: u64,
    summarised_at: u64,
    /// Per (partition, checkpoint, distance type), for summaries.
    history: BTreeMap<(String, u64, &'static str), DistanceSummary>,
    partition_labels: HashMap<String, Labels>,
}

impl ConvergenceTracker {
    pub fn new(config: &ConvergenceConfig, ctx: &MonitorContext) -> DriftwatchResult<Self> {
        Ok(Self {
            core: TrackerCore::new("convergence", &config.tracker, ctx)?,
            sink: Arc::clone(&ctx.sink),
            checkpoints: normalise_checkpoints(&config.count_checkpoints),
            summary_interval: config.summary_interval,
            total_rows: 0,
            summarised_at: 0,
            history: BTreeMap::new(),
            partition_labels: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn need_ground_truth(&self) -> bool {
        false
    }

    pub fn checkpoints(&self) -> &[u64] {
        &self.checkpoints
    }

    /// Distances recorded at `checkpoint` for `distance_type`, across partitions.
    pub fn summary_at(&self, checkpoint: u64, distance_type: DistanceType) -> Option<DistanceSummary> {
        self.history
            .iter()
            .filter(|((_, cp, t), _)| *cp == checkpoint && *t == distance_type.as_str())
            .map(|(_, s)| *s)
            .reduce(DistanceSummary::merge)
    }

    pub fn check(&mut self, batch: &Batch) -> DriftwatchResult<ConvergenceReport> {
        let mut report = ConvergenceReport::default();
        let rows = self.core.rows(batch, &mut report.stats)?;

        for (partition, rows) in group_by_partition(rows) {
            let mut overlay = StateOverlay::new(self.core.handle(&partition));
            let ids: Vec<AggregateKey> = rows.iter().map(|r| r.key.clone()).collect();
            overlay.load(COUNT_COLUMN, &ids)?;
            overlay.load(SNAPSHOT_COLUMN, &ids)?;

            for row in rows {
                match self.observe(&mut overlay, &row, &mut report.stats) {
                    Ok(Some(crossing)) => {
                        self.partition_labels
                            .entry(partition.clone())
                            .or_insert_with(|| partition_labels(&row.labels));
                        for (distance_type, _) in &self.core.distances {
                            if let Some(d) = crossing.distances.get(distance_type.as_str()) {
                                self.history
                                    .entry((partition.clone(), crossing.checkpoint, distance_type.as_str()))
                                    .or_default()
                                    .add(*d);
                            }
                        }
                        report.crossings.push(crossing);
                    }
                    Ok(None) => {}
                    Err(e) if e.is_row_level() => {
                        report.stats.skipped.push(SkippedRow::record(&self.core.name, &row.row_id, &e));
                    }
                    Err(e) => return Err(e),
                }
            }
            overlay.flush()?;
        }

        self.total_rows += batch.len() as u64;
        if self.total_rows - self.summarised_at >= self.summary_interval {
            self.summarised_at = self.total_rows;
            self.emit_summary();
            report.summary_emitted = true;
        }
        Ok(report)
    }

    fn observe(
        &self,
        overlay: &mut StateOverlay,
        row: &TrackedRow,
        stats: &mut TrackerStats,
    ) -> DriftwatchResult<Option<CrossingEvent>> {
        let Some(prev) = advance(overlay, &row.key, row.count) else {
            stats.stale += 1;
            return Ok(None);
        };
        let Some(checkpoint) = crossed_checkpoint(&self.checkpoints, prev, row.count) else {
            overlay.set(COUNT_COLUMN, &row.key, CacheValue::Count(row.count));
            stats.processed += 1;
            return Ok(None);
        };

        let snapshot = overlay
            .get(SNAPSHOT_COLUMN, &row.key)
            .and_then(|v| v.as_values())
            .map(<[f64]>::to_vec);
        let distances = match &snapshot {
            Some(reference) => self.core.distances_between(&row.value, reference)?,
            None => Vec::new(),
        };

        overlay.set(COUNT_COLUMN, &row.key, CacheValue::Count(row.count));
        let is_last = self.checkpoints.last() == Some(&checkpoint);
        if is_last {
            overlay.remove(SNAPSHOT_COLUMN, &row.key);
        } else if snapshot.is_none() || self.core.reference == ReferenceMode::RunningDiff {
            overlay.set(SNAPSHOT_COLUMN, &row.key, CacheValue::Values(row.value.clone()));
        }
        stats.processed += 1;
        events::checkpoint_crossed(&self.core.name, &row.key.to_string(), checkpoint, row.count);

        let mut labels = row.labels.clone();
        labels.insert("checkpoint".to_string(), checkpoint.to_string());
        let reference_name = self.core.reference.as_str();
        for (distance_type, d) in &distances {
            self.sink.add_histogram(
                &format!("{} {reference_name}", distance_type.as_str()),
                &[*d],
                DASHBOARD,
                &labels,
            );
        }

        Ok(Some(CrossingEvent {
            row_id: row.row_id.clone(),
            aggregate_id: row.key.clone(),
            checkpoint,
            count: row.count,
            distances: distances
                .into_iter()
                .map(|(t, d)| (t.as_str().to_string(), d))
                .collect(),
        }))
    }

    /// Mean distance per checkpoint with enough samples.
    fn emit_summary(&self) {
        let reference_name = self.core.reference.as_str();
        for ((partition, checkpoint, distance_type), summary) in &self.history {
            if *checkpoint == 0 || summary.samples <= defaults::DEFAULT_SUMMARY_MIN_SAMPLES {
                continue;
            }
            let Some(mean) = summary.mean() else {
                continue;
            };
            let labels = self.partition_labels.get(partition).cloned().unwrap_or_default();
            self.sink.add_scalars(
                &format!("{distance_type} {reference_name}_mean"),
                &BTreeMap::from([("y_mean".to_string(), mean)]),
                *checkpoint,
                DASHBOARD,
                &labels,
            );
        }
    }
}

/// The `model_*` tags that define a partition.
fn partition_labels(labels: &Labels) -> Labels {
    labels
        .iter()
        .filter(|(k, _)| k.starts_with("model_"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
