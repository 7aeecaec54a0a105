//! Cross-sectional distance distributions: when an id reaches a checkpoint
//! it is compared with a random sample of other ids at the same checkpoint.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use driftwatch_core::config::DistributionConfig;
use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::{AggregateKey, Batch, CacheValue};
use driftwatch_core::traits::ILogSink;
use driftwatch_observability::tracing_setup::events;

use super::{
    advance, crossed_checkpoint, group_by_partition, normalise_checkpoints, StateOverlay, TrackedRow,
    TrackerCore, TrackerStats, COUNT_COLUMN,
};
use crate::context::MonitorContext;
use crate::report::SkippedRow;

pub const DASHBOARD: &str = "distribution_stats";
/// Root-namespace column listing every partition the tracker has written.
const PARTITIONS_COLUMN: &str = "partitions";

fn checkpoint_column(checkpoint: u64) -> String {
    format!("checkpoint_{checkpoint}")
}

/// Ids holding a value at one (partition, checkpoint).
#[derive(Debug)]
struct Members {
    ids: Vec<AggregateKey>,
    index: HashSet<AggregateKey>,
}

impl Members {
    fn insert(&mut self, id: &AggregateKey) {
        if self.index.insert(id.clone()) {
            self.ids.push(id.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEvent {
    pub row_id: String,
    pub aggregate_id: AggregateKey,
    pub checkpoint: u64,
    /// Other ids the value was compared with.
    pub sampled: Vec<AggregateKey>,
    /// Distances to the sampled ids, per type name.
    pub distances: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionReport {
    pub stats: TrackerStats,
    pub events: Vec<DistributionEvent>,
}

pub struct DistributionTracker {
    core: TrackerCore,
    sink: Arc<dyn ILogSink>,
    checkpoints: Vec<u64>,
    sample_size: usize,
    rng: StdRng,
    /// Membership per (partition, checkpoint), read from the cache on first
    /// use and kept in step with every write after that.
    members: HashMap<(String, u64), Members>,
    registered: HashSet<String>,
}

impl DistributionTracker {
    pub fn new(config: &DistributionConfig, ctx: &MonitorContext) -> DriftwatchResult<Self> {
        Ok(Self {
            core: TrackerCore::new("distribution", &config.tracker, ctx)?,
            sink: Arc::clone(&ctx.sink),
            checkpoints: normalise_checkpoints(&config.count_checkpoints),
            sample_size: config.sample_size,
            rng: StdRng::seed_from_u64(config.seed),
            members: HashMap::new(),
            registered: HashSet::new(),
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

    /// Stored values of every id that reached `checkpoint`, across partitions.
    pub fn population_at(&self, checkpoint: u64) -> DriftwatchResult<Vec<(AggregateKey, Vec<f64>)>> {
        let column = checkpoint_column(checkpoint);
        let mut out = Vec::new();
        for partition in self.core.handle("").ids(PARTITIONS_COLUMN)? {
            let handle = self.core.handle(&partition.to_string());
            let ids = handle.ids(&column)?;
            let fetched = handle.fetch(&ids, &[column.as_str()])?;
            let Some(values) = fetched.into_iter().next() else {
                continue;
            };
            for id in ids {
                if let Some(v) = values.get(&id).and_then(|v| v.as_values()) {
                    out.push((id, v.to_vec()));
                }
            }
        }
        Ok(out)
    }

    /// Record `partition` in the root namespace so `population_at` finds it
    /// after a restart.
    fn register(&mut self, partition: &str) -> DriftwatchResult<()> {
        if self.registered.contains(partition) {
            return Ok(());
        }
        self.core.handle("").upsert(
            &[AggregateKey::from(partition)],
            &[(PARTITIONS_COLUMN, vec![CacheValue::Count(0)])],
        )?;
        self.registered.insert(partition.to_string());
        Ok(())
    }

    fn members(&mut self, partition: &str, checkpoint: u64) -> DriftwatchResult<&mut Members> {
        match self.members.entry((partition.to_string(), checkpoint)) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let ids = self.core.handle(partition).ids(&checkpoint_column(checkpoint))?;
                let index = ids.iter().cloned().collect();
                Ok(e.insert(Members { ids, index }))
            }
        }
    }

    pub fn check(&mut self, batch: &Batch) -> DriftwatchResult<DistributionReport> {
        let mut report = DistributionReport::default();
        let rows = self.core.rows(batch, &mut report.stats)?;

        for (partition, rows) in group_by_partition(rows) {
            self.register(&partition)?;
            let mut overlay = StateOverlay::new(self.core.handle(&partition));
            let ids: Vec<AggregateKey> = rows.iter().map(|r| r.key.clone()).collect();
            overlay.load(COUNT_COLUMN, &ids)?;

            for row in rows {
                match self.observe(&mut overlay, &partition, &row, &mut report.stats) {
                    Ok(Some(event)) => report.events.push(event),
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
        &mut self,
        overlay: &mut StateOverlay,
        partition: &str,
        row: &TrackedRow,
        stats: &mut TrackerStats,
    ) -> DriftwatchResult<Option<DistributionEvent>> {
        let first_seen = overlay.get(COUNT_COLUMN, &row.key).is_none();
        let Some(prev) = advance(overlay, &row.key, row.count) else {
            stats.stale += 1;
            return Ok(None);
        };
        // An id's first value always lands at checkpoint 0.
        let checkpoint = if first_seen {
            Some(0)
        } else {
            crossed_checkpoint(&self.checkpoints, prev, row.count)
        };
        let Some(checkpoint) = checkpoint else {
            overlay.set(COUNT_COLUMN, &row.key, CacheValue::Count(row.count));
            stats.processed += 1;
            return Ok(None);
        };

        let column = checkpoint_column(checkpoint);
        let candidates: Vec<AggregateKey> = self
            .members(partition, checkpoint)?
            .ids
            .iter()
            .filter(|id| **id != row.key)
            .cloned()
            .collect();
        let sampled: Vec<AggregateKey> = candidates
            .choose_multiple(&mut self.rng, self.sample_size)
            .cloned()
            .collect();
        overlay.load(&column, &sampled)?;

        let mut distances: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut compared = Vec::with_capacity(sampled.len());
        for other in sampled {
            let Some(reference) = overlay.get(&column, &other).and_then(|v| v.as_values()) else {
                continue;
            };
            for (distance_type, d) in self.core.distances_between(&row.value, reference)? {
                distances.entry(distance_type.as_str().to_string()).or_default().push(d);
            }
            compared.push(other);
        }

        overlay.set(COUNT_COLUMN, &row.key, CacheValue::Count(row.count));
        overlay.set(&column, &row.key, CacheValue::Values(row.value.clone()));
        self.members(partition, checkpoint)?.insert(&row.key);
        stats.processed += 1;
        events::checkpoint_crossed(&self.core.name, &row.key.to_string(), checkpoint, row.count);

        let mut labels = row.labels.clone();
        labels.insert("checkpoint".to_string(), checkpoint.to_string());
        for (name, values) in &distances {
            self.sink.add_histogram(name, values, DASHBOARD, &labels);
        }

        Ok(Some(DistributionEvent {
            row_id: row.row_id.clone(),
            aggregate_id: row.key.clone(),
            checkpoint,
            sampled: compared,
            distances,
        }))
    }
}
