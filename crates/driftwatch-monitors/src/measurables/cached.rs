//! Row-id keyed memoisation of another measurable, backed by moka.

use std::sync::Arc;

use moka::sync::Cache;

use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{Batch, Datum, Record};
use driftwatch_core::traits::IMeasurable;

/// Serves repeated rows (same row id) from a bounded in-memory cache.
/// Only batch computation is cached; reference records have no id.
pub struct CachedMeasurable {
    inner: Arc<dyn IMeasurable>,
    cache: Cache<String, Datum>,
}

impl CachedMeasurable {
    pub fn new(inner: Arc<dyn IMeasurable>, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Whether a value is cached for `row_id`.
    pub fn contains(&self, row_id: &str) -> bool {
        self.cache.contains_key(row_id)
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl IMeasurable for CachedMeasurable {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn compute(&self, batch: &Batch) -> DriftwatchResult<Vec<Datum>> {
        let mut out: Vec<Option<Datum>> = batch.iter().map(|row| self.cache.get(&row.id)).collect();
        let misses: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_none())
            .map(|(i, _)| i)
            .collect();

        if !misses.is_empty() {
            let sub = Batch::new(misses.iter().map(|i| batch.rows[*i].clone()).collect());
            let computed = self.inner.compute(&sub)?;
            if computed.len() != misses.len() {
                return Err(DriftwatchError::Shape {
                    base: (computed.len(), 1),
                    reference: (misses.len(), 1),
                });
            }
            for (i, datum) in misses.into_iter().zip(computed) {
                self.cache.insert(batch.rows[i].id.clone(), datum.clone());
                out[i] = Some(datum);
            }
        }

        Ok(out.into_iter().flatten().collect())
    }

    fn extract(&self, record: &Record) -> DriftwatchResult<Datum> {
        self.inner.extract(record)
    }
}

impl std::fmt::Debug for CachedMeasurable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedMeasurable")
            .field("inner", &self.inner.name())
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
