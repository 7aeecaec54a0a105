//! Process-local state cache. The default backend.

use std::collections::HashMap;
use std::sync::Mutex;

use driftwatch_core::errors::{CacheError, DriftwatchResult};
use driftwatch_core::models::{AggregateKey, CacheValue};
use driftwatch_core::traits::IStateCache;

use crate::check_columns;

type Column = HashMap<AggregateKey, CacheValue>;

#[derive(Debug, Default)]
pub struct InMemoryStateCache {
    columns: Mutex<HashMap<(String, String), Column>>,
}

impl InMemoryStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all namespaces and columns.
    pub fn len(&self) -> usize {
        self.columns
            .lock()
            .map(|c| c.values().map(HashMap::len).sum())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IStateCache for InMemoryStateCache {
    fn upsert(
        &self,
        namespace: &str,
        ids: &[AggregateKey],
        columns: &[(&str, Vec<CacheValue>)],
    ) -> DriftwatchResult<()> {
        check_columns(ids.len(), columns)?;
        let mut guard = self.columns.lock().map_err(|_| CacheError::Poisoned)?;
        for (column, values) in columns {
            let entries = guard
                .entry((namespace.to_string(), (*column).to_string()))
                .or_default();
            for (id, value) in ids.iter().zip(values) {
                entries.insert(id.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn fetch(
        &self,
        namespace: &str,
        ids: &[AggregateKey],
        columns: &[&str],
    ) -> DriftwatchResult<Vec<HashMap<AggregateKey, CacheValue>>> {
        let guard = self.columns.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(columns
            .iter()
            .map(|column| {
                let Some(entries) = guard.get(&(namespace.to_string(), (*column).to_string()))
                else {
                    return HashMap::new();
                };
                ids.iter()
                    .filter_map(|id| entries.get(id).map(|v| (id.clone(), v.clone())))
                    .collect()
            })
            .collect())
    }

    fn remove(&self, namespace: &str, ids: &[AggregateKey], column: &str) -> DriftwatchResult<()> {
        let mut guard = self.columns.lock().map_err(|_| CacheError::Poisoned)?;
        if let Some(entries) = guard.get_mut(&(namespace.to_string(), column.to_string())) {
            for id in ids {
                entries.remove(id);
            }
        }
        Ok(())
    }

    fn ids(&self, namespace: &str, column: &str) -> DriftwatchResult<Vec<AggregateKey>> {
        let guard = self.columns.lock().map_err(|_| CacheError::Poisoned)?;
        let mut ids: Vec<AggregateKey> = guard
            .get(&(namespace.to_string(), column.to_string()))
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        Ok(ids)
    }
}
