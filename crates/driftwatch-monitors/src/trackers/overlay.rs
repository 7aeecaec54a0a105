use std::collections::{BTreeSet, HashMap, HashSet};

use driftwatch_cache::CacheHandle;
use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::{AggregateKey, CacheValue};

#[derive(Debug, Default)]
struct Column {
    values: HashMap<AggregateKey, CacheValue>,
    loaded: HashSet<AggregateKey>,
    dirty: BTreeSet<AggregateKey>,
    removed: BTreeSet<AggregateKey>,
}

/// Local view of one namespace for the duration of a batch.
///
/// Entries are fetched once, read and written row by row in memory, and
/// written back in one `flush`.
#[derive(Debug)]
pub(crate) struct StateOverlay {
    handle: CacheHandle,
    columns: HashMap<String, Column>,
}

impl StateOverlay {
    pub fn new(handle: CacheHandle) -> Self {
        Self {
            handle,
            columns: HashMap::new(),
        }
    }

    /// Make sure `ids` are loaded for `column`. Ids already loaded are not
    /// fetched again.
    pub fn load(&mut self, column: &str, ids: &[AggregateKey]) -> DriftwatchResult<()> {
        let entry = self.columns.entry(column.to_string()).or_default();
        let mut seen: HashSet<&AggregateKey> = HashSet::new();
        let missing: Vec<AggregateKey> = ids
            .iter()
            .filter(|id| !entry.loaded.contains(*id) && seen.insert(*id))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let fetched = self.handle.fetch(&missing, &[column])?;
        if let Some(values) = fetched.into_iter().next() {
            for (id, value) in values {
                entry.values.entry(id).or_insert(value);
            }
        }
        entry.loaded.extend(missing);
        Ok(())
    }

    pub fn get(&self, column: &str, id: &AggregateKey) -> Option<&CacheValue> {
        self.columns.get(column).and_then(|c| c.values.get(id))
    }

    pub fn set(&mut self, column: &str, id: &AggregateKey, value: CacheValue) {
        let entry = self.columns.entry(column.to_string()).or_default();
        entry.values.insert(id.clone(), value);
        entry.loaded.insert(id.clone());
        entry.removed.remove(id);
        entry.dirty.insert(id.clone());
    }

    pub fn remove(&mut self, column: &str, id: &AggregateKey) {
        let entry = self.columns.entry(column.to_string()).or_default();
        entry.values.remove(id);
        entry.loaded.insert(id.clone());
        entry.dirty.remove(id);
        entry.removed.insert(id.clone());
    }

    /// Write every change back to the cache.
    pub fn flush(self) -> DriftwatchResult<()> {
        for (name, column) in self.columns {
            if !column.dirty.is_empty() {
                let ids: Vec<AggregateKey> = column.dirty.into_iter().collect();
                let values: Vec<CacheValue> = ids
                    .iter()
                    .filter_map(|id| column.values.get(id).cloned())
                    .collect();
                self.handle.upsert(&ids, &[(name.as_str(), values)])?;
            }
            if !column.removed.is_empty() {
                let ids: Vec<AggregateKey> = column.removed.into_iter().collect();
                self.handle.remove(&ids, &name)?;
            }
        }
        Ok(())
    }
}
