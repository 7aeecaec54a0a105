use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::{AggregateKey, CacheValue};
use driftwatch_core::traits::IStateCache;

/// A shared cache bound to one namespace.
#[derive(Clone)]
pub struct CacheHandle {
    cache: Arc<dyn IStateCache>,
    namespace: String,
}

impl CacheHandle {
    pub fn new(cache: Arc<dyn IStateCache>, namespace: impl Into<String>) -> Self {
        Self {
            cache,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// A handle on `<namespace>/<suffix>` over the same backend.
    pub fn child(&self, suffix: &str) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            namespace: format!("{}/{}", self.namespace, suffix),
        }
    }

    pub fn upsert(&self, ids: &[AggregateKey], columns: &[(&str, Vec<CacheValue>)]) -> DriftwatchResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.cache.upsert(&self.namespace, ids, columns)
    }

    pub fn fetch(
        &self,
        ids: &[AggregateKey],
        columns: &[&str],
    ) -> DriftwatchResult<Vec<HashMap<AggregateKey, CacheValue>>> {
        if ids.is_empty() {
            return Ok(vec![HashMap::new(); columns.len()]);
        }
        self.cache.fetch(&self.namespace, ids, columns)
    }

    pub fn remove(&self, ids: &[AggregateKey], column: &str) -> DriftwatchResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.cache.remove(&self.namespace, ids, column)
    }

    pub fn ids(&self, column: &str) -> DriftwatchResult<Vec<AggregateKey>> {
        self.cache.ids(&self.namespace, column)
    }
}

impl fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
