use std::collections::HashMap;

use crate::errors::DriftwatchResult;
use crate::models::{AggregateKey, CacheValue};

/// Keyed per-aggregate state, partitioned by namespace and column.
///
/// Implementations are shared across trackers and must be internally synchronized.
pub trait IStateCache: Send + Sync {
    /// Insert or overwrite. Each column's values are parallel to `ids`.
    fn upsert(
        &self,
        namespace: &str,
        ids: &[AggregateKey],
        columns: &[(&str, Vec<CacheValue>)],
    ) -> DriftwatchResult<()>;

    /// One map per requested column. Ids with no stored value are absent.
    fn fetch(
        &self,
        namespace: &str,
        ids: &[AggregateKey],
        columns: &[&str],
    ) -> DriftwatchResult<Vec<HashMap<AggregateKey, CacheValue>>>;

    fn remove(&self, namespace: &str, ids: &[AggregateKey], column: &str) -> DriftwatchResult<()>;

    /// Every id holding a value in `column`, sorted.
    fn ids(&self, namespace: &str, column: &str) -> DriftwatchResult<Vec<AggregateKey>>;
}
