//! Aggregate statistics trackers: per-entity state keyed by an aggregate id
//! and advanced by an external counter.
//!
//! All three trackers share [`TrackerCore`], which resolves the measurables,
//! applies the label allow-lists, and partitions rows into cache namespaces
//! (one per label combination).

mod convergence;
mod shared;
mod distance;
mod distribution;
mod overlay;

pub use convergence::{ConvergenceReport, ConvergenceTracker, CrossingEvent, DistanceSummary};
pub use distance::{DistanceObservation, DistanceReport, DistanceTracker};
pub use distribution::{DistributionEvent, DistributionReport, DistributionTracker};

pub(crate) use shared::{advance, group_by_partition, TrackedRow, TrackerCore};
pub(crate) use overlay::StateOverlay;

use serde::Serialize;

use crate::report::SkippedRow;

/// Cache column holding each id's last accepted count.
pub(crate) const COUNT_COLUMN: &str = "count";

/// Row accounting shared by every tracker report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerStats {
    /// Rows that advanced an id's counter.
    pub processed: usize,
    /// Rows dropped by a label allow-list.
    pub filtered: usize,
    /// Out-of-order or duplicate counts, ignored.
    pub stale: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Sorted, deduplicated checkpoints, always including 0.
pub(crate) fn normalise_checkpoints(checkpoints: &[u64]) -> Vec<u64> {
    let mut out: Vec<u64> = std::iter::once(0).chain(checkpoints.iter().copied()).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Highest checkpoint `c` with `prev < c <= count`.
pub(crate) fn crossed_checkpoint(checkpoints: &[u64], prev: u64, count: u64) -> Option<u64> {
    checkpoints
        .iter()
        .rev()
        .find(|c| **c > prev && **c <= count)
        .copied()
}
