//! # driftwatch-monitors
//!
//! The checks that run on each batch: a concept-drift monitor over an
//! online change detector, a data-drift monitor over a bucketed reference
//! population, and three aggregate trackers (distance, convergence,
//! distribution) whose per-entity state lives in the shared state cache.
//!
//! [`CheckSet`] builds every configured check and dispatches batches to them.

pub mod check;
pub mod concept_drift;
pub mod context;
pub mod data_drift;
pub mod measurables;
pub mod reference;
pub mod report;
pub mod trackers;

pub use check::{BuildFailure, Check, CheckOutcome, CheckSet};
pub use concept_drift::{ConceptDriftMonitor, ConceptDriftReport};
pub use context::MonitorContext;
pub use data_drift::{DataDriftMonitor, DataDriftReport, EdgeCase};
pub use measurables::{compute_rows, resolve_measurable, MeasurableRegistry};
pub use report::SkippedRow;
pub use trackers::{
    ConvergenceReport, ConvergenceTracker, CrossingEvent, DistanceObservation, DistanceReport,
    DistanceSummary, DistanceTracker, DistributionEvent, DistributionReport, DistributionTracker, TrackerStats,
};
