//! # driftwatch-analysis
//!
//! Pure algorithms behind the drift monitors and aggregate trackers:
//! row-wise distances, reference bucketing, online change detectors
//! (DDM, ADWIN), and divergence measures (PSI, greedy transport cost).
//! Nothing here touches I/O or shared state.

pub mod bucketing;
pub mod detectors;
pub mod distance;
pub mod divergence;

pub use bucketing::{BucketModel, BucketingConfig, Cluster};
pub use detectors::{ChangeDetector, Detector, DetectorState};
pub use distance::{resolve_distance, row_distance};
pub use divergence::{population_stability_index, transport_cost};
