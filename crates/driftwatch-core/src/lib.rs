//! # driftwatch-core
//!
//! Foundation crate for the driftwatch drift-and-statistics engine.
//! Defines the batch/row model, traits, errors, config, and defaults.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::DriftwatchConfig;
pub use errors::{DriftwatchError, DriftwatchResult};
pub use models::{AggregateKey, Batch, CacheValue, Datum, DriftAlert, FeatureVector, Record, Row};
