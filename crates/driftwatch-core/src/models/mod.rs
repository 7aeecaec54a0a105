//! Data model shared by every driftwatch crate.

mod aggregate_key;
mod batch;
mod cache_value;
mod datum;
mod drift_alert;
mod feature_vector;

pub use aggregate_key::AggregateKey;
pub use batch::{Batch, Record, Row};
pub use cache_value::CacheValue;
pub use datum::Datum;
pub use drift_alert::{AlertSeverity, DriftAlert, DriftAlertCategory};
pub use feature_vector::FeatureVector;
