//! # driftwatch-observability
//!
//! Structured tracing setup and event helpers, plus the log sinks monitors
//! emit metrics, histograms, and drift alerts into.

pub mod sinks;
pub mod tracing_setup;

pub use sinks::{RecordingSink, SinkRecord, TracingSink};
pub use tracing_setup::{init_tracing, init_tracing_from_config, init_tracing_with_filter};
