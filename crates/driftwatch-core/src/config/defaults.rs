//! Default values for every configurable knob. Config structs and serde
//! default functions read from here and nowhere else.

// Concept drift: DDM
pub const DEFAULT_DDM_WARM_START: u64 = 500;
pub const DEFAULT_DDM_WARN_THRESHOLD: f64 = 2.0;
pub const DEFAULT_DDM_ALARM_THRESHOLD: f64 = 3.0;

// Concept drift: ADWIN
pub const DEFAULT_ADWIN_DELTA: f64 = 0.002;
pub const DEFAULT_ADWIN_CLOCK: u32 = 32;
pub const DEFAULT_ADWIN_MAX_BUCKETS: usize = 5;
pub const DEFAULT_ADWIN_MIN_WINDOW_LENGTH: u64 = 5;
pub const DEFAULT_ADWIN_GRACE_PERIOD: u64 = 5;

// Data drift
pub const DEFAULT_INITIAL_SKIP: u64 = 1_000;
pub const DEFAULT_NUM_BUCKETS: usize = 20;
pub const DEFAULT_PSI_THRESHOLD: f64 = 0.3;
pub const DEFAULT_EMD_THRESHOLD: f64 = 0.1;
pub const DEFAULT_PSI_EPSILON: f64 = 1e-4;
pub const DEFAULT_KMEANS_SEED: u64 = 42;
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_EDGE_CASE_SPREAD_RATIO: f64 = 2.0;
/// Windows with fewer observations than this are not compared.
pub const MIN_WINDOW_OBSERVATIONS: u64 = 10;

// Distances
pub const DEFAULT_NORM_RATIO_EPSILON: f64 = 1e-6;

// Aggregate trackers
pub const DEFAULT_SUMMARY_INTERVAL: u64 = 50_000;
pub const DEFAULT_SUMMARY_MIN_SAMPLES: usize = 5;
pub const DEFAULT_DISTRIBUTION_SAMPLE_SIZE: usize = 10;
pub const DEFAULT_DISTRIBUTION_SEED: u64 = 7;

// Measurables
pub const DEFAULT_ROW_CACHE_CAPACITY: u64 = 10_000;

// State cache
pub const DEFAULT_CACHE_DB_PATH: &str = "driftwatch_state.db";
pub const DEFAULT_CACHE_BUSY_TIMEOUT_MS: u64 = 5_000;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn initial_skip() -> u64 {
    DEFAULT_INITIAL_SKIP
}

pub fn num_buckets() -> usize {
    DEFAULT_NUM_BUCKETS
}

pub fn psi_threshold() -> f64 {
    DEFAULT_PSI_THRESHOLD
}

pub fn emd_threshold() -> f64 {
    DEFAULT_EMD_THRESHOLD
}

pub fn kmeans_seed() -> u64 {
    DEFAULT_KMEANS_SEED
}

pub fn kmeans_max_iterations() -> usize {
    DEFAULT_KMEANS_MAX_ITERATIONS
}

pub fn edge_case_spread_ratio() -> f64 {
    DEFAULT_EDGE_CASE_SPREAD_RATIO
}

pub fn summary_interval() -> u64 {
    DEFAULT_SUMMARY_INTERVAL
}

pub fn distribution_sample_size() -> usize {
    DEFAULT_DISTRIBUTION_SAMPLE_SIZE
}

pub fn distribution_seed() -> u64 {
    DEFAULT_DISTRIBUTION_SEED
}

pub fn row_cache_capacity() -> u64 {
    DEFAULT_ROW_CACHE_CAPACITY
}
