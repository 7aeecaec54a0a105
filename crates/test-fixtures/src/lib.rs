//! Shared test support for the driftwatch workspace: fixture file loading and
//! seeded synthetic data generators (error streams, Gaussian blobs, aggregate
//! update streams).

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use driftwatch_core::models::{Batch, Row};

/// Root directory of the workspace `fixtures/` folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find fixtures/.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("fixtures").is_dir() {
        if !path.pop() {
            panic!(
                "Could not find fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as a raw string (TOML configs).
pub fn load_fixture_text(relative_path: &str) -> String {
    let path = fixtures_root().join(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Bernoulli 0/1 stream whose rate switches from `rate_before` to
/// `rate_after` at index `step`.
pub fn error_stream(seed: u64, len: usize, step: usize, rate_before: f64, rate_after: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|i| {
            let rate = if i < step { rate_before } else { rate_after };
            if rng.gen_bool(rate) {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// `n` points drawn round-robin from isotropic Gaussians around `centers`.
pub fn gaussian_blobs(seed: u64, centers: &[Vec<f64>], std_dev: f64, n: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, std_dev).unwrap_or_else(|e| panic!("invalid std_dev {std_dev}: {e}"));
    (0..n)
        .map(|i| {
            let center = &centers[i % centers.len()];
            center.iter().map(|c| c + noise.sample(&mut rng)).collect()
        })
        .collect()
}

/// Reference-dataset records `{feature: point}` ready to be written as JSON.
pub fn reference_records(feature: &str, points: &[Vec<f64>]) -> Value {
    Value::Array(
        points
            .iter()
            .map(|p| {
                let mut record = serde_json::Map::new();
                record.insert(feature.to_string(), json!(p));
                Value::Object(record)
            })
            .collect(),
    )
}

/// One row per point with the point under `inputs[feature]`.
/// Row ids are `"{prefix}-{offset + i}"`.
pub fn feature_batch(prefix: &str, offset: usize, feature: &str, points: &[Vec<f64>]) -> Batch {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| Row::new(format!("{prefix}-{}", offset + i)).with_input(feature, json!(p)))
        .collect::<Vec<_>>()
        .into()
}

/// One row per correctness value: output 1, ground truth 1 when correct, 0 otherwise.
pub fn labelled_batch(prefix: &str, offset: usize, errors: &[f64]) -> Batch {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let truth = if *e > 0.5 { 0 } else { 1 };
            Row::new(format!("{prefix}-{}", offset + i))
                .with_output(1)
                .with_ground_truth(truth)
        })
        .collect::<Vec<_>>()
        .into()
}

/// A single aggregate update: one entity's value at one counter reading.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateUpdate {
    pub aggregate_id: String,
    pub count: u64,
    pub value: Vec<f64>,
}

impl AggregateUpdate {
    pub fn new(aggregate_id: impl Into<String>, count: u64, value: Vec<f64>) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            count,
            value,
        }
    }

    /// Row layout used by tracker tests: `inputs.embs`, `extra.user_id`,
    /// `extra.num_messages`.
    pub fn to_row(&self, row_id: impl Into<String>) -> Row {
        Row::new(row_id)
            .with_input("embs", json!(self.value))
            .with_extra("user_id", self.aggregate_id.clone())
            .with_extra("num_messages", self.count)
    }
}

pub fn aggregate_batch(updates: &[AggregateUpdate]) -> Batch {
    updates
        .iter()
        .enumerate()
        .map(|(i, u)| u.to_row(format!("row-{i}")))
        .collect::<Vec<_>>()
        .into()
}

/// Random-walk updates for `ids` entities, each receiving `steps` updates
/// with strictly increasing counts.
pub fn aggregate_update_stream(seed: u64, ids: usize, steps: usize, dims: usize) -> Vec<AggregateUpdate> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state: Vec<(u64, Vec<f64>)> = (0..ids)
        .map(|_| (0, (0..dims).map(|_| rng.gen_range(-1.0..1.0)).collect()))
        .collect();
    let mut updates = Vec::with_capacity(ids * steps);
    for _ in 0..steps {
        for (id, (count, value)) in state.iter_mut().enumerate() {
            *count += rng.gen_range(1..=150);
            for v in value.iter_mut() {
                *v += rng.gen_range(-0.1..0.1);
            }
            updates.push(AggregateUpdate::new(format!("user-{id}"), *count, value.clone()));
        }
    }
    updates
}
