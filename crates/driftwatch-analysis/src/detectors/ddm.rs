use driftwatch_core::config::DdmParams;

use super::{ChangeDetector, DetectorState};

/// Drift Detection Method over an error indicator stream.
///
/// Tracks `mean + std` of the error rate and compares it against the
/// minimum seen after warm-up. Statistics reset on drift, so a second
/// drift can be detected after a fresh warm-up.
#[derive(Debug, Clone)]
pub struct Ddm {
    params: DdmParams,
    n: u64,
    mean: f64,
    std: f64,
    mean_min: f64,
    std_min: f64,
}

impl Ddm {
    pub fn new(params: DdmParams) -> Self {
        Self {
            params,
            n: 0,
            mean: 0.0,
            std: 0.0,
            mean_min: f64::INFINITY,
            std_min: f64::INFINITY,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }
}

impl ChangeDetector for Ddm {
    fn update(&mut self, x: f64) -> DetectorState {
        self.n += 1;
        self.mean += (x - self.mean) / self.n as f64;
        self.std = (self.mean * (1.0 - self.mean) / self.n as f64).max(0.0).sqrt();

        if self.n < self.params.warm_start {
            return DetectorState::Stable;
        }

        let level = self.mean + self.std;
        if level <= self.mean_min + self.std_min {
            self.mean_min = self.mean;
            self.std_min = self.std;
        }

        if level > self.mean_min + self.params.alarm_threshold * self.std_min {
            tracing::debug!(
                n = self.n,
                mean = self.mean,
                mean_min = self.mean_min,
                std_min = self.std_min,
                "ddm alarm"
            );
            self.reset();
            DetectorState::Drift
        } else if level > self.mean_min + self.params.warn_threshold * self.std_min {
            DetectorState::Warning
        } else {
            DetectorState::Stable
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.params.clone());
    }

    fn observations(&self) -> u64 {
        self.n
    }
}
