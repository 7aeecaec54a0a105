//! Online change detectors for a streaming 0/1 (or bounded real) signal.

mod adwin;
mod ddm;

pub use adwin::Adwin;
pub use ddm::Ddm;

use serde::Serialize;

use driftwatch_core::config::DetectorConfig;

/// Outcome of feeding one observation to a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorState {
    Stable,
    Warning,
    Drift,
}

pub trait ChangeDetector {
    fn update(&mut self, x: f64) -> DetectorState;

    fn reset(&mut self);

    /// Observations currently contributing to the detector's statistics.
    fn observations(&self) -> u64;
}

/// A detector resolved from configuration.
#[derive(Debug, Clone)]
pub enum Detector {
    Ddm(Ddm),
    Adwin(Adwin),
}

impl Detector {
    pub fn from_config(config: &DetectorConfig) -> Self {
        match config {
            DetectorConfig::Ddm(params) => Self::Ddm(Ddm::new(params.clone())),
            DetectorConfig::Adwin(params) => Self::Adwin(Adwin::new(params.clone())),
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Ddm(_) => "ddm",
            Self::Adwin(_) => "adwin",
        }
    }

    /// DDM monitors the error rate, ADWIN the raw signal.
    pub fn consumes_errors(&self) -> bool {
        matches!(self, Self::Ddm(_))
    }
}

impl ChangeDetector for Detector {
    fn update(&mut self, x: f64) -> DetectorState {
        match self {
            Self::Ddm(d) => d.update(x),
            Self::Adwin(a) => a.update(x),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Ddm(d) => d.reset(),
            Self::Adwin(a) => a.reset(),
        }
    }

    fn observations(&self) -> u64 {
        match self {
            Self::Ddm(d) => d.observations(),
            Self::Adwin(a) => a.observations(),
        }
    }
}
