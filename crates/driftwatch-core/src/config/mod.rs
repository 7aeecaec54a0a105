pub mod cache_config;
pub mod check_config;
pub mod defaults;
pub mod measurable_args;
pub mod observability_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::{CacheBackend, CacheConfig};
pub use check_config::{
    AdwinParams, CheckConfig, ConceptDriftConfig, ConvergenceConfig, DataDriftConfig, DdmParams,
    DetectorConfig, DistanceTrackerConfig, DistanceType, DistributionConfig, ReferenceMode,
    TrackerArgs,
};
pub use measurable_args::{ConditionArgs, ConditionFormula, FeatureRef, LabelArgs, MeasurableArgs};
pub use observability_config::ObservabilityConfig;

use crate::errors::{ConfigError, DriftwatchError, DriftwatchResult};

/// Top-level engine configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftwatchConfig {
    pub cache: CacheConfig,
    pub observability: ObservabilityConfig,
    pub checks: Vec<CheckConfig>,
}

impl DriftwatchConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> DriftwatchResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        for check in &config.checks {
            check.validate()?;
        }
        Ok(config)
    }

    /// Load config from a TOML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> DriftwatchResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| DriftwatchError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }
}
