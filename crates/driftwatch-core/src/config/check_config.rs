//! Check configuration: the closed set of monitor kinds, tagged on `type`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::defaults;
use super::measurable_args::{LabelArgs, MeasurableArgs};
use crate::errors::{ConfigError, DriftwatchResult};

/// Distance strategy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceType {
    #[serde(alias = "cosine")]
    CosineDistance,
    #[serde(alias = "l2")]
    L2Distance,
    NormRatio,
    #[serde(alias = "hamming")]
    HammingDistance,
}

impl DistanceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CosineDistance => "cosine_distance",
            Self::L2Distance => "l2_distance",
            Self::NormRatio => "norm_ratio",
            Self::HammingDistance => "hamming_distance",
        }
    }
}

/// What a tracker compares the current value against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// The first value seen for the aggregate id.
    #[default]
    Initial,
    /// The immediately preceding value for the aggregate id.
    RunningDiff,
}

impl ReferenceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::RunningDiff => "running_diff",
        }
    }
}

/// DDM parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdmParams {
    /// Observations before the detector starts comparing.
    pub warm_start: u64,
    #[serde(alias = "warn_thres")]
    pub warn_threshold: f64,
    #[serde(alias = "alarm_thres")]
    pub alarm_threshold: f64,
}

impl Default for DdmParams {
    fn default() -> Self {
        Self {
            warm_start: defaults::DEFAULT_DDM_WARM_START,
            warn_threshold: defaults::DEFAULT_DDM_WARN_THRESHOLD,
            alarm_threshold: defaults::DEFAULT_DDM_ALARM_THRESHOLD,
        }
    }
}

/// ADWIN parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdwinParams {
    pub delta: f64,
    /// Cut checks run every `clock` updates.
    pub clock: u32,
    /// Buckets per level before two are merged.
    pub max_buckets: usize,
    pub min_window_length: u64,
    pub grace_period: u64,
}

impl Default for AdwinParams {
    fn default() -> Self {
        Self {
            delta: defaults::DEFAULT_ADWIN_DELTA,
            clock: defaults::DEFAULT_ADWIN_CLOCK,
            max_buckets: defaults::DEFAULT_ADWIN_MAX_BUCKETS,
            min_window_length: defaults::DEFAULT_ADWIN_MIN_WINDOW_LENGTH,
            grace_period: defaults::DEFAULT_ADWIN_GRACE_PERIOD,
        }
    }
}

/// Change detector selection, tagged on `algorithm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum DetectorConfig {
    #[serde(alias = "DDM")]
    Ddm(DdmParams),
    #[serde(alias = "ADWIN")]
    Adwin(AdwinParams),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::Ddm(DdmParams::default())
    }
}

impl DetectorConfig {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Ddm(_) => "ddm",
            Self::Adwin(_) => "adwin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptDriftConfig {
    #[serde(default = "concept_drift_name")]
    pub name: String,
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Per-row correctness signal. Defaults to `accuracy`.
    #[serde(default)]
    pub measurable_args: Option<MeasurableArgs>,
}

fn concept_drift_name() -> String {
    "concept_drift".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDriftConfig {
    pub name: String,
    pub measurable_args: MeasurableArgs,
    /// JSON array of reference records.
    pub reference_dataset: PathBuf,
    #[serde(default = "defaults::initial_skip")]
    pub initial_skip: u64,
    #[serde(default = "defaults::num_buckets")]
    pub num_buckets: usize,
    #[serde(default = "defaults::psi_threshold")]
    pub psi_threshold: f64,
    #[serde(default = "defaults::emd_threshold")]
    pub emd_threshold: f64,
    /// Cluster whole vectors instead of bucketing each dimension.
    #[serde(default)]
    pub is_embedding: bool,
    /// Report rows far from their assigned bucket.
    #[serde(default)]
    pub flag_edge_cases: bool,
    #[serde(default = "defaults::edge_case_spread_ratio")]
    pub edge_case_spread_ratio: f64,
    #[serde(default = "defaults::kmeans_seed")]
    pub seed: u64,
    #[serde(default = "defaults::kmeans_max_iterations")]
    pub max_iterations: usize,
}

/// Arguments shared by the three aggregate trackers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerArgs {
    pub name: String,
    /// The tracked value.
    pub measurable_args: MeasurableArgs,
    /// Identifies the entity a row belongs to.
    pub aggregate_args: MeasurableArgs,
    /// The entity's monotonically increasing counter.
    pub count_args: MeasurableArgs,
    pub distance_types: Vec<DistanceType>,
    #[serde(default)]
    pub reference: ReferenceMode,
    #[serde(default)]
    pub model_args: Vec<LabelArgs>,
    /// Annotation measurables forwarded as labels.
    #[serde(default)]
    pub feature_args: Vec<MeasurableArgs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceTrackerConfig {
    #[serde(flatten)]
    pub tracker: TrackerArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    #[serde(flatten)]
    pub tracker: TrackerArgs,
    pub count_checkpoints: Vec<u64>,
    #[serde(default = "defaults::summary_interval")]
    pub summary_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(flatten)]
    pub tracker: TrackerArgs,
    pub count_checkpoints: Vec<u64>,
    #[serde(default = "defaults::distribution_sample_size")]
    pub sample_size: usize,
    #[serde(default = "defaults::distribution_seed")]
    pub seed: u64,
}

/// One configured check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckConfig {
    ConceptDrift(ConceptDriftConfig),
    DataDrift(DataDriftConfig),
    Distance(DistanceTrackerConfig),
    Convergence(ConvergenceConfig),
    Distribution(DistributionConfig),
}

impl CheckConfig {
    /// Parse a single check from its JSON form.
    pub fn from_json(value: &Value) -> DriftwatchResult<Self> {
        let config: Self = serde_json::from_value(value.clone()).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConceptDrift(_) => "concept_drift",
            Self::DataDrift(_) => "data_drift",
            Self::Distance(_) => "distance",
            Self::Convergence(_) => "convergence",
            Self::Distribution(_) => "distribution",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ConceptDrift(c) => &c.name,
            Self::DataDrift(c) => &c.name,
            Self::Distance(c) => &c.tracker.name,
            Self::Convergence(c) => &c.tracker.name,
            Self::Distribution(c) => &c.tracker.name,
        }
    }

    /// Range checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::ConceptDrift(c) => match &c.detector {
                DetectorConfig::Ddm(p) => {
                    positive("warn_threshold", p.warn_threshold)?;
                    positive("alarm_threshold", p.alarm_threshold)
                }
                DetectorConfig::Adwin(p) => {
                    if !(p.delta > 0.0 && p.delta < 1.0) {
                        return Err(ConfigError::invalid("delta", "must be in (0, 1)"));
                    }
                    if p.clock == 0 {
                        return Err(ConfigError::invalid("clock", "must be at least 1"));
                    }
                    if p.max_buckets == 0 {
                        return Err(ConfigError::invalid("max_buckets", "must be at least 1"));
                    }
                    Ok(())
                }
            },
            Self::DataDrift(c) => {
                if c.initial_skip == 0 {
                    return Err(ConfigError::invalid("initial_skip", "must be at least 1"));
                }
                if c.num_buckets == 0 {
                    return Err(ConfigError::invalid("num_buckets", "must be at least 1"));
                }
                positive("psi_threshold", c.psi_threshold)?;
                positive("emd_threshold", c.emd_threshold)
            }
            Self::Distance(c) => validate_tracker(&c.tracker),
            Self::Convergence(c) => {
                validate_tracker(&c.tracker)?;
                if c.summary_interval == 0 {
                    return Err(ConfigError::invalid("summary_interval", "must be at least 1"));
                }
                Ok(())
            }
            Self::Distribution(c) => {
                validate_tracker(&c.tracker)?;
                if c.sample_size == 0 {
                    return Err(ConfigError::invalid("sample_size", "must be at least 1"));
                }
                Ok(())
            }
        }
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn validate_tracker(args: &TrackerArgs) -> Result<(), ConfigError> {
    if args.distance_types.is_empty() {
        return Err(ConfigError::MissingArgument {
            argument: "distance_types".to_string(),
            context: args.name.clone(),
        });
    }
    Ok(())
}
