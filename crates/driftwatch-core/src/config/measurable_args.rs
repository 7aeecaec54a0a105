//! Measurable configuration: which value to read (or derive) from each row.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::check_config::DistanceType;
use super::defaults;

/// Comparison used by the `condition_on_*` measurables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionFormula {
    #[serde(rename = "<", alias = "lt")]
    Lt,
    #[serde(rename = "<=", alias = "le", alias = "leq")]
    Le,
    #[serde(rename = ">", alias = "gt")]
    Gt,
    #[serde(rename = ">=", alias = "ge", alias = "geq")]
    Ge,
    #[serde(rename = "==", alias = "eq")]
    Eq,
}

impl ConditionFormula {
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Lt => value < threshold,
            Self::Le => value <= threshold,
            Self::Gt => value > threshold,
            Self::Ge => value >= threshold,
            Self::Eq => value == threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionArgs {
    pub formulae: ConditionFormula,
    pub threshold: f64,
}

/// Names the input feature an embedding is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRef {
    pub feature_name: String,
}

/// Closed set of measurable kinds, tagged on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeasurableArgs {
    InputFeature {
        feature_name: String,
    },
    Prediction {
        #[serde(default)]
        feature_name: Option<String>,
    },
    GroundTruth,
    Extra {
        field: String,
    },
    FeatureConcat {
        feat_name_list: Vec<String>,
    },
    Accuracy,
    Mae,
    Mape,
    ConditionOnInput {
        feature_name: String,
        condition_args: ConditionArgs,
    },
    ConditionOnPrediction {
        #[serde(default)]
        feature_name: Option<String>,
        condition_args: ConditionArgs,
    },
    ScalarFromEmbedding {
        idx: usize,
        extract_from: FeatureRef,
    },
    Distance {
        base: Box<MeasurableArgs>,
        reference: Box<MeasurableArgs>,
        distance_types: Vec<DistanceType>,
    },
    /// A measurable registered by the caller under `name`.
    Custom {
        name: String,
    },
    /// Wraps another measurable in a row-id keyed cache.
    Cached {
        measurable_args: Box<MeasurableArgs>,
        #[serde(default = "defaults::row_cache_capacity")]
        max_capacity: u64,
    },
}

impl MeasurableArgs {
    pub fn input(feature_name: impl Into<String>) -> Self {
        Self::InputFeature {
            feature_name: feature_name.into(),
        }
    }

    pub fn extra(field: impl Into<String>) -> Self {
        Self::Extra {
            field: field.into(),
        }
    }
}

/// A label measurable plus the values it may take. Rows whose label value
/// is outside `allowed_values` are skipped. An empty list allows anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelArgs {
    pub measurable_args: MeasurableArgs,
    #[serde(default)]
    pub allowed_values: Vec<Value>,
}
