//! Drift alerts raised by the concept-drift and data-drift monitors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity level for drift alerts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// What kind of drift an alert reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DriftAlertCategory {
    /// The relationship between inputs and ground truth changed.
    ConceptDrift,
    /// A scalar feature's distribution moved away from the reference.
    FeatureDrift,
    /// An embedding population moved away from the reference clusters.
    EmbeddingDrift,
}

/// A single drift alert. Immutable once emitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriftAlert {
    /// Name of the monitor that raised the alert.
    pub monitor: String,
    pub category: DriftAlertCategory,
    pub severity: AlertSeverity,
    /// Observation count at which drift was detected.
    pub count: u64,
    /// Metric name (`psi`, `transport_cost`, `ddm`, `adwin`...).
    pub metric: String,
    /// Metric value that crossed the threshold.
    pub value: f64,
    pub threshold: f64,
    /// Human-readable description.
    pub message: String,
    pub detected_at: DateTime<Utc>,
}

impl DriftAlert {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        monitor: impl Into<String>,
        category: DriftAlertCategory,
        severity: AlertSeverity,
        count: u64,
        metric: impl Into<String>,
        value: f64,
        threshold: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            monitor: monitor.into(),
            category,
            severity,
            count,
            metric: metric.into(),
            value,
            threshold,
            message: message.into(),
            detected_at: Utc::now(),
        }
    }
}
