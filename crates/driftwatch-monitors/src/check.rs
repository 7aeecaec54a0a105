//! The closed set of checks, built once from config and dispatched per batch.

use std::sync::Arc;

use serde::Serialize;

use driftwatch_cache::open_state_cache;
use driftwatch_core::config::{CheckConfig, DriftwatchConfig};
use driftwatch_core::errors::DriftwatchResult;
use driftwatch_core::models::{Batch, DriftAlert};
use driftwatch_core::traits::ILogSink;
use driftwatch_observability::check_span;
use driftwatch_observability::tracing_setup::events;

use crate::concept_drift::{ConceptDriftMonitor, ConceptDriftReport};
use crate::context::MonitorContext;
use crate::data_drift::{DataDriftMonitor, DataDriftReport};
use crate::trackers::{
    ConvergenceReport, ConvergenceTracker, DistanceReport, DistanceTracker, DistributionReport,
    DistributionTracker,
};

pub enum Check {
    ConceptDrift(ConceptDriftMonitor),
    DataDrift(DataDriftMonitor),
    Distance(DistanceTracker),
    Convergence(ConvergenceTracker),
    Distribution(DistributionTracker),
}

/// What one check produced for one batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckOutcome {
    ConceptDrift(ConceptDriftReport),
    DataDrift(DataDriftReport),
    Distance(DistanceReport),
    Convergence(ConvergenceReport),
    Distribution(DistributionReport),
    /// The batch did not satisfy the check's input contract.
    Skipped { reason: String },
}

impl CheckOutcome {
    pub fn alerts(&self) -> Vec<DriftAlert> {
        match self {
            Self::ConceptDrift(r) => r.alerts.clone(),
            Self::DataDrift(r) => r.alert.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

impl Check {
    /// Validate `config` and build the check it describes.
    pub fn build(config: &CheckConfig, ctx: &MonitorContext) -> DriftwatchResult<Self> {
        config.validate()?;
        Ok(match config {
            CheckConfig::ConceptDrift(c) => Self::ConceptDrift(ConceptDriftMonitor::new(c, ctx)?),
            CheckConfig::DataDrift(c) => Self::DataDrift(DataDriftMonitor::new(c, ctx)?),
            CheckConfig::Distance(c) => Self::Distance(DistanceTracker::new(c, ctx)?),
            CheckConfig::Convergence(c) => Self::Convergence(ConvergenceTracker::new(c, ctx)?),
            CheckConfig::Distribution(c) => Self::Distribution(DistributionTracker::new(c, ctx)?),
        })
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
            Self::ConceptDrift(m) => m.name(),
            Self::DataDrift(m) => m.name(),
            Self::Distance(t) => t.name(),
            Self::Convergence(t) => t.name(),
            Self::Distribution(t) => t.name(),
        }
    }

    pub fn need_ground_truth(&self) -> bool {
        match self {
            Self::ConceptDrift(m) => m.need_ground_truth(),
            Self::DataDrift(m) => m.need_ground_truth(),
            Self::Distance(t) => t.need_ground_truth(),
            Self::Convergence(t) => t.need_ground_truth(),
            Self::Distribution(t) => t.need_ground_truth(),
        }
    }

    pub fn check(&mut self, batch: &Batch) -> DriftwatchResult<CheckOutcome> {
        let span = check_span!(self.kind(), self.name(), batch.len());
        let _guard = span.enter();

        Ok(match self {
            Self::ConceptDrift(m) => CheckOutcome::ConceptDrift(m.check(batch)?),
            Self::DataDrift(m) => CheckOutcome::DataDrift(m.check(batch)?),
            Self::Distance(t) => CheckOutcome::Distance(t.check(batch)?),
            Self::Convergence(t) => CheckOutcome::Convergence(t.check(batch)?),
            Self::Distribution(t) => CheckOutcome::Distribution(t.check(batch)?),
        })
    }
}

/// A check that could not be built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildFailure {
    pub kind: String,
    pub name: String,
    pub error: String,
}

/// Every configured check, dispatched together.
pub struct CheckSet {
    checks: Vec<Check>,
    failures: Vec<BuildFailure>,
}

impl CheckSet {
    /// Build every check. A check that fails to build is logged and
    /// reported in [`CheckSet::failures`]; the others are still built.
    pub fn build(configs: &[CheckConfig], ctx: &MonitorContext) -> Self {
        let mut checks = Vec::with_capacity(configs.len());
        let mut failures = Vec::new();
        for config in configs {
            match Check::build(config, ctx) {
                Ok(check) => checks.push(check),
                Err(e) => {
                    let error = e.to_string();
                    events::check_build_failed(config.kind(), config.name(), &error);
                    failures.push(BuildFailure {
                        kind: config.kind().to_string(),
                        name: config.name().to_string(),
                        error,
                    });
                }
            }
        }
        tracing::info!(checks = checks.len(), failures = failures.len(), "check set built");
        Self { checks, failures }
    }

    /// Open the configured state cache and build every configured check.
    pub fn from_config(
        config: &DriftwatchConfig,
        sink: Arc<dyn ILogSink>,
        data_dir: impl Into<std::path::PathBuf>,
    ) -> DriftwatchResult<Self> {
        let cache = open_state_cache(&config.cache)?;
        let ctx = MonitorContext::new(sink, cache).with_data_dir(data_dir);
        Ok(Self::build(&config.checks, &ctx))
    }

    /// Run `batch` through every check, in configuration order. Checks
    /// needing ground truth are skipped on batches without it. One check's
    /// error does not stop the others.
    pub fn dispatch(&mut self, batch: &Batch) -> Vec<(String, DriftwatchResult<CheckOutcome>)> {
        let has_ground_truth = batch.has_ground_truth();
        self.checks
            .iter_mut()
            .map(|check| {
                let name = check.name().to_string();
                if check.need_ground_truth() && !has_ground_truth {
                    tracing::debug!(check = %name, "batch has no ground truth, skipping");
                    return (
                        name,
                        Ok(CheckOutcome::Skipped {
                            reason: "batch has no ground truth".to_string(),
                        }),
                    );
                }
                let outcome = check.check(batch);
                if let Err(e) = &outcome {
                    tracing::error!(check = %name, error = %e, "check failed on batch");
                }
                (name, outcome)
            })
            .collect()
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Check> {
        self.checks.iter_mut().find(|c| c.name() == name)
    }

    pub fn failures(&self) -> &[BuildFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
