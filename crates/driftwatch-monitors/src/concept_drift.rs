//! Concept drift: per-row correctness fed through an online change detector.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use driftwatch_analysis::{ChangeDetector, Detector, DetectorState};
use driftwatch_core::config::{ConceptDriftConfig, DetectorConfig, MeasurableArgs};
use driftwatch_core::errors::{DriftwatchError, DriftwatchResult};
use driftwatch_core::models::{AlertSeverity, Batch, DriftAlert, DriftAlertCategory};
use driftwatch_core::traits::{ILogSink, IMeasurable, Labels};
use driftwatch_observability::tracing_setup::events;

use crate::context::MonitorContext;
use crate::measurables::{compute_rows, resolve_measurable};
use crate::report::SkippedRow;

pub const DASHBOARD: &str = "concept_drift";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConceptDriftReport {
    /// Rows fed to the detector.
    pub observations: usize,
    /// Cumulative average of the correctness signal after this batch.
    pub avg_accuracy: f64,
    /// Transitions into the warning zone during this batch.
    pub warnings: usize,
    pub alerts: Vec<DriftAlert>,
    pub skipped: Vec<SkippedRow>,
}

pub struct ConceptDriftMonitor {
    name: String,
    measurable: Arc<dyn IMeasurable>,
    detector: Detector,
    /// Reported as the alert threshold: DDM's alarm multiplier or ADWIN's delta.
    threshold: f64,
    sink: Arc<dyn ILogSink>,
    count: u64,
    correct: f64,
    state: DetectorState,
}

impl ConceptDriftMonitor {
    pub fn new(config: &ConceptDriftConfig, ctx: &MonitorContext) -> DriftwatchResult<Self> {
        let args = config.measurable_args.clone().unwrap_or(MeasurableArgs::Accuracy);
        let threshold = match &config.detector {
            DetectorConfig::Ddm(p) => p.alarm_threshold,
            DetectorConfig::Adwin(p) => p.delta,
        };
        Ok(Self {
            name: config.name.clone(),
            measurable: resolve_measurable(&args, &ctx.registry)?,
            detector: Detector::from_config(&config.detector),
            threshold,
            sink: Arc::clone(&ctx.sink),
            count: 0,
            correct: 0.0,
            state: DetectorState::Stable,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn need_ground_truth(&self) -> bool {
        true
    }

    /// Observations seen so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn avg_accuracy(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.correct / self.count as f64
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn check(&mut self, batch: &Batch) -> DriftwatchResult<ConceptDriftReport> {
        let mut report = ConceptDriftReport::default();
        let plot = format!("avg_accuracy_{}", self.name);
        let labels = Labels::new();

        for (row, datum) in batch.iter().zip(compute_rows(self.measurable.as_ref(), batch)?) {
            let value = match datum.and_then(|d| {
                d.as_f64().ok_or_else(|| {
                    DriftwatchError::invalid_value(self.measurable.name(), "correctness must be numeric")
                })
            }) {
                Ok(v) => v,
                Err(e) if e.is_row_level() => {
                    report.skipped.push(SkippedRow::record(&self.name, &row.id, &e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.count += 1;
            self.correct += value;
            report.observations += 1;
            let avg = self.avg_accuracy();
            self.sink.add_scalars(
                &plot,
                &BTreeMap::from([("y_avg_accuracy".to_string(), avg)]),
                self.count,
                DASHBOARD,
                &labels,
            );

            let signal = if self.detector.consumes_errors() {
                1.0 - value
            } else {
                value
            };
            let state = self.detector.update(signal);
            match state {
                DetectorState::Drift if self.state != DetectorState::Drift => {
                    let alert = self.alert(avg);
                    events::drift_detected(&self.name, &alert.metric, avg, self.threshold, self.count);
                    self.sink.add_alert(&alert);
                    report.alerts.push(alert);
                }
                DetectorState::Warning if self.state == DetectorState::Stable => {
                    events::drift_warning(&self.name, self.detector.algorithm(), self.count);
                    report.warnings += 1;
                }
                _ => {}
            }
            self.state = state;
        }

        report.avg_accuracy = self.avg_accuracy();
        Ok(report)
    }

    fn alert(&self, avg_accuracy: f64) -> DriftAlert {
        DriftAlert::new(
            self.name.clone(),
            DriftAlertCategory::ConceptDrift,
            AlertSeverity::Critical,
            self.count,
            self.detector.algorithm(),
            avg_accuracy,
            self.threshold,
            format!(
                "{} detected concept drift at observation {} (average accuracy {avg_accuracy:.4})",
                self.detector.algorithm(),
                self.count
            ),
        )
    }
}
