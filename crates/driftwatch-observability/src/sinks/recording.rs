use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use driftwatch_core::models::DriftAlert;
use driftwatch_core::traits::{ILogSink, Labels};

/// One call made against a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkRecord {
    Scalars {
        plot: String,
        values: BTreeMap<String, f64>,
        step: u64,
        dashboard: String,
        labels: Labels,
    },
    Histogram {
        plot: String,
        values: Vec<f64>,
        dashboard: String,
        labels: Labels,
    },
    BarGraphs {
        plot: String,
        bars: BTreeMap<String, f64>,
        dashboard: String,
    },
    Alert(DriftAlert),
}

/// Keeps every emitted record in memory, in call order. Used by tests and
/// by callers that render dashboards themselves.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<SinkRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, record: SinkRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    pub fn records(&self) -> Vec<SinkRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }

    pub fn alerts(&self) -> Vec<DriftAlert> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Alert(alert) => Some(alert),
                _ => None,
            })
            .collect()
    }

    /// `(step, values, labels)` for every scalar point on `plot`.
    pub fn scalars(&self, plot: &str) -> Vec<(u64, BTreeMap<String, f64>, Labels)> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Scalars {
                    plot: p,
                    values,
                    step,
                    labels,
                    ..
                } if p == plot => Some((step, values, labels)),
                _ => None,
            })
            .collect()
    }

    /// `(values, labels)` for every histogram on `plot`.
    pub fn histograms(&self, plot: &str) -> Vec<(Vec<f64>, Labels)> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                SinkRecord::Histogram {
                    plot: p,
                    values,
                    labels,
                    ..
                } if p == plot => Some((values, labels)),
                _ => None,
            })
            .collect()
    }

    /// Distinct plot names, in first-emitted order.
    pub fn plot_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for record in self.records() {
            let name = match record {
                SinkRecord::Scalars { plot, .. }
                | SinkRecord::Histogram { plot, .. }
                | SinkRecord::BarGraphs { plot, .. } => plot,
                SinkRecord::Alert(_) => continue,
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl ILogSink for RecordingSink {
    fn add_scalars(
        &self,
        plot_name: &str,
        values: &BTreeMap<String, f64>,
        step: u64,
        dashboard: &str,
        labels: &Labels,
    ) {
        self.push(SinkRecord::Scalars {
            plot: plot_name.to_string(),
            values: values.clone(),
            step,
            dashboard: dashboard.to_string(),
            labels: labels.clone(),
        });
    }

    fn add_histogram(&self, plot_name: &str, values: &[f64], dashboard: &str, labels: &Labels) {
        self.push(SinkRecord::Histogram {
            plot: plot_name.to_string(),
            values: values.to_vec(),
            dashboard: dashboard.to_string(),
            labels: labels.clone(),
        });
    }

    fn add_bar_graphs(&self, plot_name: &str, bars: &BTreeMap<String, f64>, dashboard: &str) {
        self.push(SinkRecord::BarGraphs {
            plot: plot_name.to_string(),
            bars: bars.clone(),
            dashboard: dashboard.to_string(),
        });
    }

    fn add_alert(&self, alert: &DriftAlert) {
        self.push(SinkRecord::Alert(alert.clone()));
    }
}
