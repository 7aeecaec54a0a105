use std::collections::BTreeMap;

use driftwatch_core::models::DriftAlert;
use driftwatch_core::traits::{ILogSink, Labels};

use crate::tracing_setup::events;

/// Writes every metric as a structured `tracing` event. Useful when the
/// log pipeline itself is the dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

fn render<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

impl ILogSink for TracingSink {
    fn add_scalars(
        &self,
        plot_name: &str,
        values: &BTreeMap<String, f64>,
        step: u64,
        dashboard: &str,
        labels: &Labels,
    ) {
        tracing::info!(
            event = "scalars",
            plot = %plot_name,
            dashboard = %dashboard,
            step = step,
            values = %render(values),
            labels = %render(labels),
        );
    }

    fn add_histogram(&self, plot_name: &str, values: &[f64], dashboard: &str, labels: &Labels) {
        tracing::info!(
            event = "histogram",
            plot = %plot_name,
            dashboard = %dashboard,
            samples = values.len(),
            values = %render(&values),
            labels = %render(labels),
        );
    }

    fn add_bar_graphs(&self, plot_name: &str, bars: &BTreeMap<String, f64>, dashboard: &str) {
        tracing::info!(
            event = "bar_graphs",
            plot = %plot_name,
            dashboard = %dashboard,
            bars = %render(bars),
        );
    }

    fn add_alert(&self, alert: &DriftAlert) {
        events::drift_detected(
            &alert.monitor,
            &alert.metric,
            alert.value,
            alert.threshold,
            alert.count,
        );
    }
}
