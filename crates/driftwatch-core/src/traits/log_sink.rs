use std::collections::BTreeMap;

use crate::models::DriftAlert;

/// Extra key/value tags attached to an emitted metric.
pub type Labels = BTreeMap<String, String>;

/// Destination for metrics, histograms, and alerts. Rendering is someone else's job.
pub trait ILogSink: Send + Sync {
    /// One point per series on the plot `plot_name`, at x position `step`.
    fn add_scalars(
        &self,
        plot_name: &str,
        values: &BTreeMap<String, f64>,
        step: u64,
        dashboard: &str,
        labels: &Labels,
    );

    fn add_histogram(&self, plot_name: &str, values: &[f64], dashboard: &str, labels: &Labels);

    fn add_bar_graphs(&self, plot_name: &str, bars: &BTreeMap<String, f64>, dashboard: &str);

    fn add_alert(&self, alert: &DriftAlert);
}
