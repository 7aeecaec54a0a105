use std::sync::Arc;

use serde_json::json;

use driftwatch_core::config::{CheckConfig, ConceptDriftConfig};
use driftwatch_core::models::{Batch, DriftAlertCategory, Row};
use driftwatch_monitors::{ConceptDriftMonitor, MonitorContext};
use driftwatch_observability::RecordingSink;
use test_fixtures::{error_stream, labelled_batch};

fn concept_config(value: serde_json::Value) -> ConceptDriftConfig {
    match CheckConfig::from_json(&value).unwrap() {
        CheckConfig::ConceptDrift(c) => c,
        other => panic!("expected concept drift, got {other:?}"),
    }
}

fn run_in_batches(monitor: &mut ConceptDriftMonitor, errors: &[f64], batch_size: usize) -> Vec<u64> {
    let mut alerts = Vec::new();
    for (i, chunk) in errors.chunks(batch_size).enumerate() {
        let report = monitor
            .check(&labelled_batch("row", i * batch_size, chunk))
            .unwrap();
        alerts.extend(report.alerts.iter().map(|a| a.count));
    }
    alerts
}

#[test]
fn ddm_alerts_shortly_after_error_rate_step() {
    let sink = Arc::new(RecordingSink::new());
    let ctx = MonitorContext::in_memory(sink.clone());
    let config = concept_config(json!({"type": "concept_drift", "name": "chat"}));
    let mut monitor = ConceptDriftMonitor::new(&config, &ctx).unwrap();

    let errors = error_stream(11, 2_000, 1_000, 0.0, 0.5);
    let alerts = run_in_batches(&mut monitor, &errors, 100);

    let first = *alerts.first().expect("drift should be detected");
    assert!(first > 1_000, "alert before the step at {first}");
    assert!(first <= 1_050, "alert too late at {first}");

    let sink_alerts = sink.alerts();
    assert_eq!(sink_alerts.len(), alerts.len());
    assert_eq!(sink_alerts[0].category, DriftAlertCategory::ConceptDrift);
    assert_eq!(sink_alerts[0].metric, "ddm");
}

#[test]
fn emits_average_accuracy_per_row() {
    let sink = Arc::new(RecordingSink::new());
    let ctx = MonitorContext::in_memory(sink.clone());
    let config = concept_config(json!({"type": "concept_drift", "name": "chat"}));
    let mut monitor = ConceptDriftMonitor::new(&config, &ctx).unwrap();

    let report = monitor.check(&labelled_batch("r", 0, &[0.0, 1.0, 0.0, 0.0])).unwrap();
    assert_eq!(report.observations, 4);
    assert!((report.avg_accuracy - 0.75).abs() < 1e-12);

    let points = sink.scalars("avg_accuracy_chat");
    assert_eq!(points.len(), 4);
    assert_eq!(points.iter().map(|p| p.0).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(points[1].1["y_avg_accuracy"], 0.5);
    assert!(monitor.need_ground_truth());
}

#[test]
fn stable_stream_never_alerts() {
    let sink = Arc::new(RecordingSink::new());
    let ctx = MonitorContext::in_memory(sink.clone());
    let config = concept_config(json!({"type": "concept_drift", "name": "stable"}));
    let mut monitor = ConceptDriftMonitor::new(&config, &ctx).unwrap();

    let alerts = run_in_batches(&mut monitor, &vec![0.0; 3_000], 250);
    assert!(alerts.is_empty());
    assert_eq!(monitor.count(), 3_000);
}

#[test]
fn adwin_detects_accuracy_drop() {
    let sink = Arc::new(RecordingSink::new());
    let ctx = MonitorContext::in_memory(sink.clone());
    let config = concept_config(json!({
        "type": "concept_drift",
        "name": "adwin_chat",
        "detector": {"algorithm": "adwin"}
    }));
    let mut monitor = ConceptDriftMonitor::new(&config, &ctx).unwrap();
    assert_eq!(monitor.detector().algorithm(), "adwin");

    let errors = error_stream(5, 2_000, 1_000, 0.1, 0.8);
    let alerts = run_in_batches(&mut monitor, &errors, 100);
    assert!(
        alerts.iter().any(|c| *c > 1_000 && *c <= 1_300),
        "no alert shortly after the drop: {alerts:?}"
    );
}

#[test]
fn custom_correctness_measurable() {
    let sink = Arc::new(RecordingSink::new());
    let ctx = MonitorContext::in_memory(sink.clone());
    let config = concept_config(json!({
        "type": "concept_drift",
        "name": "latency_ok",
        "measurable_args": {
            "type": "condition_on_input",
            "feature_name": "latency",
            "condition_args": {"formulae": "<", "threshold": 200.0}
        }
    }));
    let mut monitor = ConceptDriftMonitor::new(&config, &ctx).unwrap();
    let batch = Batch::new(vec![
        Row::new("a").with_input("latency", 120).with_ground_truth(1),
        Row::new("b").with_input("latency", 480).with_ground_truth(1),
    ]);
    let report = monitor.check(&batch).unwrap();
    assert!((report.avg_accuracy - 0.5).abs() < 1e-12);
}

#[test]
fn non_numeric_correctness_skips_row() {
    let sink = Arc::new(RecordingSink::new());
    let ctx = MonitorContext::in_memory(sink.clone());
    let config = concept_config(json!({
        "type": "concept_drift",
        "name": "raw",
        "measurable_args": {"type": "extra", "field": "correct"}
    }));
    let mut monitor = ConceptDriftMonitor::new(&config, &ctx).unwrap();
    let batch = Batch::new(vec![
        Row::new("a").with_extra("correct", true).with_ground_truth(1),
        Row::new("b").with_extra("correct", "maybe").with_ground_truth(1),
    ]);
    let report = monitor.check(&batch).unwrap();
    assert_eq!(report.observations, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].row_id, "b");
}
