use std::collections::BTreeMap;

use driftwatch_core::models::{AlertSeverity, DriftAlert, DriftAlertCategory};
use driftwatch_core::traits::{ILogSink, Labels};
use driftwatch_observability::tracing_setup::spans::names;
use driftwatch_observability::{RecordingSink, SinkRecord, TracingSink};

fn alert() -> DriftAlert {
    DriftAlert::new(
        "embs",
        DriftAlertCategory::EmbeddingDrift,
        AlertSeverity::Critical,
        1_500,
        "transport_cost",
        0.42,
        0.1,
        "transport cost above threshold",
    )
}

#[test]
fn recording_sink_keeps_call_order() {
    let sink = RecordingSink::new();
    let values = BTreeMap::from([("y_avg_accuracy".to_string(), 0.9)]);
    let labels = Labels::from([("user_id".to_string(), "u1".to_string())]);

    sink.add_scalars("avg_accuracy_concept", &values, 10, "concept_drift", &labels);
    sink.add_histogram("cosine_distance initial", &[0.1, 0.2], "convergence_stats", &Labels::new());
    sink.add_bar_graphs("buckets", &BTreeMap::from([("b0".to_string(), 3.0)]), "data_drift");
    sink.add_alert(&alert());

    let records = sink.records();
    assert_eq!(records.len(), 4);
    assert!(matches!(records[0], SinkRecord::Scalars { step: 10, .. }));
    assert!(matches!(records[3], SinkRecord::Alert(_)));

    assert_eq!(
        sink.plot_names(),
        vec!["avg_accuracy_concept", "cosine_distance initial", "buckets"]
    );
    assert_eq!(sink.alerts().len(), 1);
    assert_eq!(sink.alerts()[0].metric, "transport_cost");

    let points = sink.scalars("avg_accuracy_concept");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].1["y_avg_accuracy"], 0.9);
    assert_eq!(points[0].2["user_id"], "u1");

    assert_eq!(sink.histograms("cosine_distance initial")[0].0, vec![0.1, 0.2]);
    assert!(sink.histograms("nope").is_empty());

    sink.clear();
    assert!(sink.records().is_empty());
}

#[test]
fn sink_records_serialize_with_kind_tag() {
    let record = SinkRecord::Histogram {
        plot: "p".into(),
        values: vec![1.0],
        dashboard: "d".into(),
        labels: Labels::new(),
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["kind"], "histogram");
}

#[test]
fn alert_timestamp_is_recent() {
    let before = chrono::Utc::now();
    let a = alert();
    assert!(a.detected_at >= before);
}

#[test]
fn tracing_sink_accepts_every_call_without_subscriber() {
    let sink = TracingSink;
    sink.add_scalars("p", &BTreeMap::new(), 0, "d", &Labels::new());
    sink.add_histogram("p", &[1.0], "d", &Labels::new());
    sink.add_bar_graphs("p", &BTreeMap::new(), "d");
    sink.add_alert(&alert());
}

#[test]
fn span_names_are_namespaced() {
    assert!(names::CHECK.starts_with("driftwatch."));
    assert!(names::REFERENCE_FIT.starts_with("driftwatch."));
}
