use driftwatch_core::config::*;
use driftwatch_core::errors::ConfigError;
use driftwatch_core::DriftwatchError;
use serde_json::json;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = DriftwatchConfig::from_toml("").unwrap();

    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.cache.db_path, "driftwatch_state.db");
    assert!(config.cache.wal_mode);
    assert_eq!(config.cache.busy_timeout_ms, 5_000);

    assert_eq!(config.observability.log_level, "info");
    assert!(config.observability.json);

    assert!(config.checks.is_empty());
}

#[test]
fn config_loads_every_check_variant_from_toml() {
    let toml = r#"
[cache]
backend = "sqlite"
db_path = "/tmp/state.db"

[[checks]]
type = "concept_drift"
name = "accuracy_watch"
[checks.detector]
algorithm = "adwin"
delta = 0.01

[[checks]]
type = "data_drift"
name = "embeddings"
reference_dataset = "ref.json"
is_embedding = true
[checks.measurable_args]
type = "input_feature"
feature_name = "embs"

[[checks]]
type = "distance"
name = "user_drift"
distance_types = ["cosine_distance", "l2_distance"]
reference = "running_diff"
measurable_args = { type = "input_feature", feature_name = "embs" }
aggregate_args = { type = "extra", field = "user_id" }
count_args = { type = "extra", field = "num_messages" }

[[checks]]
type = "convergence"
name = "user_convergence"
distance_types = ["norm_ratio"]
count_checkpoints = [0, 200, 500]
measurable_args = { type = "input_feature", feature_name = "embs" }
aggregate_args = { type = "extra", field = "user_id" }
count_args = { type = "extra", field = "num_messages" }

[[checks]]
type = "distribution"
name = "user_distribution"
distance_types = ["cosine"]
count_checkpoints = [0, 1000]
sample_size = 4
measurable_args = { type = "input_feature", feature_name = "embs" }
aggregate_args = { type = "extra", field = "user_id" }
count_args = { type = "extra", field = "num_messages" }
"#;
    let config = DriftwatchConfig::from_toml(toml).unwrap();
    assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    assert_eq!(config.checks.len(), 5);

    let kinds: Vec<_> = config.checks.iter().map(CheckConfig::kind).collect();
    assert_eq!(
        kinds,
        vec!["concept_drift", "data_drift", "distance", "convergence", "distribution"]
    );

    match &config.checks[0] {
        CheckConfig::ConceptDrift(c) => match &c.detector {
            DetectorConfig::Adwin(p) => {
                assert_eq!(p.delta, 0.01);
                assert_eq!(p.clock, 32);
                assert_eq!(p.max_buckets, 5);
            }
            other => panic!("expected adwin, got {other:?}"),
        },
        other => panic!("unexpected {other:?}"),
    }

    match &config.checks[1] {
        CheckConfig::DataDrift(c) => {
            assert!(c.is_embedding);
            assert_eq!(c.initial_skip, 1_000);
            assert_eq!(c.num_buckets, 20);
            assert_eq!(c.psi_threshold, 0.3);
        }
        other => panic!("unexpected {other:?}"),
    }

    match &config.checks[2] {
        CheckConfig::Distance(c) => {
            assert_eq!(c.tracker.reference, ReferenceMode::RunningDiff);
            assert_eq!(
                c.tracker.distance_types,
                vec![DistanceType::CosineDistance, DistanceType::L2Distance]
            );
        }
        other => panic!("unexpected {other:?}"),
    }

    match &config.checks[3] {
        CheckConfig::Convergence(c) => {
            assert_eq!(c.count_checkpoints, vec![0, 200, 500]);
            assert_eq!(c.summary_interval, 50_000);
            assert_eq!(c.tracker.reference, ReferenceMode::Initial);
        }
        other => panic!("unexpected {other:?}"),
    }

    match &config.checks[4] {
        CheckConfig::Distribution(c) => {
            assert_eq!(c.sample_size, 4);
            assert_eq!(c.tracker.distance_types, vec![DistanceType::CosineDistance]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn concept_drift_defaults_to_ddm_on_accuracy() {
    let check = CheckConfig::from_json(&json!({"type": "concept_drift"})).unwrap();
    match check {
        CheckConfig::ConceptDrift(c) => {
            assert_eq!(c.name, "concept_drift");
            assert_eq!(c.detector, DetectorConfig::Ddm(DdmParams::default()));
            assert!(c.measurable_args.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn ddm_accepts_short_threshold_names_and_uppercase_algorithm() {
    let check = CheckConfig::from_json(&json!({
        "type": "concept_drift",
        "detector": {"algorithm": "DDM", "warn_thres": 1.5, "alarm_thres": 2.5}
    }))
    .unwrap();
    match check {
        CheckConfig::ConceptDrift(c) => match c.detector {
            DetectorConfig::Ddm(p) => {
                assert_eq!(p.warn_threshold, 1.5);
                assert_eq!(p.alarm_threshold, 2.5);
                assert_eq!(p.warm_start, 500);
            }
            other => panic!("expected ddm, got {other:?}"),
        },
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_check_type_is_config_error() {
    let err = CheckConfig::from_json(&json!({"type": "telepathy"})).unwrap_err();
    assert!(matches!(err, DriftwatchError::Config(ConfigError::Parse { .. })));
    assert!(err.to_string().contains("telepathy"));
}

#[test]
fn unknown_detector_algorithm_is_config_error() {
    let err = CheckConfig::from_json(&json!({
        "type": "concept_drift",
        "detector": {"algorithm": "page_hinkley"}
    }))
    .unwrap_err();
    assert!(matches!(err, DriftwatchError::Config(_)));
}

#[test]
fn missing_required_argument_is_config_error() {
    let err = CheckConfig::from_json(&json!({
        "type": "data_drift",
        "name": "f",
        "measurable_args": {"type": "input_feature", "feature_name": "x"}
    }))
    .unwrap_err();
    assert!(matches!(err, DriftwatchError::Config(_)));
    assert!(err.to_string().contains("reference_dataset"));
}

#[test]
fn empty_distance_types_is_missing_argument() {
    let err = CheckConfig::from_json(&json!({
        "type": "distance",
        "name": "d",
        "distance_types": [],
        "measurable_args": {"type": "input_feature", "feature_name": "x"},
        "aggregate_args": {"type": "extra", "field": "id"},
        "count_args": {"type": "extra", "field": "n"}
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        DriftwatchError::Config(ConfigError::MissingArgument { .. })
    ));
}

#[test]
fn out_of_range_values_are_rejected() {
    let err = CheckConfig::from_json(&json!({
        "type": "data_drift",
        "name": "f",
        "reference_dataset": "r.json",
        "initial_skip": 0,
        "measurable_args": {"type": "input_feature", "feature_name": "x"}
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        DriftwatchError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn condition_formula_aliases_parse() {
    for (raw, expected) in [
        ("<", ConditionFormula::Lt),
        ("leq", ConditionFormula::Le),
        ("geq", ConditionFormula::Ge),
        (">", ConditionFormula::Gt),
        ("eq", ConditionFormula::Eq),
    ] {
        let parsed: ConditionFormula = serde_json::from_value(json!(raw)).unwrap();
        assert_eq!(parsed, expected, "formula {raw}");
    }
    assert!(serde_json::from_value::<ConditionFormula>(json!("~=")).is_err());
}

#[test]
fn condition_formula_applies_comparison() {
    assert!(ConditionFormula::Lt.apply(1.0, 2.0));
    assert!(!ConditionFormula::Gt.apply(1.0, 2.0));
    assert!(ConditionFormula::Le.apply(2.0, 2.0));
    assert!(ConditionFormula::Eq.apply(2.0, 2.0));
}

#[test]
fn nested_measurable_args_parse() {
    let args: MeasurableArgs = serde_json::from_value(json!({
        "type": "distance",
        "base": {"type": "input_feature", "feature_name": "a"},
        "reference": {"type": "prediction"},
        "distance_types": ["l2"]
    }))
    .unwrap();
    match args {
        MeasurableArgs::Distance {
            base,
            reference,
            distance_types,
        } => {
            assert_eq!(*base, MeasurableArgs::input("a"));
            assert_eq!(*reference, MeasurableArgs::Prediction { feature_name: None });
            assert_eq!(distance_types, vec![DistanceType::L2Distance]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn config_from_missing_file_is_io_error() {
    let err = DriftwatchConfig::from_file("/nonexistent/driftwatch.toml").unwrap_err();
    assert!(matches!(err, DriftwatchError::Io { .. }));
}

#[test]
fn malformed_toml_is_parse_error() {
    let err = DriftwatchConfig::from_toml("[cache\nbackend=").unwrap_err();
    assert!(matches!(err, DriftwatchError::Config(ConfigError::Parse { .. })));
}
