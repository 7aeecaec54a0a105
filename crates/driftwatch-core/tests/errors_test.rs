use driftwatch_core::errors::*;

#[test]
fn shape_error_carries_both_shapes() {
    let err = DriftwatchError::Shape {
        base: (3, 4),
        reference: (3, 5),
    };
    let msg = err.to_string();
    assert!(msg.contains("(3, 4)"));
    assert!(msg.contains("(3, 5)"));
    assert!(err.is_row_level());
}

#[test]
fn invalid_value_is_row_level() {
    let err = DriftwatchError::invalid_value("embedding", "found text");
    assert!(err.is_row_level());
    assert!(err.to_string().contains("embedding"));
}

#[test]
fn missing_field_propagates_not_row_level() {
    let err = DriftwatchError::missing_field("user_id", "extra");
    assert!(!err.is_row_level());
    let msg = err.to_string();
    assert!(msg.contains("user_id"));
    assert!(msg.contains("extra"));
}

#[test]
fn config_error_converts_into_driftwatch_error() {
    let err: DriftwatchError = ConfigError::unknown("custom measurable", "sentiment").into();
    assert!(matches!(err, DriftwatchError::Config(ConfigError::Unknown { .. })));
    assert!(err.to_string().contains("sentiment"));
}

#[test]
fn cache_error_converts_into_driftwatch_error() {
    let err: DriftwatchError = CacheError::SqliteError {
        message: "disk I/O error".into(),
    }
    .into();
    assert!(matches!(err, DriftwatchError::Cache(_)));
    assert!(err.to_string().contains("disk I/O error"));
}

#[test]
fn serde_json_error_maps_to_serialization() {
    let raw = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: DriftwatchError = raw.into();
    assert!(matches!(err, DriftwatchError::Serialization(_)));
}
