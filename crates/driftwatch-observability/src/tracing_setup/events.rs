//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a drift detection.
pub fn drift_detected(monitor: &str, metric: &str, value: f64, threshold: f64, count: u64) {
    tracing::warn!(
        event = "drift_detected",
        monitor = %monitor,
        metric = %metric,
        value = value,
        threshold = threshold,
        count = count,
        "drift detected"
    );
}

/// Log a change detector entering its warning zone.
pub fn drift_warning(monitor: &str, algorithm: &str, count: u64) {
    tracing::info!(
        event = "drift_warning",
        monitor = %monitor,
        algorithm = %algorithm,
        count = count,
        "change detector warning"
    );
}

/// Log a drift metric dropping back under its threshold.
pub fn drift_cleared(monitor: &str, metric: &str, value: f64, count: u64) {
    tracing::info!(
        event = "drift_cleared",
        monitor = %monitor,
        metric = %metric,
        value = value,
        count = count,
        "drift cleared"
    );
}

/// Log an aggregate id crossing a count checkpoint.
pub fn checkpoint_crossed(tracker: &str, aggregate_id: &str, checkpoint: u64, count: u64) {
    tracing::debug!(
        event = "checkpoint_crossed",
        tracker = %tracker,
        aggregate_id = %aggregate_id,
        checkpoint = checkpoint,
        count = count,
        "checkpoint crossed"
    );
}

/// Log a row skipped because of a row-level numeric failure.
pub fn row_skipped(check: &str, row_id: &str, reason: &str) {
    tracing::warn!(
        event = "row_skipped",
        check = %check,
        row_id = %row_id,
        reason = %reason,
        "row skipped"
    );
}

/// Log a row flagged as far from its reference bucket.
pub fn edge_case_flagged(monitor: &str, row_id: &str, score: f64) {
    tracing::info!(
        event = "edge_case_flagged",
        monitor = %monitor,
        row_id = %row_id,
        score = score,
        "edge case flagged"
    );
}

/// Log a check that could not be built from its configuration.
pub fn check_build_failed(kind: &str, name: &str, error: &str) {
    tracing::error!(
        event = "check_build_failed",
        kind = %kind,
        name = %name,
        error = %error,
        "check build failed"
    );
}

/// Log a loaded and fitted reference dataset.
pub fn reference_fitted(monitor: &str, records: usize, buckets: usize) {
    tracing::info!(
        event = "reference_fitted",
        monitor = %monitor,
        records = records,
        buckets = buckets,
        "reference dataset fitted"
    );
}
