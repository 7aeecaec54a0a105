//! Span definitions per operation: check dispatch, reference fitting, cache flushes.

/// Create a span around one check processing one batch.
#[macro_export]
macro_rules! check_span {
    ($kind:expr, $name:expr, $rows:expr) => {
        tracing::info_span!("driftwatch.check", kind = %$kind, name = %$name, rows = $rows)
    };
}

/// Create a span around fitting a reference bucket model.
#[macro_export]
macro_rules! reference_fit_span {
    ($monitor:expr, $records:expr) => {
        tracing::info_span!("driftwatch.reference_fit", monitor = %$monitor, records = $records)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const CHECK: &str = "driftwatch.check";
    pub const REFERENCE_FIT: &str = "driftwatch.reference_fit";
}
