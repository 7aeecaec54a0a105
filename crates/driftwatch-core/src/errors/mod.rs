mod cache_error;
mod config_error;

pub use cache_error::CacheError;
pub use config_error::ConfigError;

/// Top-level error for every driftwatch operation.
#[derive(Debug, thiserror::Error)]
pub enum DriftwatchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("shape mismatch: base {base:?} vs reference {reference:?}")]
    Shape {
        base: (usize, usize),
        reference: (usize, usize),
    },

    #[error("field '{field}' missing from {section}")]
    MissingField { field: String, section: String },

    #[error("invalid value for {context}: {reason}")]
    InvalidValue { context: String, reason: String },

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DriftwatchError {
    /// Row-level numeric failures that should skip a row instead of aborting the batch.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Self::Shape { .. } | Self::InvalidValue { .. })
    }

    pub fn invalid_value(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>, section: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            section: section.into(),
        }
    }
}

impl From<serde_json::Error> for DriftwatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience alias used across all crates.
pub type DriftwatchResult<T> = Result<T, DriftwatchError>;
