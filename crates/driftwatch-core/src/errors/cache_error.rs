/// State cache backend errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("failed to encode cache value for column '{column}': {reason}")]
    Encode { column: String, reason: String },

    #[error("failed to decode cache value for column '{column}': {reason}")]
    Decode { column: String, reason: String },

    #[error("column '{column}' has {values} values for {ids} ids")]
    LengthMismatch {
        column: String,
        ids: usize,
        values: usize,
    },

    #[error("cache lock poisoned")]
    Poisoned,
}
