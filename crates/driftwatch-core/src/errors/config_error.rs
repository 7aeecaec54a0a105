/// Setup-time configuration errors. Fatal to the check being built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown {kind}: '{name}'")]
    Unknown { kind: String, name: String },

    #[error("missing required argument '{argument}' for {context}")]
    MissingArgument { argument: String, context: String },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("failed to parse configuration: {reason}")]
    Parse { reason: String },
}

impl ConfigError {
    pub fn unknown(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Unknown {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
