use thiserror::Error;

/// Error types for the parambind-rs library.
#[derive(Error, Debug)]
pub enum ParamBindError {
    /// Value rejected by the parameter's own constraints.
    #[error("Cannot set parameter '{name}': {message}")]
    Validation { name: String, message: String },

    /// A watcher callback failed while notifications were being flushed.
    #[error("Watcher failed: {0}")]
    Watcher(String),

    /// Rolling back after a watcher failure failed as well.
    #[error("Watcher failed: {original}; restoring the previous value also failed: {restore}")]
    Restore { original: String, restore: String },

    /// Malformed or unsatisfiable schema, reported at construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Free-text control content cannot be parsed into the parameter's domain.
    #[error("Invalid value, {expected} expected")]
    Format { expected: String },

    /// Parameter not found.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse classification handed to the host's message-display primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Validation,
    Watcher,
    Restore,
    Configuration,
    Format,
    Internal,
}

impl ParamBindError {
    /// The message kind a host would display this error under.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Validation { .. } => MessageKind::Validation,
            Self::Watcher(_) => MessageKind::Watcher,
            Self::Restore { .. } => MessageKind::Restore,
            Self::Configuration(_) => MessageKind::Configuration,
            Self::Format { .. } => MessageKind::Format,
            Self::ParameterNotFound(_) | Self::IoError(_) | Self::JsonError(_) => {
                MessageKind::Internal
            }
        }
    }
}

/// Result type alias for parambind-rs operations.
pub type Result<T> = std::result::Result<T, ParamBindError>;

// Schema construction problems surface as configuration errors.
impl From<crate::schema::SchemaError> for ParamBindError {
    fn from(err: crate::schema::SchemaError) -> Self {
        ParamBindError::Configuration(format!("{}", err))
    }
}

impl From<crate::schema::BoundsError> for ParamBindError {
    fn from(err: crate::schema::BoundsError) -> Self {
        ParamBindError::Configuration(format!("{}", err))
    }
}
