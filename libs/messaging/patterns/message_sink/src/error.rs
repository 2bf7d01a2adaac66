/// Failures of the accelerated sender during resolution or teardown
///
/// None of these reach the sink's caller: resolution errors end in the
/// fallback, teardown errors are logged and discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("Accelerated sender '{loader}' unavailable: {reason}")]
    Unavailable { loader: String, reason: String },

    #[error("Accelerated sender '{loader}' failed to initialize: {reason}")]
    Construction { loader: String, reason: String },

    #[error("Failed to read sender stats: {0}")]
    Stats(String),

    #[error("Failed to close sender: {0}")]
    Close(String),
}

impl AdapterError {
    pub fn unavailable(loader: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::Unavailable {
            loader: loader.into(),
            reason: reason.into(),
        }
    }

    pub fn construction(loader: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::Construction {
            loader: loader.into(),
            reason: reason.into(),
        }
    }

    /// Name of the loader that produced the error, if any
    pub fn loader(&self) -> Option<&str> {
        match self {
            AdapterError::Unavailable { loader, .. }
            | AdapterError::Construction { loader, .. } => Some(loader),
            _ => None,
        }
    }
}
