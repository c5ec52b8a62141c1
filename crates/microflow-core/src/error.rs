use thiserror::Error;

/// Core error type for the Microflow engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Instance, definition or correlation key not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, filter or definition
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate definition type or correlation id
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// No transition matches the current state and trigger
    #[error("Invalid transition: no transition for trigger '{trigger}' from state '{state}'")]
    InvalidTransition {
        /// State the instance was in
        state: String,
        /// Trigger that was rejected
        trigger: String,
    },

    /// Persistence failure
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Coarse classification of a [`CoreError`], for callers that map errors to status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CoreError::NotFound`]
    NotFound,
    /// See [`CoreError::ValidationError`]
    Validation,
    /// See [`CoreError::ConflictError`]
    Conflict,
    /// See [`CoreError::InvalidTransition`]
    InvalidTransition,
    /// See [`CoreError::StorageError`]
    Storage,
    /// See [`CoreError::SerializationError`]
    Serialization,
}

impl CoreError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::ValidationError(_) => ErrorKind::Validation,
            CoreError::ConflictError(_) => ErrorKind::Conflict,
            CoreError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            CoreError::StorageError(_) => ErrorKind::Storage,
            CoreError::SerializationError(_) => ErrorKind::Serialization,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        CoreError::StorageError(format!("Lock poisoned: {}", err))
    }
}
