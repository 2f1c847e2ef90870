//! Error types for sqlgate.
//!
//! Defines the main error enum used throughout the query pipeline and the
//! mapping from errors to result-envelope messages.

use thiserror::Error;

/// Main error type for sqlgate operations.
#[derive(Error, Debug)]
pub enum GateError {
    /// Query rejected by the safety validator (keyword/shape violation).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Natural-language translation failures, including an unreachable
    /// text-generation service.
    #[error("Translation error: {0}")]
    Translation(String),

    /// Driver-level failures (connectivity, syntax, constraint violations).
    #[error("Database error: {0}")]
    Database(String),

    /// Any other runtime failure during statement execution.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Pool exhaustion or other resource-layer failures.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a translation error with the given message.
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    /// Creates a database error with the given message.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates an infrastructure error with the given message.
    pub fn infrastructure(msg: impl Into<String>) -> Self {
        Self::Infrastructure(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Translation(_) => "Translation Error",
            Self::Database(_) => "Database Error",
            Self::Execution(_) => "Execution Error",
            Self::Infrastructure(_) => "Infrastructure Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the human-readable message carried in a result envelope.
    ///
    /// Validation and translation failures keep their own prefixes so the
    /// caller can map them to client errors; driver failures surface as
    /// database errors and everything else as a generic execution failure.
    pub fn envelope_message(&self) -> String {
        match self {
            Self::Validation(reason) => format!("validation failed: {reason}"),
            Self::Translation(msg) => format!("translation failed: {msg}"),
            Self::Database(msg) => format!("database error: {msg}"),
            Self::Execution(msg)
            | Self::Infrastructure(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => format!("execution failed: {msg}"),
        }
    }
}

/// Result type alias using GateError.
pub type Result<T> = std::result::Result<T, GateError>;
