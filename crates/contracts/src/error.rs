//! Layered error definitions
//!
//! Categorized by source: config / input / sync / store

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Input Errors =====
    /// Input streams violate a shape or ordering invariant
    #[error("invalid input stream '{stream}': {message}")]
    InvalidInput { stream: String, message: String },

    // ===== Sync Errors =====
    /// No synchronization instant could be located and no manual override was given
    #[error("synchronization not found in {stream} stream: {detail}")]
    SynchronizationNotFound { stream: String, detail: String },

    // ===== Store Errors =====
    /// Annotated store rejected an operation
    #[error("store '{container}' error: {message}")]
    Store { container: String, message: String },

    /// Unknown array/group/region handle
    #[error("unknown {kind} reference #{id}")]
    UnknownReference { kind: &'static str, id: usize },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid input error
    pub fn invalid_input(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create synchronization-not-found error
    pub fn sync_not_found(stream: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SynchronizationNotFound {
            stream: stream.into(),
            detail: detail.into(),
        }
    }

    /// Create store error
    pub fn store(container: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            container: container.into(),
            message: message.into(),
        }
    }

    /// Whether a manual offset override could have avoided this error
    pub fn is_sync_failure(&self) -> bool {
        matches!(self, Self::SynchronizationNotFound { .. })
    }
}
