//! Store error types

use thiserror::Error;

/// Reasons a store rejects an operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("container is closed")]
    Closed,

    #[error("an array named '{0}' already exists")]
    DuplicateArray(String),

    #[error("array '{array}' has {expected} samples but the dimension has {found} ticks")]
    DimensionLength {
        array: String,
        expected: usize,
        found: usize,
    },

    #[error("array '{array}': {message}")]
    InvalidArray { array: String, message: String },

    #[error("region '{region}': {message}")]
    InvalidRegion { region: String, message: String },

    #[error("metadata section '{0}' not found")]
    MissingSection(String),

    #[error("failed to serialize container: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn invalid_array(array: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArray {
            array: array.into(),
            message: message.into(),
        }
    }

    pub fn invalid_region(region: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRegion {
            region: region.into(),
            message: message.into(),
        }
    }

    /// Convert into the contract error carrying the container name
    pub fn into_contract(self, container: &str) -> contracts::ContractError {
        contracts::ContractError::store(container, self.to_string())
    }
}
