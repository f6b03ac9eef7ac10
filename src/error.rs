//! Error types for configuration and persistence
//!
//! Gameplay never fails: fatal contacts and countdown expiry are outcomes,
//! not errors. These enums only cover bad tuning data and storage I/O.

use thiserror::Error;

/// Invalid or unreadable tuning data
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field}: min ({min}) is greater than max ({max})")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("no prefabs configured")]
    MissingPrefabs,

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read tuning: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value store failures
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("value for {key:?} is not an integer: {value:?}")]
    NotAnInteger { key: String, value: String },
}
