//! Core error types for pumpsite-core.
//!
//! The engine itself is pure, so the taxonomy is narrow: configuration
//! errors (bad rest period, empty catalog) fail fast, validation errors
//! cover malformed caller input, and storage errors belong to the journal
//! adapter only.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for pumpsite-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration or data-integrity violation from the caller
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Journal storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The rest period must be at least one day
    #[error("minimum rest days must be at least 1, got {0}")]
    InvalidRestDays(u32),

    /// No enabled site is left to reason about
    #[error("the active site catalog is empty")]
    EmptyCatalog,

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must not be before start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Site reference that does not resolve in the catalog
    #[error("Unknown site: {0}")]
    UnknownSite(String),

    /// Placement id that is not in the journal
    #[error("Placement not found: {0}")]
    PlacementNotFound(Uuid),
}

/// Journal storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read the journal file
    #[error("Failed to read journal at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the journal file
    #[error("Failed to write journal at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Journal contents could not be decoded
    #[error("Corrupt journal at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
