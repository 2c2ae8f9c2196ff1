//! Core error types for studyroom-core.
//!
//! The timer itself never fails; everything here belongs to the I/O around
//! it: the settings file, the backend client and the credential store.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// OS keyring errors
    #[error("Credential store error: {0}")]
    Credentials(#[from] keyring::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load settings
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save settings
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Value rejected for a known key
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Backend API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport or decoding failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Bad base URL or path
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Token missing, invalid or expired
    #[error("Not authorized; log in again")]
    Unauthorized,

    /// Non-success status with the server's message
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Goal text empty after trimming
    #[error("Goal text must not be empty")]
    EmptyGoal,

    /// Goal text too long
    #[error("Goal text is {len} characters; the limit is {max}")]
    GoalTooLong { len: usize, max: usize },

    /// Set already holds the maximum number of goals
    #[error("Session set {set_number} already has {limit} goals")]
    GoalLimitReached { set_number: u32, limit: usize },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
