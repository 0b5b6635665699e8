//! Error types for slice construction and configuration

use thiserror::Error;

/// Errors raised while setting up a slice.
///
/// Every variant is a construction-time problem. Dispatching an action that no
/// handler knows about is never an error.
#[derive(Error, Debug)]
pub enum SliceError {
    #[error("Invalid slice name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Action type for slice \"{slice}\" must be a non-empty string")]
    InvalidActionType { slice: String },

    #[error("\"{action_type}\" is a reserved action type. Please rename the custom action for \"{slice}\".")]
    ReservedActionType { slice: String, action_type: String },

    #[error("Invalid reducer handler for slice \"{slice}\": {reason}")]
    InvalidHandler { slice: String, reason: String },

    #[error("State stored under \"{slice}\" is not of type {expected}")]
    StateTypeMismatch {
        slice: String,
        expected: &'static str,
    },

    #[error("Unsupported config format: {0}")]
    UnsupportedConfigFormat(String),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SliceError>;
