//! Error types for guizhan-core

use thiserror::Error;

/// Result type alias using guizhan-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value or format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A project reference field failed validation
    #[error("Invalid project reference: {field} '{value}' must match [A-Za-z0-9_-]+")]
    InvalidProjectRef { field: &'static str, value: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid project reference error
    pub fn invalid_project_ref(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidProjectRef {
            field,
            value: value.into(),
        }
    }
}
