//! Configuration Error Types
//!
//! Error handling for configuration loading and validation, with messages that
//! name the offending field or file.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration from '{file_path}': {error}")]
    FileLoadError { file_path: String, error: String },

    /// Environment variable could not be applied as an override
    #[error("Environment override error for key {key}: {reason}")]
    EnvironmentOverrideError { key: String, reason: String },

    /// Merged configuration did not match the expected shape
    #[error("Invalid configuration structure: {error}")]
    DeserializationError { error: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigurationError {
    pub fn file_load_error<P: Into<String>, E: std::fmt::Display>(file_path: P, error: E) -> Self {
        Self::FileLoadError {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

impl From<::config::ConfigError> for ConfigurationError {
    fn from(error: ::config::ConfigError) -> Self {
        match error {
            ::config::ConfigError::Foreign(inner) => Self::EnvironmentOverrideError {
                key: "environment".to_string(),
                reason: inner.to_string(),
            },
            other => Self::DeserializationError {
                error: other.to_string(),
            },
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;
