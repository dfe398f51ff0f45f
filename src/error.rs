// src/error.rs

//! Unified error handling for the template generator.

use std::fmt;

use thiserror::Error;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Site structure violates a normalization contract
    #[error("Validation error: {0}")]
    Validation(String),

    /// Structure generation failed (recoverable via the fallback extractor)
    #[error("Generation error for {model}: {message}")]
    Generation { model: String, message: String },

    /// Building the provisioning document failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a generation error for a given model.
    pub fn generation(model: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Generation {
            model: model.into(),
            message: message.to_string(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl fmt::Display) -> Self {
        Self::Serialization(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_message() {
        let err = AppError::generation("gpt-4", "model not found");
        assert_eq!(
            err.to_string(),
            "Generation error for gpt-4: model not found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
