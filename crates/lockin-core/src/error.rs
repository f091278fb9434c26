//! Core error types for lockin-core.
//!
//! This module defines the error hierarchy using thiserror. Collaborator
//! failures (`LlmError`, `PdfError`) are recoverable by construction: every
//! call site pairs the remote path with a local fallback, so none of these
//! errors may abort a running session.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lockin-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session-setup validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Chat-completion collaborator errors
    #[error("Collaborator error: {0}")]
    Llm(#[from] LlmError),

    /// PDF collaborator errors
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be resolved
    #[error("Could not resolve the configuration directory")]
    NoConfigDir,
}

/// Session-setup validation errors. Rejected at the boundary -- no session
/// is created when construction fails.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Chat-completion collaborator errors. The caller never distinguishes
/// transport failures from malformed output -- both resolve to the local
/// fallback.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network-level failure (connect, timeout, body read)
    #[error("Chat completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("Chat completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response parsed but `choices[0].message.content` was missing or blank
    #[error("Chat completion response had no message content")]
    EmptyContent,

    /// Content arrived but did not match the expected payload shape
    #[error("Unexpected payload in model output: {0}")]
    MalformedPayload(String),
}

/// PDF collaborator errors.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Text extraction failed; the session continues without PDF context
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),
}

impl ValidationError {
    pub fn invalid(field: &str, message: &str) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
