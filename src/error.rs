//! Error types for the application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors related to configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid chat ID: {0}")]
    InvalidChatId(String),

    #[error("Invalid API URL '{0}': {1}")]
    InvalidApiUrl(String, url::ParseError),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine the home directory")]
    NoHomeDirectory,
}

/// Errors related to sending a single request.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The message has already had the bot token redacted.
    #[error("{context} {message}")]
    Transport { context: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Errors related to building inline button markup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Both button text and button URL must be provided")]
    IncompleteButton,

    #[error("Invalid button URL '{0}'")]
    InvalidUrl(String),
}
