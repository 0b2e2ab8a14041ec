//! Error types for twinlog
//!
//! This module defines the error types used throughout the crate.

use thiserror::Error;

/// Errors that can occur while writing, reading or rotating log slots
#[derive(Debug, Error)]
pub enum LogError {
    /// I/O error while opening, writing, renaming or reading a slot
    #[error("I/O error: {0}")]
    Io(String),

    /// Input bytes were not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An internal invariant was violated
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// The slot configuration was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The process-wide writer was initialized more than once
    #[error("Shared log writer already initialized")]
    AlreadyInitialized,
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, LogError>;

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for LogError {
    fn from(err: std::str::Utf8Error) -> Self {
        LogError::Encoding(err.to_string())
    }
}

impl LogError {
    /// Create a new I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Create a new Encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Create a new Invariant error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    /// Create a new InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether this error came from the filesystem layer
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
