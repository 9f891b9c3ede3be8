//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid duration value (zero or too large).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid worker count.
    #[error("Invalid concurrency {value}: must be greater than 0")]
    InvalidConcurrency {
        /// The rejected value
        value: usize,
    },

    /// Invalid documentation URL template.
    #[error("Invalid URL template: {reason}")]
    InvalidTemplate {
        /// Reason for invalidity
        reason: String,
    },

    /// User agent that cannot be sent as a header.
    #[error("Invalid user agent '{value}': {reason}")]
    InvalidUserAgent {
        /// The rejected value
        value: String,
        /// Reason for invalidity
        reason: String,
    },
}
