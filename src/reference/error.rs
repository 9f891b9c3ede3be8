//! Error types for catalog loading and mapping.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or saving catalogs.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// No catalog file exists for the application.
    #[error("no reference catalog for '{app}' in {}", .dir.display())]
    NotFound {
        /// Requested application.
        app: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// A catalog file exists but is malformed.
    #[error("failed to decode {}: {reason}", .path.display())]
    Decode {
        /// The malformed file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A catalog could not be serialized.
    #[error("failed to encode {}: {reason}", .path.display())]
    Encode {
        /// Destination file.
        path: PathBuf,
        /// Encoder message.
        reason: String,
    },

    /// Reading, writing or listing failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl ReferenceError {
    /// Returns true if the error means "no catalog", as opposed to a broken one.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Inconsistencies between a catalog and its generated application config.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// A catalog setting has no field in the generated config.
    #[error("setting '{setting}' is not mapped to a field")]
    Unmapped {
        /// The missing setting.
        setting: String,
    },

    /// A field's type does not match its setting.
    #[error("setting '{setting}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The mismatched setting.
        setting: String,
        /// Field type derived from the setting.
        expected: String,
        /// Field type found in the config.
        actual: String,
    },
}
