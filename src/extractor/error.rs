//! Error types for the extraction pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::context::Interrupted;
use crate::fetch::HttpError;

/// Why a single strategy attempt failed.
///
/// Always local to the attempt: the orchestrator records it and moves on.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The attempt's context was cancelled or its deadline passed.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    /// The strategy has no source for the application.
    #[error("strategy does not support this application")]
    NotApplicable,

    /// An external command could not be run or exited unsuccessfully.
    #[error("command `{program}` failed: {reason}")]
    Command {
        /// The program that was run.
        program: String,
        /// Exit status or spawn error.
        reason: String,
    },

    /// The HTTP request itself failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status returned.
        status: http::StatusCode,
    },

    /// A local file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source was found but its content could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// The source was parsed but contained no settings.
    #[error("no settings found")]
    NoSettings,

    /// The strategy returned a result for a different application.
    #[error("result is for '{actual}', expected '{expected}'")]
    AppMismatch {
        /// Requested application.
        expected: String,
        /// Application named in the result.
        actual: String,
    },
}

impl StrategyError {
    /// Returns true if the attempt failed because of a deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Interrupted(Interrupted::DeadlineExceeded) | Self::Http(HttpError::Timeout)
        )
    }
}

/// A strategy failure recorded during the fallback search.
#[derive(Debug)]
pub struct StrategyFailure {
    /// Name of the strategy that failed.
    pub strategy: String,
    /// What went wrong.
    pub error: StrategyError,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

/// Terminal failure of a single or batch extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No registered strategy applies to the application.
    #[error("no extraction method available for '{app}'")]
    NotFound {
        /// Requested application.
        app: String,
    },

    /// Every applicable strategy failed.
    #[error("no extraction method succeeded for '{app}' ({})", join_failures(.failures))]
    AllStrategiesFailed {
        /// Requested application.
        app: String,
        /// One entry per attempted strategy, in attempt order.
        failures: Vec<StrategyFailure>,
    },

    /// The caller's context fired before the search finished.
    #[error("extraction of '{app}' stopped: {cause}")]
    Interrupted {
        /// Requested application.
        app: String,
        /// Cancellation or deadline.
        cause: Interrupted,
    },

    /// No application in a batch succeeded.
    #[error("batch extraction failed for all {} application(s)", .failures.len())]
    BatchFailed {
        /// Per-application failures.
        failures: BTreeMap<String, ExtractError>,
    },
}

impl ExtractError {
    /// Returns true if the failure was caused by deadlines alone.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Interrupted { cause, .. } => cause.is_timeout(),
            Self::AllStrategiesFailed { failures, .. } => {
                !failures.is_empty() && failures.iter().all(|f| f.error.is_timeout())
            }
            Self::NotFound { .. } | Self::BatchFailed { .. } => false,
        }
    }
}

fn join_failures(failures: &[StrategyFailure]) -> String {
    if failures.is_empty() {
        return "no attempts".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
