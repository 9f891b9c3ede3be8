//! Error types for HTTP operations.

use thiserror::Error;

/// Error type for HTTP operations.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed (DNS, refused connection, TLS).
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not respond in time.
    #[error("Request timed out")]
    Timeout,

    /// The URL could not be used to build a request.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body exceeded the client's size cap.
    #[error("Response body exceeds {limit} bytes")]
    BodyTooLarge {
        /// The configured cap in bytes.
        limit: usize,
    },
}
