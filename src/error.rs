// Error types shared by the client and the configuration layer.

use thiserror::Error;

/// Errors returned by the Predicta Search client.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credential or unusable configuration value
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Search identifier rejected before sending
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("request to {url} failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body was not the expected JSON
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
