//! Error types for the core library.

use thiserror::Error;

/// Errors surfaced by collaborator calls.
///
/// Every variant is recoverable: failures are converted into user-visible
/// state at the point of call and never abort unrelated components.
#[derive(Debug, Error)]
pub enum Error {
    /// The collaborator could not be reached (connection refused, DNS, ...).
    #[error("network error: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status.
    ///
    /// `message` is the human-readable text extracted from the response
    /// body; `Display` yields it verbatim so it can be shown to the user
    /// unchanged.
    #[error("{message}")]
    Rejected {
        /// HTTP status code of the response.
        status: u16,
        /// Human-readable error text from the response body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Client configuration error (bad base URL, ...).
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
