use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T, E = RelayError> = std::result::Result<T, E>;

/// Errors that can abort the handling of one inbound request
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Failed to read request body: {0}")]
    RequestBodyError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-target delivery failure classification.
///
/// The `Display` output is the reason text that ends up in the aggregate
/// failure response body, e.g. `http://a (timeout)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("timeout")]
    Timeout,

    #[error("connection error")]
    Connection,

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("error: {0}")]
    Other(String),
}
