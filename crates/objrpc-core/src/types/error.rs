//! objrpc error types

use thiserror::Error;

/// Result type for objrpc client-core operations
pub type Result<T> = std::result::Result<T, ObjRpcError>;

/// Errors surfaced by reference resolution and the wire codecs
#[derive(Error, Debug)]
pub enum ObjRpcError {
    /// No viable endpoint or connection candidate remains after filtering.
    /// Carries the text form of the reference for diagnostics.
    #[error("no suitable endpoint: `{0}`")]
    NoEndpoint(String),

    /// Connection establishment failed for every candidate endpoint
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The locator has no endpoints registered for an adapter id
    #[error("adapter not found: `{0}`")]
    AdapterNotFound(String),

    /// Router lookup failure
    #[error("router error: {0}")]
    RouterError(String),

    /// Buffer underflow (not enough data)
    #[error("buffer underflow: need {needed} bytes, have {have}")]
    BufferUnderflow { needed: usize, have: usize },

    /// Malformed endpoint on the wire
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Malformed reference on the wire
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Invalid string data (non-UTF-8 bytes where a string was expected)
    #[error("invalid string data: {0}")]
    InvalidString(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
