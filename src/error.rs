//! Error types for the vault node

use thiserror::Error;

/// Result type alias for vault node operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the vault node
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication/authorization error (identity, signing, tokens)
    #[error("auth error: {0}")]
    Auth(String),

    /// Transport failure (connect, send, receive)
    #[error("transport error: {0}")]
    Transport(String),

    /// Protocol violation or malformed frame
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Gateway rejected the `connect` handshake
    #[error("handshake rejected: {message}")]
    HandshakeRejected {
        /// Gateway error code, if provided
        code: Option<String>,
        /// Human-readable reason
        message: String,
    },

    /// Gateway answered a request with `ok: false`
    #[error("gateway error {code}: {message}")]
    Gateway {
        /// Gateway error code
        code: String,
        /// Human-readable reason
        message: String,
    },

    /// No response arrived before the request deadline
    #[error("request timed out: {0}")]
    RequestTimeout(String),

    /// Connection was torn down while the request was pending
    #[error("connection closed")]
    ConnectionClosed,

    /// Socket is not open, request was not sent
    #[error("not connected")]
    NotConnected,

    /// Content store error
    #[error("vault error: {0}")]
    Vault(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Path is absolute or escapes the vault root
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
