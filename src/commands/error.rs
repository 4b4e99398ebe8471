//! Command error taxonomy
//!
//! Command failures are values, not `crate::Error`s: the remote agent
//! receives `{code, message}` and reacts to the code programmatically.

use serde::{Deserialize, Serialize};

/// Closed set of command error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "E_MISSING_PARAM")]
    MissingParam,
    #[serde(rename = "E_INVALID_PARAM")]
    InvalidParam,
    #[serde(rename = "E_INVALID_PARAMS")]
    InvalidParams,
    #[serde(rename = "E_NOT_FOUND")]
    NotFound,
    #[serde(rename = "E_NOT_FILE")]
    NotFile,
    #[serde(rename = "E_NO_EDITOR")]
    NoEditor,
    #[serde(rename = "E_NO_ACTIVE_FILE")]
    NoActiveFile,
    #[serde(rename = "E_ALREADY_EXISTS")]
    AlreadyExists,
    #[serde(rename = "E_TOO_LARGE")]
    TooLarge,
    #[serde(rename = "E_RESPONSE_TOO_LARGE")]
    ResponseTooLarge,
    #[serde(rename = "E_WRITES_DISABLED")]
    WritesDisabled,
    #[serde(rename = "E_NOT_IMPLEMENTED")]
    NotImplemented,
    #[serde(rename = "E_INTERNAL")]
    Internal,
    #[serde(rename = "E_INVALID_CURSOR")]
    InvalidCursor,
}

impl ErrorCode {
    /// Wire form, e.g. `E_NOT_FOUND`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingParam => "E_MISSING_PARAM",
            Self::InvalidParam => "E_INVALID_PARAM",
            Self::InvalidParams => "E_INVALID_PARAMS",
            Self::NotFound => "E_NOT_FOUND",
            Self::NotFile => "E_NOT_FILE",
            Self::NoEditor => "E_NO_EDITOR",
            Self::NoActiveFile => "E_NO_ACTIVE_FILE",
            Self::AlreadyExists => "E_ALREADY_EXISTS",
            Self::TooLarge => "E_TOO_LARGE",
            Self::ResponseTooLarge => "E_RESPONSE_TOO_LARGE",
            Self::WritesDisabled => "E_WRITES_DISABLED",
            Self::NotImplemented => "E_NOT_IMPLEMENTED",
            Self::Internal => "E_INTERNAL",
            Self::InvalidCursor => "E_INVALID_CURSOR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured command failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

/// Result of a command handler
pub type CommandResult<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Error with a code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn missing(param: &str) -> Self {
        Self::new(ErrorCode::MissingParam, format!("missing required param: {param}"))
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParam, message)
    }

    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("not found: {path}"))
    }

    #[must_use]
    pub fn not_file(path: &str) -> Self {
        Self::new(ErrorCode::NotFile, format!("not a file: {path}"))
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl From<crate::Error> for CommandError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::NotFound(path) => Self::not_found(&path),
            crate::Error::AlreadyExists(path) => {
                Self::new(ErrorCode::AlreadyExists, format!("already exists: {path}"))
            }
            crate::Error::InvalidPath(message) => Self::invalid(message),
            other => Self::internal(other.to_string()),
        }
    }
}
