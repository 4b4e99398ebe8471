//! Gateway wire frames
//!
//! Every WebSocket text message is one JSON frame tagged by `type`:
//! `req` (request), `res` (response) or `event` (unsolicited push).
//! Field names are part of the Gateway contract and must not change.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// One discrete message exchanged with the Gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Frame {
    /// Request expecting exactly one response with the same id
    #[serde(rename = "req")]
    Request(RequestFrame),
    /// Response to a previously sent request
    #[serde(rename = "res")]
    Response(ResponseFrame),
    /// Unsolicited push
    #[serde(rename = "event")]
    Event(EventFrame),
}

impl Frame {
    /// Parse a text message into a frame
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the text is not a valid frame
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Protocol(format!("malformed frame: {e}")))
    }

    /// Serialize to the wire representation
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short kind label for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "req",
            Self::Response(_) => "res",
            Self::Event(_) => "event",
        }
    }
}

/// `{type:"req", id, method, params?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// `{type:"res", id, ok, payload?, error?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

impl ResponseFrame {
    /// Successful response
    #[must_use]
    pub fn ok(id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    /// Failed response
    #[must_use]
    pub fn err(id: impl Into<String>, error: ErrorShape) -> Self {
        Self {
            id: id.into(),
            ok: false,
            payload: None,
            error: Some(error),
        }
    }

    /// Convert into the payload, or a gateway error when `ok` is false
    ///
    /// # Errors
    ///
    /// Returns `Error::Gateway` carrying the response's error shape
    pub fn into_result(self) -> Result<Value> {
        if self.ok {
            return Ok(self.payload.unwrap_or(Value::Null));
        }
        let error = self.error.unwrap_or_else(|| ErrorShape::new("UNKNOWN", "request failed"));
        Err(Error::Gateway {
            code: error.code,
            message: error.message,
        })
    }
}

/// `{type:"event", event, payload?, seq?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

/// Error carried by a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl ErrorShape {
    /// Error with only a code and message
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: None,
            retry_after_ms: None,
        }
    }
}
