//! Chat methods and chat push events
//!
//! Chat runs on an operator-role connection. `chat.send` returns a run id
//! immediately; the agent's reply streams back as `chat` events.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::client::GatewayClient;
use crate::{Error, Result};

/// Event name for chat pushes
pub const CHAT_EVENT: &str = "chat";

/// Phase of a chat push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatState {
    /// Cumulative partial text
    Delta,
    /// Run finished
    Final,
    /// Run failed
    Error,
}

/// `chat` event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEvent {
    #[serde(default)]
    pub run_id: String,
    pub session_key: String,
    #[serde(default)]
    pub seq: u64,
    pub state: ChatState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ChatEvent {
    /// Parse a chat payload, ignoring malformed ones
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value)
            .map_err(|e| tracing::debug!(error = %e, "ignoring malformed chat event"))
            .ok()
    }

    /// Plain text carried by `message`, if any
    ///
    /// Accepts a bare string, `{content: "..."}`, `{content: [{type:"text", text}]}`
    /// or `{text: "..."}`.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.message.as_ref().and_then(extract_text)
    }
}

fn extract_text(message: &Value) -> Option<String> {
    match message {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("content") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Array(parts)) => {
                let text: String = parts
                    .iter()
                    .filter(|p| p.get("type").and_then(Value::as_str).unwrap_or("text") == "text")
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect();
                Some(text)
            }
            _ => map.get("text").and_then(Value::as_str).map(ToString::to_string),
        },
        _ => None,
    }
}

impl GatewayClient {
    /// Send a user message; returns the run id
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the Gateway rejects it
    pub async fn chat_send(&self, session_key: &str, message: &str) -> Result<String> {
        let params = json!({
            "sessionKey": session_key,
            "message": message,
            "idempotencyKey": uuid::Uuid::new_v4().to_string(),
        });
        let payload = self.call("chat.send", Some(params)).await?;
        payload
            .get("runId")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| Error::Protocol("chat.send response missing runId".to_string()))
    }

    /// Fetch recent history of a session
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn chat_history(&self, session_key: &str, limit: usize) -> Result<Value> {
        self.call(
            "chat.history",
            Some(json!({ "sessionKey": session_key, "limit": limit })),
        )
        .await
    }

    /// Abort a running agent turn
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn chat_abort(&self, run_id: &str) -> Result<()> {
        self.call("chat.abort", Some(json!({ "runId": run_id })))
            .await
            .map(|_| ())
    }

    /// List known sessions
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    pub async fn sessions_list(&self, params: Value) -> Result<Value> {
        self.call("sessions.list", Some(params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delta_event() {
        let event = ChatEvent::from_value(json!({
            "runId": "run-1",
            "sessionKey": "main",
            "seq": 3,
            "state": "delta",
            "message": {"role": "assistant", "content": [{"type": "text", "text": "Hel"}, {"type": "text", "text": "lo"}]}
        }))
        .unwrap();

        assert_eq!(event.state, ChatState::Delta);
        assert_eq!(event.seq, 3);
        assert_eq!(event.text().as_deref(), Some("Hello"));
    }

    #[test]
    fn test_text_shapes() {
        let with = |message: Value| ChatEvent {
            run_id: String::new(),
            session_key: "main".to_string(),
            seq: 0,
            state: ChatState::Final,
            message: Some(message),
            error_message: None,
        };

        assert_eq!(with(json!("plain")).text().as_deref(), Some("plain"));
        assert_eq!(with(json!({"content": "c"})).text().as_deref(), Some("c"));
        assert_eq!(with(json!({"text": "t"})).text().as_deref(), Some("t"));
        assert_eq!(
            with(json!({"content": [{"type": "image"}, {"type": "text", "text": "x"}]}))
                .text()
                .as_deref(),
            Some("x")
        );
        assert!(with(json!(42)).text().is_none());
    }

    #[test]
    fn test_error_event() {
        let event = ChatEvent::from_value(json!({
            "runId": "run-2",
            "sessionKey": "main",
            "state": "error",
            "errorMessage": "model overloaded"
        }))
        .unwrap();
        assert_eq!(event.state, ChatState::Error);
        assert_eq!(event.error_message.as_deref(), Some("model overloaded"));
        assert!(event.text().is_none());
    }

    #[test]
    fn test_unknown_state_rejected() {
        assert!(
            ChatEvent::from_value(json!({"sessionKey": "main", "state": "thinking"})).is_none()
        );
    }
}
