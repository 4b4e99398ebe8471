//! Node invocation wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Method used to reply to an invocation
pub const INVOKE_RESULT_METHOD: &str = "node.invoke.result";

/// Event name carrying an invocation
pub const INVOKE_REQUEST_EVENT: &str = "node.invoke.request";

/// Server-initiated request method carrying an invocation
pub const INVOKE_METHOD: &str = "node.invoke";

/// Request from the Gateway to run a command on this node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub id: String,
    #[serde(default)]
    pub node_id: String,
    pub command: String,
    /// JSON-encoded parameter object
    #[serde(default, rename = "paramsJSON", skip_serializing_if = "Option::is_none")]
    pub params_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl InvokeRequest {
    /// Parse an invocation from an event payload or request params
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match serde_json::from_value(value) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed invoke request");
                None
            }
        }
    }
}

/// Error reported in an invocation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeError {
    pub code: String,
    pub message: String,
}

/// `node.invoke.result` params
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResult {
    pub id: String,
    pub node_id: String,
    pub ok: bool,
    /// JSON-encoded payload on success
    #[serde(default, rename = "payloadJSON", skip_serializing_if = "Option::is_none")]
    pub payload_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<InvokeError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invoke_request_wire_names() {
        let request = InvokeRequest::from_value(json!({
            "id": "inv-1",
            "nodeId": "node-a",
            "command": "obsidian.note.read",
            "paramsJSON": "{\"path\":\"a.md\"}",
            "timeoutMs": 5000
        }))
        .unwrap();

        assert_eq!(request.node_id, "node-a");
        assert_eq!(request.params_json.as_deref(), Some("{\"path\":\"a.md\"}"));
        assert_eq!(request.timeout_ms, Some(5000));
        assert!(request.idempotency_key.is_none());
    }

    #[test]
    fn test_malformed_invoke_request_is_none() {
        assert!(InvokeRequest::from_value(json!({"nodeId": "x"})).is_none());
    }

    #[test]
    fn test_invoke_result_serialization() {
        let ok = InvokeResult {
            id: "inv-1".to_string(),
            node_id: "node-a".to_string(),
            ok: true,
            payload_json: Some("{}".to_string()),
            error: None,
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"id": "inv-1", "nodeId": "node-a", "ok": true, "payloadJSON": "{}"})
        );

        let err = InvokeResult {
            ok: false,
            payload_json: None,
            error: Some(InvokeError {
                code: "E_NOT_FOUND".to_string(),
                message: "missing".to_string(),
            }),
            ..ok
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["error"]["code"], "E_NOT_FOUND");
        assert!(value.get("payloadJSON").is_none());
    }
}
