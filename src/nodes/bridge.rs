//! Bridge between Gateway invocations and the command dispatcher
//!
//! Every `node.invoke.request` is dispatched on its own task and answered
//! with one `node.invoke.result`. A failed reply is logged, never retried.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::types::{INVOKE_RESULT_METHOD, InvokeError, InvokeRequest, InvokeResult};
use crate::commands::{CommandError, DispatchResult, Dispatcher};
use crate::gateway::{GatewayClient, GatewayEvent};

/// Routes invocations from one client to one dispatcher
pub struct NodeBridge;

impl NodeBridge {
    /// Start forwarding invocations; the task ends when the client's event
    /// channel closes
    #[must_use]
    pub fn spawn(client: GatewayClient, dispatcher: Arc<Dispatcher>) -> JoinHandle<()> {
        let mut events = client.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(GatewayEvent::InvokeRequest(request)) => {
                        let client = client.clone();
                        let dispatcher = Arc::clone(&dispatcher);
                        tokio::spawn(async move {
                            handle_invoke(&client, &dispatcher, request).await;
                        });
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "invoke bridge lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("invoke bridge stopped");
        })
    }
}

/// Dispatch one invocation and send its result
///
/// When the request carries `timeoutMs`, a dispatch still running at the
/// deadline is dropped and answered with `E_INTERNAL`.
pub async fn handle_invoke(client: &GatewayClient, dispatcher: &Dispatcher, request: InvokeRequest) {
    tracing::debug!(
        id = %request.id,
        command = %request.command,
        idempotency_key = request.idempotency_key.as_deref(),
        timeout_ms = request.timeout_ms,
        "invoke request"
    );

    let dispatch = dispatcher.dispatch(&request.command, request.params_json.as_deref());
    let outcome = match request.timeout_ms {
        Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), dispatch).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    id = %request.id,
                    command = %request.command,
                    timeout_ms = ms,
                    "invoke timed out"
                );
                DispatchResult::failure(CommandError::internal(format!(
                    "command timed out after {ms} ms"
                )))
            }
        },
        None => dispatch.await,
    };
    let result = invoke_result(&request, outcome);

    let params = match serde_json::to_value(&result) {
        Ok(params) => params,
        Err(e) => {
            tracing::error!(id = %request.id, error = %e, "failed to encode invoke result");
            return;
        }
    };

    if let Err(e) = client.request(INVOKE_RESULT_METHOD, Some(params)).await {
        tracing::warn!(
            id = %request.id,
            command = %request.command,
            error = %e,
            "failed to send invoke result"
        );
    }
}

/// Wire result for a dispatch outcome
#[must_use]
pub fn invoke_result(request: &InvokeRequest, outcome: DispatchResult) -> InvokeResult {
    let base = InvokeResult {
        id: request.id.clone(),
        node_id: request.node_id.clone(),
        ok: outcome.ok,
        payload_json: None,
        error: None,
    };

    match (outcome.payload, outcome.error) {
        (Some(payload), None) => match serde_json::to_string(&payload) {
            Ok(json) => InvokeResult {
                payload_json: Some(json),
                ..base
            },
            Err(e) => InvokeResult {
                ok: false,
                error: Some(InvokeError {
                    code: "E_INTERNAL".to_string(),
                    message: e.to_string(),
                }),
                ..base
            },
        },
        (_, Some(error)) => InvokeResult {
            ok: false,
            error: Some(InvokeError {
                code: error.code.as_str().to_string(),
                message: error.message,
            }),
            ..base
        },
        (None, None) => InvokeResult {
            payload_json: Some("null".to_string()),
            ..base
        },
    }
}
