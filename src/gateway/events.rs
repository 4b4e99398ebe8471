//! Connection state and typed gateway events
//!
//! Subscribers receive a closed set of [`GatewayEvent`] variants over a
//! broadcast channel; each variant carries its own payload type.

use serde::{Deserialize, Serialize};

use super::chat::ChatEvent;
use crate::nodes::InvokeRequest;

/// Lifecycle of one gateway connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No socket
    #[default]
    Disconnected,
    /// Opening the transport
    Connecting,
    /// Socket open, handshake not yet accepted
    Connected,
    /// Handshake accepted; business calls may proceed
    Paired,
}

impl ConnectionState {
    /// Whether the socket is open (handshake pending or accepted)
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Connected | Self::Paired)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Paired => write!(f, "paired"),
        }
    }
}

/// Transport or protocol failure surfaced to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    /// Structured code when the Gateway provided one
    pub code: Option<String>,
    /// Human-readable message
    pub message: String,
}

/// Long-lived device token issued in the handshake response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub role: Option<String>,
    pub scopes: Vec<String>,
}

/// Event published by a [`GatewayClient`](super::GatewayClient)
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// Connection state changed
    StateChanged(ConnectionState),
    /// Transport or protocol error
    Error(GatewayError),
    /// Host should persist this token
    DeviceToken(IssuedToken),
    /// Gateway asks this node to run a command
    InvokeRequest(InvokeRequest),
    /// Chat turn update
    Chat(ChatEvent),
    /// Raw inbound frame (only when frame debugging is enabled)
    Frame(serde_json::Value),
}
