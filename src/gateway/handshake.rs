//! `connect` handshake
//!
//! After the socket opens the client waits a bounded time for a
//! `connect.challenge` event. Whichever comes first, the challenge or the
//! timeout, triggers exactly one `connect` request; the nonce is included
//! and signed only when a challenge arrived.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::events::IssuedToken;
use crate::Result;
use crate::config::Settings;
use crate::security::{AuthCredential, ConnectRole, DeviceAuthPayload, DeviceSigner, build_device_block};

/// Handshake method name
pub const CONNECT_METHOD: &str = "connect";

/// Event carrying the server nonce
pub const CHALLENGE_EVENT: &str = "connect.challenge";

/// Protocol version bounds announced by this client
pub const MIN_PROTOCOL: u32 = 3;
pub const MAX_PROTOCOL: u32 = 3;

/// Client identifier announced in the handshake
pub const CLIENT_ID: &str = "vault-node";

/// Per-connection handshake bookkeeping
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HandshakeState {
    nonce: Option<String>,
    waiting_for_challenge: bool,
    request_id: Option<String>,
}

impl HandshakeState {
    /// Fresh state for a new socket
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Socket opened; start waiting for a challenge
    pub fn begin_wait(&mut self) {
        self.nonce = None;
        self.request_id = None;
        self.waiting_for_challenge = true;
    }

    /// Challenge arrived; returns true if the handshake must be sent now
    ///
    /// A challenge arriving after the handshake was already sent (because
    /// the wait timed out) is ignored.
    pub fn on_challenge(&mut self, nonce: &str) -> bool {
        if !self.waiting_for_challenge {
            return false;
        }
        self.nonce = Some(nonce.to_string());
        self.waiting_for_challenge = false;
        true
    }

    /// Wait elapsed; returns true if the handshake must be sent now
    pub fn on_challenge_timeout(&mut self) -> bool {
        if !self.waiting_for_challenge {
            return false;
        }
        self.waiting_for_challenge = false;
        true
    }

    /// Record the id of the sent `connect` request
    pub fn mark_sent(&mut self, request_id: String) {
        self.request_id = Some(request_id);
    }

    /// Whether `id` correlates with the in-flight `connect` request
    #[must_use]
    pub fn is_handshake_response(&self, id: &str) -> bool {
        self.request_id.as_deref() == Some(id)
    }

    /// Handshake finished (accepted or rejected)
    pub fn complete(&mut self) {
        self.request_id = None;
    }

    /// Discard everything on teardown
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Captured server nonce
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Whether the challenge wait is still running
    #[must_use]
    pub const fn waiting_for_challenge(&self) -> bool {
        self.waiting_for_challenge
    }

    /// Id of the in-flight `connect` request
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Extra fields announced by node-role connections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAdvert {
    /// Command names this node accepts
    pub commands: Vec<String>,
}

/// Build `connect` params from a fresh settings snapshot
///
/// # Errors
///
/// Returns error if the device signer fails
pub fn build_connect_params(
    role: ConnectRole,
    settings: &Settings,
    signer: &dyn DeviceSigner,
    nonce: Option<&str>,
    node: Option<&NodeAdvert>,
    signed_at_ms: i64,
) -> Result<Value> {
    let credential = AuthCredential::select(role, settings);
    let scopes = role.scopes();

    let payload = DeviceAuthPayload {
        device_id: signer.device_id(),
        client_id: CLIENT_ID,
        client_mode: role.client_mode(),
        role: role.as_str(),
        scopes: &scopes,
        signed_at_ms,
        token: credential.signed_token(),
        nonce,
    };
    let device = build_device_block(signer, &payload)?;

    let mut params = Map::new();
    params.insert("minProtocol".into(), json!(MIN_PROTOCOL));
    params.insert("maxProtocol".into(), json!(MAX_PROTOCOL));
    params.insert(
        "client".into(),
        json!({
            "id": CLIENT_ID,
            "version": env!("CARGO_PKG_VERSION"),
            "platform": std::env::consts::OS,
            "mode": role.client_mode(),
            "displayName": settings.display_name,
        }),
    );
    params.insert("role".into(), json!(role.as_str()));
    params.insert("scopes".into(), json!(scopes));
    // The schema accepts an auth object or no field at all, never null
    if let Some(auth) = credential.to_json() {
        params.insert("auth".into(), auth);
    }
    params.insert("device".into(), serde_json::to_value(&device)?);

    if role == ConnectRole::Node {
        let commands = node.map(|n| n.commands.clone()).unwrap_or_default();
        params.insert("caps".into(), json!(settings.caps));
        params.insert("commands".into(), json!(commands));
        params.insert(
            "permissions".into(),
            json!({
                "vault.read": true,
                "vault.write": settings.writes_enabled,
            }),
        );
    }

    Ok(Value::Object(params))
}

/// Successful handshake response payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelloOk {
    pub protocol: Option<u32>,
    pub server: Option<ServerInfo>,
    pub auth: Option<HelloAuth>,
}

/// Server descriptor in the hello payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: Option<String>,
    pub conn_id: Option<String>,
}

/// Auth block in the hello payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelloAuth {
    pub device_token: Option<String>,
    pub role: Option<String>,
    pub scopes: Vec<String>,
}

impl HelloOk {
    /// Parse leniently; unknown or malformed fields yield defaults
    #[must_use]
    pub fn from_payload(payload: Option<&Value>) -> Self {
        payload
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default()
    }

    /// Freshly issued device token, if any
    #[must_use]
    pub fn issued_token(&self) -> Option<IssuedToken> {
        let auth = self.auth.as_ref()?;
        let token = auth.device_token.as_ref().filter(|t| !t.is_empty())?;
        Some(IssuedToken {
            token: token.clone(),
            role: auth.role.clone(),
            scopes: auth.scopes.clone(),
        })
    }
}
