//! Gateway authentication for outbound connections
//!
//! Two connections exist per host:
//! - `Node`: executes vault commands; prefers the device-scoped token
//! - `Operator`: sends chat turns; uses only the static gateway token
//!
//! The device token issued after pairing usually lacks `operator.write`, so
//! the operator role must never fall back to it.

use serde::{Deserialize, Serialize};

use super::identity::DeviceSigner;
use crate::Result;
use crate::config::Settings;

/// Signed payload version without a server nonce
pub const PAYLOAD_V1: &str = "v1";

/// Signed payload version carrying a server nonce
pub const PAYLOAD_V2: &str = "v2";

/// Role a connection announces in its handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectRole {
    /// Executes dispatcher commands on behalf of the Gateway
    Node,
    /// Sends conversational turns
    Operator,
}

impl ConnectRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Operator => "operator",
        }
    }

    /// Client mode announced in the `client` descriptor
    #[must_use]
    pub const fn client_mode(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Operator => "ui",
        }
    }

    /// Scopes requested by this role
    #[must_use]
    pub fn scopes(self) -> Vec<String> {
        match self {
            Self::Node => Vec::new(),
            Self::Operator => vec!["operator.read".to_string(), "operator.write".to_string()],
        }
    }
}

impl std::fmt::Display for ConnectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential placed in the handshake `auth` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Bearer token
    Token(String),
    /// Gateway password
    Password(String),
    /// No credential configured
    None,
}

impl AuthCredential {
    /// Select the credential for a role from the current settings
    ///
    /// Node: device token, then static token, then password.
    /// Operator: static token, then password. Never the device token.
    #[must_use]
    pub fn select(role: ConnectRole, settings: &Settings) -> Self {
        let non_empty = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();

        let token = match role {
            ConnectRole::Node => {
                non_empty(&settings.device_token).or_else(|| non_empty(&settings.gateway_token))
            }
            ConnectRole::Operator => non_empty(&settings.gateway_token),
        };

        if let Some(token) = token {
            return Self::Token(token);
        }
        non_empty(&settings.gateway_password).map_or(Self::None, Self::Password)
    }

    /// Token string embedded in the signed payload (empty unless a token)
    #[must_use]
    pub fn signed_token(&self) -> &str {
        match self {
            Self::Token(t) => t,
            Self::Password(_) | Self::None => "",
        }
    }

    /// JSON `auth` block, or `None` when no credential is configured
    #[must_use]
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::Token(t) => Some(serde_json::json!({ "token": t })),
            Self::Password(p) => Some(serde_json::json!({ "password": p })),
            Self::None => None,
        }
    }
}

/// Inputs of the canonical device signature payload
#[derive(Debug, Clone)]
pub struct DeviceAuthPayload<'a> {
    pub device_id: &'a str,
    pub client_id: &'a str,
    pub client_mode: &'a str,
    pub role: &'a str,
    pub scopes: &'a [String],
    pub signed_at_ms: i64,
    pub token: &'a str,
    pub nonce: Option<&'a str>,
}

impl DeviceAuthPayload<'_> {
    /// Canonical pipe-delimited string
    ///
    /// `version|deviceId|clientId|clientMode|role|scopes|signedAtMs|token[|nonce]`
    /// where version is `v2` when a nonce is present and `v1` otherwise.
    #[must_use]
    pub fn canonical(&self) -> String {
        let version = if self.nonce.is_some() {
            PAYLOAD_V2
        } else {
            PAYLOAD_V1
        };
        let mut parts = vec![
            version.to_string(),
            self.device_id.to_string(),
            self.client_id.to_string(),
            self.client_mode.to_string(),
            self.role.to_string(),
            self.scopes.join(","),
            self.signed_at_ms.to_string(),
            self.token.to_string(),
        ];
        if let Some(nonce) = self.nonce {
            parts.push(nonce.to_string());
        }
        parts.join("|")
    }
}

/// Device block of the handshake request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBlock {
    pub id: String,
    pub public_key: String,
    pub signature: String,
    pub signed_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Sign the canonical payload and build the device block
///
/// # Errors
///
/// Returns error if the signer cannot produce a signature
pub fn build_device_block(
    signer: &dyn DeviceSigner,
    payload: &DeviceAuthPayload<'_>,
) -> Result<DeviceBlock> {
    let canonical = payload.canonical();
    let signature = signer.sign(canonical.as_bytes())?;

    Ok(DeviceBlock {
        id: signer.device_id().to_string(),
        public_key: signer.public_key().to_string(),
        signature,
        signed_at: payload.signed_at_ms,
        nonce: payload.nonce.map(ToString::to_string),
    })
}
