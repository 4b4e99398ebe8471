//! Device identity management using Ed25519 cryptography
//!
//! Each installation has a unique device identity consisting of an Ed25519
//! keypair. The device ID is the hex SHA-256 digest of the raw public key.
//! The identity is created once, persisted by the host, and only read by
//! gateway connections through the [`DeviceSigner`] capability.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Algorithm tag stored alongside the keypair
pub const ALGORITHM: &str = "ed25519";

/// Persisted identity format version
const IDENTITY_VERSION: u32 = 1;

/// Signing capability handed to gateway connections
///
/// Kept narrow so the connection layer has no hidden crypto dependency and
/// tests can substitute a fake.
pub trait DeviceSigner: Send + Sync {
    /// Stable device identifier (hex SHA-256 of the public key)
    fn device_id(&self) -> &str;

    /// Raw public key, base64url without padding
    fn public_key(&self) -> &str;

    /// Sign `payload`, returning the signature base64url without padding
    ///
    /// # Errors
    ///
    /// Returns error if no usable private key is available
    fn sign(&self, payload: &[u8]) -> Result<String>;
}

/// Device identity stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    /// Persisted format version
    pub version: u32,

    /// Key algorithm tag
    pub algorithm: String,

    /// Unique device identifier (SHA-256 of public key, hex)
    pub device_id: String,

    /// Ed25519 public key (base64url)
    pub public_key: String,

    /// Ed25519 private key seed (base64url)
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,

    /// When the identity was created
    pub created_at: DateTime<Utc>,
}

impl DeviceIdentity {
    /// Generate a new device identity with a random keypair
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(&signing_key)
    }

    /// Build an identity around an existing signing key
    #[must_use]
    pub fn from_signing_key(signing_key: &SigningKey) -> Self {
        let public_key_bytes = signing_key.verifying_key().to_bytes();

        Self {
            version: IDENTITY_VERSION,
            algorithm: ALGORITHM.to_string(),
            device_id: compute_device_id(&public_key_bytes),
            public_key: base64url_encode(&public_key_bytes),
            private_key: Some(base64url_encode(signing_key.as_bytes())),
            created_at: Utc::now(),
        }
    }

    /// Load identity from a file, or create a new one if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail, JSON is invalid, or the stored
    /// device id does not match the stored public key
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let identity: Self = serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("invalid device identity: {e}")))?;

            if identity.algorithm != ALGORITHM {
                return Err(Error::Config(format!(
                    "unsupported identity algorithm: {}",
                    identity.algorithm
                )));
            }
            let expected = compute_device_id(&base64url_decode(&identity.public_key)?);
            if expected != identity.device_id {
                return Err(Error::Config(
                    "device id does not match public key".to_string(),
                ));
            }

            tracing::debug!(device_id = %identity.device_id, "loaded device identity");
            Ok(identity)
        } else {
            let identity = Self::generate();

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            let content = serde_json::to_string_pretty(&identity)
                .map_err(|e| Error::Config(format!("failed to serialize identity: {e}")))?;
            fs::write(path, content)?;

            tracing::info!(device_id = %identity.device_id, "created new device identity");
            Ok(identity)
        }
    }

    /// Verify a signature against this identity's public key
    ///
    /// # Errors
    ///
    /// Returns error if public key or signature encoding is invalid
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<bool> {
        verify_signature(&self.public_key, payload, signature)
    }

    /// Create a public-only copy of this identity (for sharing)
    #[must_use]
    pub fn public_only(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    /// Check if this identity has a private key
    #[must_use]
    pub const fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Get the short device ID (first 8 characters)
    #[must_use]
    pub fn short_id(&self) -> &str {
        &self.device_id[..8.min(self.device_id.len())]
    }
}

impl DeviceSigner for DeviceIdentity {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, payload: &[u8]) -> Result<String> {
        let private_key = self
            .private_key
            .as_ref()
            .ok_or_else(|| Error::Auth("identity has no private key".to_string()))?;

        let key_bytes = base64url_decode(private_key)?;
        let signing_key = SigningKey::try_from(key_bytes.as_slice())
            .map_err(|e| Error::Auth(format!("invalid private key: {e}")))?;

        let signature = signing_key.sign(payload);
        Ok(base64url_encode(&signature.to_bytes()))
    }
}

/// Verify a signature from a public key (without a full identity)
///
/// # Errors
///
/// Returns error if public key or signature format is invalid
pub fn verify_signature(public_key: &str, payload: &[u8], signature: &str) -> Result<bool> {
    let public_key_bytes = base64url_decode(public_key)?;
    let verifying_key = VerifyingKey::try_from(public_key_bytes.as_slice())
        .map_err(|e| Error::Auth(format!("invalid public key: {e}")))?;

    let sig_bytes = base64url_decode(signature)?;
    let signature = Signature::try_from(sig_bytes.as_slice())
        .map_err(|e| Error::Auth(format!("invalid signature format: {e}")))?;

    Ok(verifying_key.verify(payload, &signature).is_ok())
}

/// Compute device ID from public key bytes
#[must_use]
pub fn compute_device_id(public_key: &[u8]) -> String {
    hex::encode(Sha256::digest(public_key))
}

/// Base64url encoding without padding
#[must_use]
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Base64url decoding; tolerates trailing padding
///
/// # Errors
///
/// Returns error if the input is not valid base64url
pub fn base64url_decode(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .map_err(|e| Error::Auth(format!("invalid base64: {e}")))
}
