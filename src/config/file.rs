//! TOML configuration file loading
//!
//! Supports `~/.config/vault-node/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Gateway connection configuration
    #[serde(default)]
    pub gateway: GatewayFileConfig,

    /// Vault/command configuration
    #[serde(default)]
    pub vault: VaultFileConfig,

    /// Size ceilings
    #[serde(default)]
    pub limits: LimitsFileConfig,

    /// Chat configuration
    #[serde(default)]
    pub chat: ChatFileConfig,
}

/// Gateway connection configuration
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GatewayFileConfig {
    /// WebSocket URL (e.g. "wss://gateway.example.com")
    pub url: Option<String>,

    /// Static gateway token
    pub token: Option<String>,

    /// Gateway password
    pub password: Option<String>,

    /// Device-scoped token issued after pairing
    pub device_token: Option<String>,

    /// Display name announced in the handshake
    pub display_name: Option<String>,

    /// Forward raw frames to the debug tap
    pub debug_frames: Option<bool>,
}

/// Vault/command configuration
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VaultFileConfig {
    /// Vault root directory
    pub path: Option<String>,

    /// Allow write commands
    pub writes_enabled: Option<bool>,

    /// Capabilities announced by the node connection
    pub caps: Option<Vec<String>>,
}

/// Size ceilings
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LimitsFileConfig {
    pub max_response_bytes: Option<usize>,
    pub max_read_bytes: Option<usize>,
    pub max_search_results: Option<usize>,
    pub max_search_files: Option<usize>,
    pub max_list_limit: Option<usize>,
}

/// Chat configuration
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ChatFileConfig {
    /// Session key for the operator connection
    pub session_key: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Persist the device token into the config file at `path`
///
/// Other keys in the file are preserved.
///
/// # Errors
///
/// Returns error if the file exists but cannot be parsed, or cannot be written
pub fn store_device_token(path: &Path, token: &str) -> Result<()> {
    let mut config: ConfigFile = if path.exists() {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        ConfigFile::default()
    };
    config.gateway.device_token = Some(token.to_string());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&config)
        .map_err(|e| crate::Error::Config(format!("failed to serialize config: {e}")))?;
    std::fs::write(path, content)?;

    tracing::info!(path = %path.display(), "stored device token");
    Ok(())
}

/// Return the config file path: `~/.config/vault-node/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vault-node").join("config.toml"))
}
