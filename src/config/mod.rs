//! Configuration management for the vault node
//!
//! Settings are read as snapshots: every connect and every dispatch takes a
//! fresh copy through [`SettingsProvider::snapshot`], so live changes (for
//! example toggling writes) apply to the very next operation.

pub mod file;

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use self::file::ConfigFile;

/// Default Gateway WebSocket URL
pub const DEFAULT_GATEWAY_URL: &str = "ws://127.0.0.1:18789";

/// Default ceiling for any single command response (bytes)
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 512 * 1024;

/// Default ceiling for `obsidian.note.read` content (bytes)
pub const DEFAULT_MAX_READ_BYTES: usize = 256 * 1024;

/// Default ceiling for search result count
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 100;

/// Default ceiling for files scanned by one search
pub const DEFAULT_MAX_SEARCH_FILES: usize = 2_000;

/// Default ceiling for one page of `obsidian.vault.list`
pub const DEFAULT_MAX_LIST_LIMIT: usize = 1_000;

/// Default chat session key
pub const DEFAULT_SESSION_KEY: &str = "main";

/// Runtime settings snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Gateway WebSocket URL
    pub gateway_url: String,

    /// Statically configured gateway token
    pub gateway_token: Option<String>,

    /// Gateway password (alternative to a token)
    pub gateway_password: Option<String>,

    /// Device-scoped bearer token issued by the Gateway after pairing
    pub device_token: Option<String>,

    /// Display name announced in the handshake
    pub display_name: String,

    /// Whether write commands may run
    pub writes_enabled: bool,

    /// Maximum serialized size of a successful command response
    pub max_response_bytes: usize,

    /// Maximum bytes returned by a single read
    pub max_read_bytes: usize,

    /// Maximum search results per query
    pub max_search_results: usize,

    /// Maximum files scanned per search
    pub max_search_files: usize,

    /// Maximum items per list page
    pub max_list_limit: usize,

    /// Forward every inbound frame to the debug tap
    pub debug_frames: bool,

    /// Chat session key used by the operator connection
    pub session_key: String,

    /// Capabilities announced by the node connection
    pub caps: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            gateway_token: None,
            gateway_password: None,
            device_token: None,
            display_name: default_display_name(),
            writes_enabled: false,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            max_search_files: DEFAULT_MAX_SEARCH_FILES,
            max_list_limit: DEFAULT_MAX_LIST_LIMIT,
            debug_frames: false,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            caps: vec!["vault".to_string()],
        }
    }
}

impl Settings {
    /// Build settings from the config file overlaid with environment variables
    ///
    /// Precedence (highest first): environment, config file, defaults.
    #[must_use]
    pub fn load() -> Self {
        let mut settings = Self::default();
        settings.apply_file(file::load_config_file());
        settings.apply_env();
        settings
    }

    /// Overlay values present in a config file
    pub fn apply_file(&mut self, file: ConfigFile) {
        let gateway = file.gateway;
        if let Some(url) = gateway.url {
            self.gateway_url = url;
        }
        if gateway.token.is_some() {
            self.gateway_token = gateway.token;
        }
        if gateway.password.is_some() {
            self.gateway_password = gateway.password;
        }
        if gateway.device_token.is_some() {
            self.device_token = gateway.device_token;
        }
        if let Some(name) = gateway.display_name {
            self.display_name = name;
        }
        if let Some(debug) = gateway.debug_frames {
            self.debug_frames = debug;
        }

        let limits = file.limits;
        if let Some(v) = limits.max_response_bytes {
            self.max_response_bytes = v;
        }
        if let Some(v) = limits.max_read_bytes {
            self.max_read_bytes = v;
        }
        if let Some(v) = limits.max_search_results {
            self.max_search_results = v;
        }
        if let Some(v) = limits.max_search_files {
            self.max_search_files = v;
        }
        if let Some(v) = limits.max_list_limit {
            self.max_list_limit = v;
        }

        if let Some(enabled) = file.vault.writes_enabled {
            self.writes_enabled = enabled;
        }
        if let Some(caps) = file.vault.caps {
            self.caps = caps;
        }
        if let Some(key) = file.chat.session_key {
            self.session_key = key;
        }
    }

    /// Overlay `VAULT_NODE_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("VAULT_NODE_GATEWAY_URL") {
            self.gateway_url = url;
        }
        if let Ok(token) = std::env::var("VAULT_NODE_GATEWAY_TOKEN") {
            self.gateway_token = Some(token);
        }
        if let Ok(password) = std::env::var("VAULT_NODE_GATEWAY_PASSWORD") {
            self.gateway_password = Some(password);
        }
        if let Ok(v) = std::env::var("VAULT_NODE_WRITES") {
            self.writes_enabled = v == "1" || v.eq_ignore_ascii_case("true");
        }
    }
}

/// Source of fresh settings snapshots
pub trait SettingsProvider: Send + Sync {
    /// Current settings
    fn snapshot(&self) -> Settings;
}

/// Live, shareable settings that can be updated while connections run
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
    /// Wrap an initial settings value
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Apply an arbitrary mutation
    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    /// Toggle the write-enable flag
    pub fn set_writes_enabled(&self, enabled: bool) {
        self.update(|s| s.writes_enabled = enabled);
        tracing::info!(enabled, "vault writes toggled");
    }

    /// Store a freshly issued device token
    pub fn set_device_token(&self, token: Option<String>) {
        self.update(|s| s.device_token = token);
    }
}

impl SettingsProvider for SharedSettings {
    fn snapshot(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsProvider for Settings {
    fn snapshot(&self) -> Settings {
        self.clone()
    }
}

/// Default display name: `vault-node@<hostname>` when the hostname is known
fn default_display_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .map_or_else(|| "vault-node".to_string(), |h| format!("vault-node@{h}"))
}

/// Default device identity path
///
/// Returns `~/.local/share/vault-node/identity/device.json`
#[must_use]
pub fn default_identity_path() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/vault-node/identity/device.json"),
        |d| {
            d.data_dir()
                .join("vault-node")
                .join("identity")
                .join("device.json")
        },
    )
}
