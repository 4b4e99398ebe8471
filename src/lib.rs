//! Vault Node - expose a local markdown vault to a remote Gateway
//!
//! This library provides:
//! - An authenticated, reconnecting Gateway client (challenge handshake,
//!   Ed25519 device signatures, request correlation, typed events)
//! - A command dispatcher over the vault with write gating, size limits
//!   and an activity log
//! - A chat session model driven by Gateway chat events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Gateway                          │
//! └────────────────────┬────────────────────────────────┘
//!                      │ WebSocket frames
//! ┌────────────────────▼────────────────────────────────┐
//! │                 GatewayClient                        │
//! │  Handshake  │  Pending requests  │  Event broadcast │
//! └──────┬─────────────────────────────────────┬────────┘
//!        │ invoke requests                     │ chat events
//! ┌──────▼──────────────┐            ┌─────────▼────────┐
//! │ NodeBridge          │            │ SharedChat       │
//! │   └─ Dispatcher     │            │   └─ ChatSession │
//! │       └─ Vault      │            └──────────────────┘
//! └─────────────────────┘
//! ```

pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod nodes;
pub mod security;
pub mod vault;

pub use chat::{ChatSession, SharedChat};
pub use commands::{ActivityLog, CommandError, DispatchResult, Dispatcher, ErrorCode};
pub use config::{Settings, SettingsProvider, SharedSettings};
pub use error::{Error, Result};
pub use gateway::{ClientOptions, ConnectionState, GatewayClient, GatewayEvent};
pub use nodes::NodeBridge;
pub use security::{ConnectRole, DeviceIdentity, DeviceSigner};
pub use vault::{ContentStore, EditorContext, FsVault};
