//! Security module for device identity and gateway authentication

pub mod auth;
pub mod identity;

pub use auth::{AuthCredential, ConnectRole, DeviceAuthPayload, DeviceBlock, build_device_block};
pub use identity::{DeviceIdentity, DeviceSigner, verify_signature};
