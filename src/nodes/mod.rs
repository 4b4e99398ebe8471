//! Node role: run Gateway invocations against the local dispatcher
//!
//! The Gateway forwards agent tool calls to this node as invocation
//! requests; the bridge dispatches each and replies with the result.

pub mod bridge;
pub mod types;

pub use bridge::NodeBridge;
pub use types::{InvokeError, InvokeRequest, InvokeResult};
