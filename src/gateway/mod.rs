//! Gateway client
//!
//! Authenticated, reconnecting session with the remote Gateway over a
//! message transport (WebSocket in production).

pub mod backoff;
pub mod chat;
pub mod client;
pub mod events;
pub mod frame;
pub mod handshake;
pub mod pending;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use chat::{ChatEvent, ChatState};
pub use client::{ClientOptions, GatewayClient};
pub use events::{ConnectionState, GatewayError, GatewayEvent, IssuedToken};
pub use frame::{ErrorShape, EventFrame, Frame, RequestFrame, ResponseFrame};
pub use transport::{Connector, FrameSink, FrameStream, WsConnector};
