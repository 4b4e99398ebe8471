//! Chat with the Gateway agent
//!
//! [`ChatSession`] accumulates turns from `chat` push events. It holds no
//! timers itself; [`SharedChat`] owns the wait timer and the event pump.

pub mod handle;
pub mod session;
pub mod transcript;

pub use handle::{DEFAULT_WAIT_TIMEOUT, SharedChat};
pub use session::{ChatSession, Role, TIMEOUT_MESSAGE, Turn, WaitTicket};
pub use transcript::{MAX_TRANSCRIPT_TURNS, Transcript};
