//! Shared chat session with a timed response wait

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::session::{ChatSession, Turn};
use super::transcript::Transcript;
use crate::Result;
use crate::gateway::{ChatEvent, ChatState, GatewayClient, GatewayEvent};

/// How long to wait for a terminal chat event
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Cheaply cloneable handle to one [`ChatSession`]
#[derive(Debug, Clone)]
pub struct SharedChat {
    inner: Arc<Mutex<ChatSession>>,
    wait_timeout: Duration,
}

impl SharedChat {
    #[must_use]
    pub fn new(session: ChatSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Run `f` against the locked session
    pub fn with<R>(&self, f: impl FnOnce(&mut ChatSession) -> R) -> R {
        let mut session = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.with(|s| s.turns().to_vec())
    }

    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.with(|s| Transcript::from_session(s))
    }

    pub fn add_user_turn(&self, text: &str) {
        self.with(|s| s.add_user_turn(text));
    }

    /// Arm or cancel the response wait
    ///
    /// Arming schedules a one-shot timer; if it fires after the wait was
    /// cancelled or re-armed it does nothing. Must be called within a tokio
    /// runtime.
    pub fn set_waiting(&self, waiting: bool) {
        let Some(ticket) = self.with(|s| s.set_waiting(waiting)) else {
            return;
        };
        let inner = Arc::downgrade(&self.inner);
        let timeout = self.wait_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = inner.upgrade() {
                let expired = inner
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .on_wait_expired(ticket);
                if expired {
                    tracing::warn!(timeout_secs = timeout.as_secs(), "chat response timed out");
                }
            }
        });
    }

    pub fn handle_event(&self, event: &ChatEvent) -> bool {
        self.with(|s| s.handle_event(event))
    }

    pub fn clear(&self) {
        self.with(ChatSession::clear);
    }

    /// Record the message, start waiting and send it
    ///
    /// # Errors
    ///
    /// Returns error if the send fails; the failure is also recorded as an
    /// agent turn and the wait is cancelled
    pub async fn send(&self, client: &GatewayClient, text: &str) -> Result<String> {
        let session_key = self.with(|s| {
            s.add_user_turn(text);
            s.session_key().to_string()
        });
        self.set_waiting(true);

        match client.chat_send(&session_key, text).await {
            Ok(run_id) => {
                tracing::debug!(%run_id, %session_key, "chat message sent");
                Ok(run_id)
            }
            Err(e) => {
                self.with(|s| {
                    s.set_waiting(false);
                    s.handle_event(&ChatEvent {
                        run_id: String::new(),
                        session_key: session_key.clone(),
                        seq: 0,
                        state: ChatState::Error,
                        message: None,
                        error_message: Some(e.to_string()),
                    });
                });
                Err(e)
            }
        }
    }

    /// Feed chat events from `client` into this session until the client's
    /// event channel closes
    #[must_use]
    pub fn pump(&self, client: &GatewayClient) -> JoinHandle<()> {
        let mut events = client.subscribe();
        let chat = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(GatewayEvent::Chat(event)) => {
                        chat.handle_event(&event);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "chat pump lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
