//! Turn-based chat session driven by gateway chat events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::{ChatEvent, ChatState};

/// Agent turn appended when the wait deadline passes
pub const TIMEOUT_MESSAGE: &str = "Error: timed out waiting for a response";

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Identifies one armed wait; an expiry for an older ticket is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTicket(u64);

/// Conversation with one remote session
#[derive(Debug, Clone)]
pub struct ChatSession {
    session_key: String,
    turns: Vec<Turn>,
    accumulator: String,
    streaming: bool,
    waiting: bool,
    wait_generation: u64,
}

impl ChatSession {
    #[must_use]
    pub fn new(session_key: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            turns: Vec::new(),
            accumulator: String::new(),
            streaming: false,
            waiting: false,
            wait_generation: 0,
        }
    }

    /// Session with previously recorded turns
    #[must_use]
    pub fn with_turns(session_key: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            turns,
            ..Self::new(session_key)
        }
    }

    #[must_use]
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Switch to another remote session; in-flight streaming and waiting
    /// state belongs to the old key and is dropped
    pub fn set_session_key(&mut self, session_key: impl Into<String>) {
        self.session_key = session_key.into();
        self.reset_stream();
        self.stop_waiting();
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Text streamed so far for the current agent turn
    #[must_use]
    pub fn streaming_text(&self) -> Option<&str> {
        self.streaming.then_some(self.accumulator.as_str())
    }

    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.streaming
    }

    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Record a user message; sending it is up to the caller
    pub fn add_user_turn(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::now(Role::User, text));
    }

    /// Arm (`true`) or cancel (`false`) the response wait
    ///
    /// Arming returns the ticket to pass to [`Self::on_wait_expired`].
    pub fn set_waiting(&mut self, waiting: bool) -> Option<WaitTicket> {
        self.wait_generation += 1;
        self.waiting = waiting;
        waiting.then_some(WaitTicket(self.wait_generation))
    }

    fn stop_waiting(&mut self) {
        self.set_waiting(false);
    }

    fn reset_stream(&mut self) {
        self.accumulator.clear();
        self.streaming = false;
    }

    /// Wait deadline passed; appends a timeout turn unless the ticket is stale
    ///
    /// Returns whether the session changed.
    pub fn on_wait_expired(&mut self, ticket: WaitTicket) -> bool {
        if !self.waiting || ticket.0 != self.wait_generation {
            return false;
        }
        self.stop_waiting();
        self.reset_stream();
        self.turns.push(Turn::now(Role::Agent, TIMEOUT_MESSAGE));
        true
    }

    /// Apply a chat event; events for other sessions are ignored
    ///
    /// Returns whether the session changed.
    pub fn handle_event(&mut self, event: &ChatEvent) -> bool {
        if event.session_key != self.session_key {
            return false;
        }

        match event.state {
            ChatState::Delta => {
                // Each delta carries the full text so far
                if let Some(text) = event.text() {
                    self.accumulator = text;
                }
                self.streaming = true;
            }
            ChatState::Final => {
                let text = event
                    .text()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| std::mem::take(&mut self.accumulator));
                if !text.is_empty() {
                    self.turns.push(Turn::now(Role::Agent, text));
                }
                self.reset_stream();
                self.stop_waiting();
            }
            ChatState::Error => {
                let message = event.error_message.as_deref().unwrap_or("unknown error");
                self.turns
                    .push(Turn::now(Role::Agent, format!("Error: {message}")));
                self.reset_stream();
                self.stop_waiting();
            }
        }
        true
    }

    /// Drop every turn and any streaming or waiting state; the session key
    /// is kept
    pub fn clear(&mut self) {
        self.turns.clear();
        self.reset_stream();
        self.stop_waiting();
    }
}
