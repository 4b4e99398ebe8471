//! Persisted chat transcript

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::session::{ChatSession, Turn};
use crate::Result;

/// Most recent turns kept on disk
pub const MAX_TRANSCRIPT_TURNS: usize = 200;

/// On-disk form of a chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub session_key: String,
    pub turns: Vec<Turn>,
}

impl Transcript {
    /// Snapshot the session, keeping the last [`MAX_TRANSCRIPT_TURNS`] turns
    #[must_use]
    pub fn from_session(session: &ChatSession) -> Self {
        let turns = session.turns();
        let skip = turns.len().saturating_sub(MAX_TRANSCRIPT_TURNS);
        Self {
            session_key: session.session_key().to_string(),
            turns: turns[skip..].to_vec(),
        }
    }

    /// Rebuild a session with these turns and no pending state
    #[must_use]
    pub fn into_session(self) -> ChatSession {
        ChatSession::with_turns(self.session_key, self.turns)
    }

    /// Write as JSON, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), turns = self.turns.len(), "saved transcript");
        Ok(())
    }

    /// Read a transcript; `None` if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut transcript: Self = serde_json::from_str(&json)?;
        let skip = transcript.turns.len().saturating_sub(MAX_TRANSCRIPT_TURNS);
        transcript.turns.drain(..skip);
        Ok(Some(transcript))
    }
}
