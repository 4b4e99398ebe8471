//! Activity log of dispatched commands
//!
//! A bounded ring buffer: the dispatcher appends one entry per dispatch,
//! presentation layers read snapshots.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Default number of retained entries
pub const DEFAULT_LOG_CAPACITY: usize = 200;

/// Per-value elision threshold in the argument summary
const MAX_VALUE_CHARS: usize = 30;

/// Whole-summary elision threshold
const MAX_SUMMARY_CHARS: usize = 80;

/// One dispatched command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub command: String,
    pub args: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    /// Serialized payload size; zero for errors
    pub response_bytes: usize,
}

/// Shared append-only ring buffer
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl ActivityLog {
    /// Log retaining at most `capacity` entries
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// All entries, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Most recent entry
    #[must_use]
    pub fn last(&self) -> Option<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

fn elide(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

/// Human-readable, bounded summary of command arguments
///
/// `key=value` pairs in key order; long string values and long summaries
/// are cut with `…`.
#[must_use]
pub fn summarize_args(params: &Value) -> String {
    let summary = match params {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.iter()
                .map(|key| {
                    let value = match &map[key.as_str()] {
                        Value::String(s) => format!("\"{}\"", elide(s, MAX_VALUE_CHARS)),
                        other => other.to_string(),
                    };
                    format!("{key}={value}")
                })
                .collect::<Vec<_>>()
                .join(", ")
        }
        Value::Null => String::new(),
        other => other.to_string(),
    };
    elide(&summary, MAX_SUMMARY_CHARS)
}

/// Summary for a parameter blob that failed to parse
#[must_use]
pub fn summarize_raw(raw: &str) -> String {
    elide(raw, MAX_SUMMARY_CHARS)
}
