//! Pending request table
//!
//! Maps request ids to the oneshot channel of the waiting caller. Entries
//! leave the table exactly once: on the matching response, on the caller's
//! timeout, or on connection teardown.

use std::collections::HashMap;

use tokio::sync::oneshot;

use super::frame::ResponseFrame;
use crate::{Error, Result};

/// Outcome delivered to a waiting caller
pub type Reply = Result<ResponseFrame>;

/// Outstanding requests keyed by id
#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: HashMap<String, oneshot::Sender<Reply>>,
}

impl PendingRequests {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request id and return the receiver the caller awaits
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the id is already outstanding
    pub fn insert(&mut self, id: &str) -> Result<oneshot::Receiver<Reply>> {
        if self.entries.contains_key(id) {
            return Err(Error::Protocol(format!("duplicate request id: {id}")));
        }
        let (tx, rx) = oneshot::channel();
        self.entries.insert(id.to_string(), tx);
        Ok(rx)
    }

    /// Deliver a response to its caller
    ///
    /// Returns false when no entry matches (stale or unknown id).
    pub fn resolve(&mut self, response: ResponseFrame) -> bool {
        match self.entries.remove(&response.id) {
            Some(tx) => {
                // Caller may have given up already; that is not an error here
                let _ = tx.send(Ok(response));
                true
            }
            None => false,
        }
    }

    /// Drop an entry without resolving it (caller timed out)
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Reject every outstanding request with `Error::ConnectionClosed`
    ///
    /// Returns the number of rejected entries.
    pub fn reject_all(&mut self) -> usize {
        let count = self.entries.len();
        for (_, tx) in self.entries.drain() {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }
        count
    }

    /// Whether `id` is outstanding
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of outstanding requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
