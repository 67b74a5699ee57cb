//! Feed connection lifecycle.
//!
//! [`FeedController`] keeps at most one live connection, scoped to the
//! active credential. Replacing the credential disconnects the old
//! connection before the new one is opened, and bumps the generation so
//! events still queued from the old connection are rejected by
//! [`FeedController::accepts`].

use crate::credential::Credential;
use crate::feed::{EventSink, FeedClient, FeedConnection, FeedEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;

struct ActiveFeed {
    credential: Credential,
    connection: Box<dyn FeedConnection>,
}

pub struct FeedController {
    client: Arc<dyn FeedClient>,
    tx: mpsc::Sender<FeedEnvelope>,
    generation: u64,
    active: Option<ActiveFeed>,
}

impl FeedController {
    pub fn new(client: Arc<dyn FeedClient>, tx: mpsc::Sender<FeedEnvelope>) -> Self {
        Self {
            client,
            tx,
            generation: 0,
            active: None,
        }
    }

    /// The credential the current connection is scoped to.
    pub fn credential(&self) -> Option<&Credential> {
        self.active.as_ref().map(|a| &a.credential)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the current connection is still running.
    pub fn is_connected(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.connection.is_active())
    }

    /// Make `credential` the active one and connect with it.
    ///
    /// Re-submitting the active credential keeps a running connection and
    /// returns `false`. Once that connection has ended, the same credential
    /// opens a fresh one.
    pub fn set_credential(&mut self, credential: Credential) -> bool {
        if self.credential() == Some(&credential) && self.is_connected() {
            tracing::debug!(generation = self.generation, "Credential unchanged");
            return false;
        }

        self.teardown();

        self.generation = self.generation.wrapping_add(1);
        let sink = EventSink::new(self.generation, self.tx.clone());
        let mut connection = self.client.open(&credential, sink);
        connection.connect();

        tracing::info!(generation = self.generation, "Feed connection opened");
        self.active = Some(ActiveFeed {
            credential,
            connection,
        });
        true
    }

    /// Disconnect the current connection, if any.
    pub fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.connection.disconnect();
            tracing::info!(generation = self.generation, "Feed connection closed");
        }
    }

    /// Whether an event belongs to the live connection.
    pub fn accepts(&self, envelope: &FeedEnvelope) -> bool {
        self.active.is_some() && envelope.generation == self.generation
    }
}

impl Drop for FeedController {
    fn drop(&mut self) {
        self.teardown();
    }
}
