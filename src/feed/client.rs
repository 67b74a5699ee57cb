//! Feed client boundary.
//!
//! A [`FeedClient`] opens one [`FeedConnection`] per credential. The
//! connection owns the only [`EventSink`] that can deliver events for it, and
//! every event it emits is stamped with the generation the sink was created
//! for. Consumers compare that stamp against their current generation, so an
//! event already queued by a superseded connection is dropped instead of
//! being applied.

use crate::credential::Credential;
use thiserror::Error;
use tokio::sync::mpsc;

use super::event::FeedEvent;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("No feed URL configured (set feed_url in config.toml or pass --feed-url)")]
    MissingUrl,

    #[error("API key contains characters that cannot be sent in a header")]
    InvalidKey,

    #[error("Connection failed: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed: code={code}, reason={reason}")]
    Closed { code: u16, reason: String },
}

// ============================================================================
// Event Delivery
// ============================================================================

/// An event tagged with the connection generation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEnvelope {
    pub generation: u64,
    pub event: FeedEvent,
}

/// Sending half handed to a connection when it is opened.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::Sender<FeedEnvelope>,
}

impl EventSink {
    pub fn new(generation: u64, tx: mpsc::Sender<FeedEnvelope>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Deliver an event, waiting for channel capacity.
    ///
    /// Returns `false` once the receiver is gone; the connection should stop.
    pub async fn emit(&self, event: FeedEvent) -> bool {
        let envelope = FeedEnvelope {
            generation: self.generation,
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::debug!(
                generation = self.generation,
                kind = e.0.event.kind().name(),
                "Feed event dropped (receiver closed)"
            );
            return false;
        }
        true
    }
}

// ============================================================================
// Client / Connection Traits
// ============================================================================

/// Factory for feed connections.
pub trait FeedClient: Send + Sync {
    /// Create a connection scoped to `credential`. Nothing is sent until
    /// [`FeedConnection::connect`] is called.
    fn open(&self, credential: &Credential, sink: EventSink) -> Box<dyn FeedConnection>;
}

/// A single connection to the feed.
pub trait FeedConnection: Send {
    /// Start connecting in the background.
    ///
    /// Fire-and-forget: the outcome is reported through `connected`,
    /// `error` and `disconnected` events, never returned to the caller.
    fn connect(&mut self);

    /// Release the connection. Safe to call in any state, more than once.
    ///
    /// After this returns the connection emits no further events.
    fn disconnect(&mut self);

    /// Whether the connection is still running.
    fn is_active(&self) -> bool;
}
