//! Feed view model.
//!
//! All state derived from the feed lives in [`FeedView`]. Each named event
//! has exactly one transition function; [`FeedView::apply`] dispatches to
//! them. Rendering reads the view and never mutates it.

use crate::feed::{FeedEvent, Listing};
use std::borrow::Cow;

/// Maximum number of listings kept in view.
pub const MAX_LISTINGS: usize = 51;

/// Connection status as last reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connected => "Connected",
        }
    }
}

/// Listings, status, last ping and last error.
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    /// Newest first, unique by listing id, at most `MAX_LISTINGS`.
    listings: Vec<Listing>,
    status: ConnectionStatus,
    ping_ms: Option<u64>,
    error: Option<String>,
}

impl FeedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one feed event.
    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Pong { ping_time_ms } => self.on_pong(ping_time_ms),
            FeedEvent::Error { message } => self.on_error(message),
            FeedEvent::Connected => self.on_connected(),
            FeedEvent::Disconnected => self.on_disconnected(),
            FeedEvent::Listed(listing) => self.on_listed(*listing),
            FeedEvent::Purchased { flow_id } => {
                self.on_purchased(&flow_id);
            }
            FeedEvent::Withdrawn { flow_id } => {
                self.on_withdrawn(&flow_id);
            }
        }
    }

    pub fn on_pong(&mut self, ping_ms: u64) {
        self.ping_ms = Some(ping_ms);
    }

    /// Record an error message. It stays until the next `connected`.
    pub fn on_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn on_connected(&mut self) {
        self.status = ConnectionStatus::Connected;
        self.error = None;
    }

    /// Does not clear the error.
    pub fn on_disconnected(&mut self) {
        self.status = ConnectionStatus::Disconnected;
    }

    /// Forget the status and ping of a connection that was torn down.
    ///
    /// Its own `disconnected` event is never applied once it is replaced.
    /// Listings and the error are kept.
    pub fn reset_connection(&mut self) {
        self.on_disconnected();
        self.ping_ms = None;
    }

    /// Prepend a listing and drop the oldest beyond `MAX_LISTINGS`.
    ///
    /// A listing whose id is already present replaces the old entry and moves
    /// to the front.
    pub fn on_listed(&mut self, listing: Listing) {
        self.remove(listing.id());
        self.listings.insert(0, listing);
        self.listings.truncate(MAX_LISTINGS);
    }

    /// Returns true if a listing was removed.
    pub fn on_purchased(&mut self, flow_id: &str) -> bool {
        self.remove(flow_id)
    }

    /// Returns true if a listing was removed.
    pub fn on_withdrawn(&mut self, flow_id: &str) -> bool {
        self.remove(flow_id)
    }

    fn remove(&mut self, flow_id: &str) -> bool {
        let before = self.listings.len();
        self.listings.retain(|l| l.id() != flow_id);
        self.listings.len() != before
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn ping_ms(&self) -> Option<u64> {
        self.ping_ms
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `"<n>ms"`, or `"N/A"` when no ping has been measured. A zero reading
    /// also shows as `"N/A"`.
    pub fn ping_label(&self) -> Cow<'static, str> {
        match self.ping_ms {
            Some(ms) if ms > 0 => Cow::Owned(format!("{}ms", ms)),
            _ => Cow::Borrowed("N/A"),
        }
    }

    /// `"Error: <message>"` while an error is recorded.
    pub fn error_label(&self) -> Option<String> {
        self.error.as_ref().map(|e| format!("Error: {}", e))
    }
}
