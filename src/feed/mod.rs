//! Live marketplace feed.
//!
//! - [`event`] - Event kinds and payloads, plus frame decoding
//! - [`client`] - The connection boundary (`FeedClient` / `FeedConnection`)
//!   and generation-stamped event delivery
//! - [`ws`] - WebSocket implementation of the boundary
//!
//! # Example
//!
//! ```ignore
//! use crate::feed::{EventSink, FeedClient, WsFeedClient, WsFeedConfig};
//!
//! let client = WsFeedClient::new(WsFeedConfig { url, ping_interval });
//! let mut conn = client.open(&credential, EventSink::new(1, tx));
//! conn.connect();
//! // ... events arrive on the receiving half of `tx` ...
//! conn.disconnect();
//! ```

pub mod client;
pub mod event;
pub mod ws;

pub use client::{EventSink, FeedClient, FeedConnection, FeedEnvelope, FeedError};
pub use event::{EventKind, FeedEvent, Listing, ListingTerms, Moment, Play, Seller};
pub use ws::{WsFeedClient, WsFeedConfig};
