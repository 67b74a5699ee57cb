//! Feed event payloads.
//!
//! The feed service pushes JSON frames shaped as
//! `{"type": "<kind>", "data": {...}}`. Lifecycle events (`connected`,
//! `disconnected`) are produced by the transport itself and never arrive
//! as frames.

use serde::{Deserialize, Deserializer};

// ============================================================================
// Event Kinds
// ============================================================================

/// The named events a feed connection emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Pong,
    Error,
    Connected,
    Disconnected,
    Listed,
    Purchased,
    Withdrawn,
}

impl EventKind {
    /// Every kind, in the order handlers are documented.
    pub const ALL: [EventKind; 7] = [
        EventKind::Pong,
        EventKind::Error,
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::Listed,
        EventKind::Purchased,
        EventKind::Withdrawn,
    ];

    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pong => "pong",
            Self::Error => "error",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Listed => "moment-listed",
            Self::Purchased => "moment-purchased",
            Self::Withdrawn => "moment-withdrawn",
        }
    }

    /// Look up a kind by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

// ============================================================================
// Listing Payload
// ============================================================================

/// A single marketplace listing as delivered by a `moment-listed` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Unix seconds.
    pub timestamp: i64,
    pub moment: Moment,
    pub play: Play,
    pub listing: ListingTerms,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    /// Unique identifier of the listed item; the dedupe and removal key.
    #[serde(deserialize_with = "string_or_number")]
    pub flow_id: String,
    pub serial_number: u64,
    /// Identifier used to build the purchase link.
    #[serde(deserialize_with = "string_or_number")]
    pub external_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub player_name: String,
    pub play_category: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingTerms {
    pub price: f64,
    pub seller: Seller,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    #[serde(default)]
    pub top_shot_username: Option<String>,
    pub flow_address: String,
}

impl Listing {
    pub fn id(&self) -> &str {
        &self.moment.flow_id
    }

    /// Seller username, falling back to the on-chain address.
    pub fn seller_name(&self) -> &str {
        self.listing
            .seller
            .top_shot_username
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.listing.seller.flow_address)
    }
}

// ============================================================================
// Other Payloads
// ============================================================================

/// Payload of `moment-purchased` and `moment-withdrawn`: only the item id matters here.
#[derive(Debug, Clone, Deserialize)]
struct MomentRef {
    moment: MomentId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MomentId {
    #[serde(deserialize_with = "string_or_number")]
    flow_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PongData {
    ping_time: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorData {
    error: String,
}

/// Outer frame; `data` is decoded once the kind is known.
#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Ids arrive as strings from some endpoints and as numbers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

// ============================================================================
// Feed Event
// ============================================================================

/// One event emitted by a feed connection.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Round-trip latency of the last ping, in milliseconds.
    Pong { ping_time_ms: u64 },
    Error { message: String },
    Connected,
    Disconnected,
    Listed(Box<Listing>),
    Purchased { flow_id: String },
    Withdrawn { flow_id: String },
}

impl FeedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Pong { .. } => EventKind::Pong,
            Self::Error { .. } => EventKind::Error,
            Self::Connected => EventKind::Connected,
            Self::Disconnected => EventKind::Disconnected,
            Self::Listed(_) => EventKind::Listed,
            Self::Purchased { .. } => EventKind::Purchased,
            Self::Withdrawn { .. } => EventKind::Withdrawn,
        }
    }

    /// Decode a text frame from the feed service.
    ///
    /// Returns `Ok(None)` for frame types this application does not handle,
    /// including lifecycle kinds, which only the transport may emit.
    pub fn decode(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let frame: Frame = serde_json::from_str(text)?;

        let event = match EventKind::from_name(&frame.kind) {
            Some(EventKind::Listed) => {
                Self::Listed(Box::new(serde_json::from_value(frame.data)?))
            }
            Some(EventKind::Purchased) => {
                let r: MomentRef = serde_json::from_value(frame.data)?;
                Self::Purchased {
                    flow_id: r.moment.flow_id,
                }
            }
            Some(EventKind::Withdrawn) => {
                let r: MomentRef = serde_json::from_value(frame.data)?;
                Self::Withdrawn {
                    flow_id: r.moment.flow_id,
                }
            }
            Some(EventKind::Pong) => {
                let p: PongData = serde_json::from_value(frame.data)?;
                Self::Pong {
                    ping_time_ms: p.ping_time,
                }
            }
            Some(EventKind::Error) => {
                let e: ErrorData = serde_json::from_value(frame.data)?;
                Self::Error { message: e.error }
            }
            Some(EventKind::Connected) | Some(EventKind::Disconnected) | None => {
                tracing::debug!(kind = %frame.kind, "Ignoring feed frame");
                return Ok(None);
            }
        };

        Ok(Some(event))
    }
}
