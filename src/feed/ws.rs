//! WebSocket feed client.
//!
//! Thin adapter between the feed service and the [`FeedClient`] boundary:
//! one socket per connection, JSON text frames decoded into [`FeedEvent`]s,
//! and a periodic WebSocket ping whose round trip is reported as `pong`.
//! There is no reconnect loop; a dropped socket ends with `disconnected`.

use futures::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use crate::credential::Credential;

use super::client::{EventSink, FeedClient, FeedConnection, FeedError};
use super::event::FeedEvent;

/// Request header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Settings shared by every connection the client opens.
#[derive(Debug, Clone)]
pub struct WsFeedConfig {
    pub url: String,
    pub ping_interval: Duration,
}

impl Default for WsFeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            ping_interval: Duration::from_secs(10),
        }
    }
}

/// [`FeedClient`] backed by `tokio-tungstenite`.
pub struct WsFeedClient {
    config: WsFeedConfig,
}

impl WsFeedClient {
    pub fn new(config: WsFeedConfig) -> Self {
        Self { config }
    }
}

impl FeedClient for WsFeedClient {
    fn open(&self, credential: &Credential, sink: EventSink) -> Box<dyn FeedConnection> {
        Box::new(WsConnection {
            config: self.config.clone(),
            api_key: SecretString::from(credential.expose().to_string()),
            sink: Some(sink),
            cancel: CancellationToken::new(),
            handle: None,
        })
    }
}

/// A single socket session.
pub struct WsConnection {
    config: WsFeedConfig,
    api_key: SecretString,
    sink: Option<EventSink>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FeedConnection for WsConnection {
    fn connect(&mut self) {
        if self.handle.is_some() {
            tracing::warn!("Feed connection already started, ignoring connect");
            return;
        }
        // Disconnected before ever connecting
        let Some(sink) = self.sink.clone() else {
            return;
        };

        tracing::info!(
            url = %self.config.url,
            generation = sink.generation(),
            "Connecting to feed"
        );

        self.handle = Some(tokio::spawn(run_connection(
            self.config.clone(),
            SecretString::from(self.api_key.expose_secret().to_string()),
            sink,
            self.cancel.clone(),
        )));
    }

    fn disconnect(&mut self) {
        self.cancel.cancel();
        if let Some(sink) = self.sink.take() {
            tracing::info!(generation = sink.generation(), "Disconnecting from feed");
        }
        // The task observes the token at its next poll and sends a Close frame.
        self.handle = None;
    }

    fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Connection task: stream events until the socket ends or the token fires.
async fn run_connection(
    config: WsFeedConfig,
    api_key: SecretString,
    sink: EventSink,
    cancel: CancellationToken,
) {
    let result = stream_events(&config, &api_key, &sink, &cancel).await;

    if cancel.is_cancelled() {
        tracing::debug!(generation = sink.generation(), "Feed connection cancelled");
        return;
    }

    if let Err(e) = result {
        tracing::warn!(generation = sink.generation(), error = %e, "Feed connection failed");
        sink.emit(FeedEvent::Error {
            message: e.to_string(),
        })
        .await;
    }
    sink.emit(FeedEvent::Disconnected).await;
}

async fn stream_events(
    config: &WsFeedConfig,
    api_key: &SecretString,
    sink: &EventSink,
    cancel: &CancellationToken,
) -> Result<(), FeedError> {
    if config.url.trim().is_empty() {
        return Err(FeedError::MissingUrl);
    }

    let mut request = config.url.as_str().into_client_request()?;
    let key = HeaderValue::from_str(api_key.expose_secret()).map_err(|_| FeedError::InvalidKey)?;
    request.headers_mut().insert(API_KEY_HEADER, key);

    let (ws_stream, _response) = tokio::select! {
        biased;

        () = cancel.cancelled() => return Ok(()),
        result = connect_async(request) => result?,
    };
    let (mut write, mut read) = ws_stream.split();

    tracing::info!(generation = sink.generation(), "Feed connected");
    if !sink.emit(FeedEvent::Connected).await {
        return Ok(());
    }

    let mut ping_timer = tokio::time::interval(config.ping_interval);
    ping_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut pinger = PingTracker::default();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "Failed to send Close frame");
                }
                return Ok(());
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match FeedEvent::decode(&text) {
                        Ok(Some(event)) => {
                            if !sink.emit(event).await {
                                return Ok(());
                            }
                        }
                        Ok(None) => {}
                        // Skipped; one bad frame does not fail a healthy connection
                        Err(e) => {
                            tracing::warn!(error = %e, "Skipping undecodable feed frame");
                        }
                    },
                    Some(Ok(Message::Pong(payload))) => {
                        if let Some(ping_time_ms) = pinger.on_pong(&payload) {
                            tracing::trace!(ping_time_ms, "Pong received");
                            if !sink.emit(FeedEvent::Pong { ping_time_ms }).await {
                                return Ok(());
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((1000, String::new()));
                        tracing::info!(code, %reason, "Feed closed by server");
                        if code == 1000 {
                            return Ok(());
                        }
                        return Err(FeedError::Closed { code, reason });
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }

            _ = ping_timer.tick() => {
                write.send(Message::Ping(pinger.next_payload())).await?;
            }
        }
    }
}

/// Matches ping payloads to pongs to measure round-trip time.
#[derive(Debug, Default)]
struct PingTracker {
    nonce: u64,
    sent_at: Option<(u64, Instant)>,
}

impl PingTracker {
    fn next_payload(&mut self) -> Vec<u8> {
        self.nonce = self.nonce.wrapping_add(1);
        self.sent_at = Some((self.nonce, Instant::now()));
        self.nonce.to_be_bytes().to_vec()
    }

    /// Latency in ms if `payload` answers the outstanding ping.
    fn on_pong(&mut self, payload: &[u8]) -> Option<u64> {
        let bytes: [u8; 8] = payload.try_into().ok()?;
        let (nonce, sent) = self.sent_at?;
        if u64::from_be_bytes(bytes) != nonce {
            return None;
        }
        self.sent_at = None;
        Some(u64::try_from(sent.elapsed().as_millis()).unwrap_or(u64::MAX))
    }
}
