//! Integration tests for the listings view and the connection lifecycle.
//!
//! The view properties are checked with proptest over arbitrary event
//! sequences; the lifecycle tests drive `App` with an in-memory feed client.

use listwatch::app::App;
use listwatch::config::Config;
use listwatch::controller::FeedController;
use listwatch::credential::Credential;
use listwatch::feed::{
    EventSink, FeedClient, FeedConnection, FeedEnvelope, FeedEvent, Listing, ListingTerms,
    Moment, Play, Seller,
};
use listwatch::view::{ConnectionStatus, FeedView, MAX_LISTINGS};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

fn listing(id: &str) -> Listing {
    Listing {
        timestamp: 1_700_000_000,
        moment: Moment {
            flow_id: id.to_string(),
            serial_number: 1,
            external_id: format!("ext-{}", id),
        },
        play: Play {
            player_name: "Nikola Jokic".to_string(),
            play_category: "Handles".to_string(),
        },
        listing: ListingTerms {
            price: 20.0,
            seller: Seller {
                top_shot_username: Some("joker".to_string()),
                flow_address: "0x15".to_string(),
            },
        },
    }
}

fn ids(view: &FeedView) -> Vec<String> {
    view.listings().iter().map(|l| l.id().to_string()).collect()
}

// ============================================================================
// View Properties
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    List(u8),
    Purchase(u8),
    Withdraw(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u8>().prop_map(Op::List),
        1 => any::<u8>().prop_map(Op::Purchase),
        1 => any::<u8>().prop_map(Op::Withdraw),
    ]
}

/// Straightforward model: newest first, unique ids, capped.
fn model_apply(model: &mut Vec<String>, op: &Op) {
    match op {
        Op::List(n) => {
            let id = n.to_string();
            model.retain(|m| *m != id);
            model.insert(0, id);
            model.truncate(MAX_LISTINGS);
        }
        Op::Purchase(n) | Op::Withdraw(n) => {
            let id = n.to_string();
            model.retain(|m| *m != id);
        }
    }
}

fn view_apply(view: &mut FeedView, op: &Op) {
    let event = match op {
        Op::List(n) => FeedEvent::Listed(Box::new(listing(&n.to_string()))),
        Op::Purchase(n) => FeedEvent::Purchased {
            flow_id: n.to_string(),
        },
        Op::Withdraw(n) => FeedEvent::Withdrawn {
            flow_id: n.to_string(),
        },
    };
    view.apply(event);
}

proptest! {
    #[test]
    fn listings_never_exceed_cap(ids_in in proptest::collection::vec(0u32..10_000, 0..200)) {
        let mut view = FeedView::new();
        for id in &ids_in {
            view.apply(FeedEvent::Listed(Box::new(listing(&id.to_string()))));
            prop_assert!(view.listings().len() <= MAX_LISTINGS);
        }
        if let Some(last) = ids_in.last() {
            prop_assert_eq!(view.listings()[0].id(), last.to_string());
        }
    }

    #[test]
    fn view_matches_model(ops in proptest::collection::vec(op(), 0..300)) {
        let mut view = FeedView::new();
        let mut model = Vec::new();
        for op in &ops {
            view_apply(&mut view, op);
            model_apply(&mut model, op);
        }
        prop_assert_eq!(ids(&view), model);
    }

    #[test]
    fn removal_only_removes_matching_id(
        present in proptest::collection::hash_set(0u8..100, 1..40),
        target in 0u8..100,
    ) {
        let mut view = FeedView::new();
        for id in &present {
            view.apply(FeedEvent::Listed(Box::new(listing(&id.to_string()))));
        }
        let before = ids(&view);

        view.apply(FeedEvent::Withdrawn { flow_id: target.to_string() });

        let target = target.to_string();
        prop_assert!(!ids(&view).contains(&target));
        let expected: Vec<String> = before.into_iter().filter(|id| *id != target).collect();
        prop_assert_eq!(ids(&view), expected);
    }

    #[test]
    fn lifecycle_events_never_touch_listings(n in 0usize..60) {
        let mut view = FeedView::new();
        for i in 0..n {
            view.apply(FeedEvent::Listed(Box::new(listing(&i.to_string()))));
        }
        let before = ids(&view);
        view.apply(FeedEvent::Disconnected);
        view.apply(FeedEvent::Error { message: "boom".to_string() });
        view.apply(FeedEvent::Pong { ping_time_ms: 3 });
        view.apply(FeedEvent::Connected);
        prop_assert_eq!(ids(&view), before);
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Feed client that records connection calls and hands out its sinks.
#[derive(Default)]
struct ScriptedClient {
    calls: Arc<Mutex<Vec<String>>>,
    sinks: Arc<Mutex<Vec<EventSink>>>,
}

struct ScriptedConnection {
    key: String,
    calls: Arc<Mutex<Vec<String>>>,
    active: bool,
}

impl FeedClient for ScriptedClient {
    fn open(&self, credential: &Credential, sink: EventSink) -> Box<dyn FeedConnection> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("open {}", credential.expose()));
        self.sinks.lock().unwrap().push(sink);
        Box::new(ScriptedConnection {
            key: credential.expose().to_string(),
            calls: Arc::clone(&self.calls),
            active: false,
        })
    }
}

impl FeedConnection for ScriptedConnection {
    fn connect(&mut self) {
        self.active = true;
        self.calls.lock().unwrap().push(format!("connect {}", self.key));
    }

    fn disconnect(&mut self) {
        self.active = false;
        self.calls
            .lock()
            .unwrap()
            .push(format!("disconnect {}", self.key));
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

struct Harness {
    app: App,
    rx: mpsc::Receiver<FeedEnvelope>,
    calls: Arc<Mutex<Vec<String>>>,
    sinks: Arc<Mutex<Vec<EventSink>>>,
}

impl Harness {
    fn new() -> Self {
        let client = ScriptedClient::default();
        let calls = Arc::clone(&client.calls);
        let sinks = Arc::clone(&client.sinks);
        let (tx, rx) = mpsc::channel(64);
        let controller = FeedController::new(Arc::new(client), tx);
        Self {
            app: App::new(&Config::default(), controller),
            rx,
            calls,
            sinks,
        }
    }

    fn confirm_key(&mut self, key: &str) -> bool {
        self.app.key_input = key.to_string();
        self.app.submit_key()
    }

    /// Emit from the newest connection and pump the channel into the app.
    async fn server_sends(&mut self, event: FeedEvent) {
        let sink = self.sinks.lock().unwrap().last().cloned().unwrap();
        assert!(sink.emit(event).await);
        self.pump();
    }

    fn pump(&mut self) {
        while let Ok(envelope) = self.rx.try_recv() {
            self.app.handle_feed_event(envelope);
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_scenario_list_then_purchase() {
    let mut h = Harness::new();
    assert!(h.confirm_key("ABC123"));
    assert_eq!(h.calls(), vec!["open ABC123", "connect ABC123"]);

    h.server_sends(FeedEvent::Connected).await;
    assert_eq!(h.app.view.status(), ConnectionStatus::Connected);
    assert_eq!(h.app.view.status().label(), "Connected");

    h.server_sends(FeedEvent::Listed(Box::new(listing("X1")))).await;
    assert_eq!(ids(&h.app.view), vec!["X1"]);

    h.server_sends(FeedEvent::Purchased {
        flow_id: "X1".to_string(),
    })
    .await;
    assert!(h.app.view.listings().is_empty());
}

#[tokio::test]
async fn test_scenario_error_cleared_by_connected() {
    let mut h = Harness::new();
    h.confirm_key("ABC123");

    h.server_sends(FeedEvent::Error {
        message: "auth failed".to_string(),
    })
    .await;
    assert_eq!(h.app.view.status(), ConnectionStatus::Disconnected);
    assert_eq!(h.app.view.error_label().as_deref(), Some("Error: auth failed"));

    h.server_sends(FeedEvent::Disconnected).await;
    assert_eq!(h.app.view.error(), Some("auth failed"));

    h.server_sends(FeedEvent::Connected).await;
    assert_eq!(h.app.view.error(), None);
}

#[tokio::test]
async fn test_blank_key_never_changes_credential() {
    let mut h = Harness::new();
    for blank in ["", " ", "\t\n", "   "] {
        assert!(!h.confirm_key(blank));
    }
    assert!(h.app.credential().is_none());
    assert!(h.calls().is_empty());

    h.confirm_key("real");
    for blank in ["", "  "] {
        h.confirm_key(blank);
    }
    assert_eq!(h.app.credential().map(Credential::expose), Some("real"));
    assert_eq!(h.calls().len(), 2);
}

#[tokio::test]
async fn test_key_change_disconnects_before_reopening() {
    let mut h = Harness::new();
    h.confirm_key("first");
    h.confirm_key("second");
    h.confirm_key("second");
    h.confirm_key("third");

    assert_eq!(
        h.calls(),
        vec![
            "open first",
            "connect first",
            "disconnect first",
            "open second",
            "connect second",
            "disconnect second",
            "open third",
            "connect third",
        ]
    );
}

#[tokio::test]
async fn test_key_change_shows_new_connection_as_disconnected() {
    let mut h = Harness::new();
    h.confirm_key("A");
    h.server_sends(FeedEvent::Connected).await;
    h.server_sends(FeedEvent::Pong { ping_time_ms: 42 }).await;
    assert_eq!(h.app.view.ping_label(), "42ms");

    h.confirm_key("B");
    // The torn-down connection's own disconnect never reaches the view
    let old = h.sinks.lock().unwrap()[0].clone();
    old.emit(FeedEvent::Disconnected).await;
    h.pump();

    assert_eq!(h.app.view.status(), ConnectionStatus::Disconnected);
    assert_eq!(h.app.view.ping_label(), "N/A");

    h.server_sends(FeedEvent::Connected).await;
    assert_eq!(h.app.view.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn test_superseded_connection_cannot_mutate_view() {
    let mut h = Harness::new();
    h.confirm_key("first");
    let old = h.sinks.lock().unwrap()[0].clone();
    h.server_sends(FeedEvent::Connected).await;

    h.confirm_key("second");
    old.emit(FeedEvent::Listed(Box::new(listing("ghost")))).await;
    old.emit(FeedEvent::Error {
        message: "late".to_string(),
    })
    .await;
    h.pump();

    assert!(h.app.view.listings().is_empty());
    assert_eq!(h.app.view.error(), None);

    h.server_sends(FeedEvent::Listed(Box::new(listing("live")))).await;
    assert_eq!(ids(&h.app.view), vec!["live"]);
}

#[tokio::test]
async fn test_dropping_app_disconnects() {
    let h = Harness::new();
    let calls = Arc::clone(&h.calls);
    let mut app = h.app;
    app.key_input = "k".to_string();
    app.submit_key();
    drop(app);

    assert_eq!(calls.lock().unwrap().last().map(String::as_str), Some("disconnect k"));
}
