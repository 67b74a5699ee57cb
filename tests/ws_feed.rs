//! Integration tests for the WebSocket feed client.
//!
//! Each test runs a one-shot tungstenite server on an ephemeral localhost
//! port and drives a real `WsFeedClient` connection against it.

use futures::{SinkExt, StreamExt};
use listwatch::credential::Credential;
use listwatch::feed::{EventSink, FeedClient, FeedEnvelope, FeedEvent, WsFeedClient, WsFeedConfig};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, accept_hdr_async};

const LISTED_X1: &str = r#"{"type":"moment-listed","data":{"timestamp":1700000000,"moment":{"flowId":"X1","serialNumber":7,"externalId":"ext-x1"},"play":{"playerName":"Luka Doncic","playCategory":"Assist"},"listing":{"price":45,"seller":{"topShotUsername":null,"flowAddress":"0x01"}}}}"#;
const PURCHASED_X1: &str = r#"{"type":"moment-purchased","data":{"moment":{"flowId":"X1"}}}"#;
const SERVER_PONG: &str = r#"{"type":"pong","data":{"pingTime":42}}"#;

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("ws://{}", addr))
}

fn client(url: String) -> WsFeedClient {
    WsFeedClient::new(WsFeedConfig {
        url,
        ping_interval: Duration::from_secs(60),
    })
}

async fn next_event(rx: &mut mpsc::Receiver<FeedEnvelope>) -> FeedEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for feed event")
        .expect("feed channel closed")
        .event
}

/// Collect events until the channel closes, skipping transport ping results.
async fn drain(rx: &mut mpsc::Receiver<FeedEnvelope>) -> Vec<FeedEvent> {
    let mut events = Vec::new();
    while let Ok(Some(envelope)) = timeout(Duration::from_secs(5), rx.recv()).await {
        events.push(envelope.event);
    }
    events
}

#[tokio::test]
async fn test_events_flow_from_server_with_api_key_header() {
    let (listener, url) = bind().await;
    let (header_tx, header_rx) = oneshot::channel::<Option<String>>();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let key = req
                .headers()
                .get("x-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let _ = header_tx.send(key);
            Ok(resp)
        };
        let mut ws = accept_hdr_async(stream, callback).await.unwrap();
        ws.send(Message::Text(LISTED_X1.to_string())).await.unwrap();
        ws.send(Message::Text(SERVER_PONG.to_string())).await.unwrap();
        ws.send(Message::Text(PURCHASED_X1.to_string())).await.unwrap();
        ws.send(Message::Text(r#"{"type":"heartbeat","data":{}}"#.to_string()))
            .await
            .unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        }))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let (tx, mut rx) = mpsc::channel(32);
    let credential = Credential::from_input("  ABC123 ").unwrap();
    let mut conn = client(url).open(&credential, EventSink::new(7, tx));
    conn.connect();

    assert_eq!(header_rx.await.unwrap().as_deref(), Some("ABC123"));

    let first = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    assert_eq!(first.generation, 7);
    assert_eq!(first.event, FeedEvent::Connected);

    server.await.unwrap();
    conn.disconnect();
    drop(conn);

    // The opening transport ping may or may not be answered before close
    let events: Vec<FeedEvent> = drain(&mut rx)
        .await
        .into_iter()
        .filter(|e| !matches!(e, FeedEvent::Pong { ping_time_ms } if *ping_time_ms != 42))
        .collect();

    assert_eq!(events.len(), 4, "unexpected events: {:?}", events);
    match &events[0] {
        FeedEvent::Listed(listing) => {
            assert_eq!(listing.id(), "X1");
            assert_eq!(listing.seller_name(), "0x01");
        }
        other => panic!("expected listing, got {:?}", other),
    }
    assert_eq!(events[1], FeedEvent::Pong { ping_time_ms: 42 });
    assert_eq!(
        events[2],
        FeedEvent::Purchased {
            flow_id: "X1".to_string()
        }
    );
    assert_eq!(events[3], FeedEvent::Disconnected);
}

#[tokio::test]
async fn test_rejected_handshake_reports_error_then_disconnected() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |_req: &Request, _resp: Response| -> Result<Response, ErrorResponse> {
            let mut rejection = ErrorResponse::new(Some("invalid api key".to_string()));
            *rejection.status_mut() = StatusCode::UNAUTHORIZED;
            Err(rejection)
        };
        let _ = accept_hdr_async(stream, callback).await;
    });

    let (tx, mut rx) = mpsc::channel(8);
    let credential = Credential::from_input("wrong").unwrap();
    let mut conn = client(url).open(&credential, EventSink::new(1, tx));
    conn.connect();

    match next_event(&mut rx).await {
        FeedEvent::Error { message } => assert!(message.contains("401"), "{}", message),
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(next_event(&mut rx).await, FeedEvent::Disconnected);
    server.await.unwrap();
}

#[tokio::test]
async fn test_abnormal_close_reports_error() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Policy,
            reason: "rate limited".into(),
        }))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let (tx, mut rx) = mpsc::channel(8);
    let credential = Credential::from_input("ABC123").unwrap();
    let mut conn = client(url).open(&credential, EventSink::new(1, tx));
    conn.connect();

    assert_eq!(next_event(&mut rx).await, FeedEvent::Connected);
    loop {
        match next_event(&mut rx).await {
            FeedEvent::Pong { .. } => continue,
            FeedEvent::Error { message } => {
                assert!(message.contains("rate limited"), "{}", message);
                break;
            }
            other => panic!("expected error, got {:?}", other),
        }
    }
    assert_eq!(next_event(&mut rx).await, FeedEvent::Disconnected);
    server.await.unwrap();
}

#[tokio::test]
async fn test_transport_ping_reported_as_pong() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        // Reading drives the automatic Pong reply
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                break;
            }
        }
    });

    let (tx, mut rx) = mpsc::channel(8);
    let credential = Credential::from_input("ABC123").unwrap();
    let mut conn = client(url).open(&credential, EventSink::new(1, tx));
    conn.connect();

    assert_eq!(next_event(&mut rx).await, FeedEvent::Connected);
    assert!(matches!(next_event(&mut rx).await, FeedEvent::Pong { .. }));

    conn.disconnect();
    server.await.unwrap();
}

#[tokio::test]
async fn test_disconnect_sends_close_and_stops_events() {
    let (listener, url) = bind().await;
    let (go_tx, go_rx) = oneshot::channel::<()>();
    let (closed_tx, closed_rx) = oneshot::channel::<bool>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        go_rx.await.unwrap();
        // The client may already be gone; a failed send is fine here
        let _ = ws.send(Message::Text(LISTED_X1.to_string())).await;

        let mut saw_close = false;
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                saw_close = true;
                break;
            }
        }
        let _ = closed_tx.send(saw_close);
    });

    let (tx, mut rx) = mpsc::channel(8);
    let credential = Credential::from_input("ABC123").unwrap();
    let mut conn = client(url).open(&credential, EventSink::new(1, tx));
    conn.connect();
    assert_eq!(next_event(&mut rx).await, FeedEvent::Connected);

    conn.disconnect();
    assert!(!conn.is_active());
    go_tx.send(()).unwrap();

    let saw_close = timeout(Duration::from_secs(5), closed_rx).await.unwrap().unwrap();
    assert!(saw_close, "server never saw a Close frame");

    drop(conn);
    let late = drain(&mut rx).await;
    assert!(
        late.iter().all(|e| matches!(e, FeedEvent::Pong { .. })),
        "events after disconnect: {:?}",
        late
    );
}

#[tokio::test]
async fn test_undecodable_frame_is_skipped() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text("not json".to_string())).await.unwrap();
        ws.send(Message::Text(r#"{"type":"moment-listed","data":{}}"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::Text(LISTED_X1.to_string())).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        }))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let (tx, mut rx) = mpsc::channel(16);
    let credential = Credential::from_input("ABC123").unwrap();
    let mut conn = client(url).open(&credential, EventSink::new(1, tx));
    conn.connect();

    assert_eq!(next_event(&mut rx).await, FeedEvent::Connected);
    server.await.unwrap();
    drop(conn);

    let events: Vec<FeedEvent> = drain(&mut rx)
        .await
        .into_iter()
        .filter(|e| !matches!(e, FeedEvent::Pong { .. }))
        .collect();

    assert_eq!(events.len(), 2, "unexpected events: {:?}", events);
    assert!(matches!(&events[0], FeedEvent::Listed(listing) if listing.id() == "X1"));
    assert_eq!(events[1], FeedEvent::Disconnected);
}

#[tokio::test]
async fn test_closed_receiver_stops_connection_on_pong() {
    let (listener, url) = bind().await;
    let (go_tx, go_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        // The opening ping stays unanswered until the receiver is gone
        go_rx.await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                break;
            }
        }
    });

    let (tx, mut rx) = mpsc::channel(8);
    let credential = Credential::from_input("ABC123").unwrap();
    let mut conn = client(url).open(&credential, EventSink::new(1, tx));
    conn.connect();
    assert_eq!(next_event(&mut rx).await, FeedEvent::Connected);

    drop(rx);
    go_tx.send(()).unwrap();

    // Answering the ping makes the client emit into a closed channel and hang up
    timeout(Duration::from_secs(5), server)
        .await
        .expect("connection kept running after its receiver closed")
        .unwrap();
    drop(conn);
}
