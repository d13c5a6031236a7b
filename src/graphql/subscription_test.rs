use super::*;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, timeout};

// =============================================================================
// ws_url
// =============================================================================

#[test]
fn ws_url_swaps_scheme() {
    assert_eq!(ws_url("http://backend:8080/api/graphql").unwrap(), "ws://backend:8080/api/graphql");
    assert_eq!(ws_url("https://hubbit.chalmers.it/api/graphql").unwrap(), "wss://hubbit.chalmers.it/api/graphql");
    assert_eq!(ws_url("ws://already/api/graphql").unwrap(), "ws://already/api/graphql");
}

#[test]
fn ws_url_rejects_unknown_scheme() {
    assert!(matches!(ws_url("ftp://nope"), Err(SubscriptionError::Url(_))));
}

// =============================================================================
// messages
// =============================================================================

#[test]
fn client_messages_use_transport_names() {
    let init = serde_json::to_value(ClientMessage::ConnectionInit { payload: json!({}) }).unwrap();
    assert_eq!(init, json!({ "type": "connection_init", "payload": {} }));

    let request = Request::new(USER_LEAVE).named("UserLeave");
    let subscribe = serde_json::to_value(ClientMessage::Subscribe { id: LEAVE_ID, payload: &request }).unwrap();
    assert_eq!(subscribe["type"], "subscribe");
    assert_eq!(subscribe["id"], "leave");
    assert_eq!(subscribe["payload"]["operationName"], "UserLeave");

    assert_eq!(serde_json::to_value(ClientMessage::Pong).unwrap(), json!({ "type": "pong" }));
}

#[test]
fn server_messages_tolerate_extra_fields_and_unknown_types() {
    let ack: ServerMessage = serde_json::from_value(json!({ "type": "connection_ack", "payload": {} })).unwrap();
    assert!(matches!(ack, ServerMessage::ConnectionAck));
    let other: ServerMessage = serde_json::from_value(json!({ "type": "something_new" })).unwrap();
    assert!(matches!(other, ServerMessage::Unknown));
}

#[test]
fn decode_event_maps_join_and_leave() {
    let join: Response = serde_json::from_value(json!({ "data": { "userJoin": {
        "user": { "cid": "smurf", "nick": "Smurf", "groups": ["digit"] },
        "startTime": "2021-09-01T08:00:00Z"
    } } }))
    .unwrap();
    let Some(PresenceEvent::Join(session)) = decode_event(JOIN_ID, join).unwrap() else {
        panic!("expected join");
    };
    assert_eq!(session.user.cid, "smurf");

    let leave: Response = serde_json::from_value(json!({ "data": { "userLeave": { "cid": "smurf", "nick": "Smurf" } } })).unwrap();
    assert_eq!(
        decode_event(LEAVE_ID, leave).unwrap(),
        Some(PresenceEvent::Leave(UserRef { cid: "smurf".into(), nick: "Smurf".into() }))
    );
}

#[test]
fn decode_event_ignores_foreign_ids_and_surfaces_errors() {
    let any: Response = serde_json::from_value(json!({ "data": {} })).unwrap();
    assert_eq!(decode_event("other", any).unwrap(), None);

    let failed: Response = serde_json::from_value(json!({ "errors": [{ "message": "boom" }] })).unwrap();
    assert!(matches!(decode_event(JOIN_ID, failed), Err(GraphqlError::Errors(_))));
}

#[test]
fn presence_event_names() {
    let leave = PresenceEvent::Leave(UserRef { cid: "a".into(), nick: "A".into() });
    assert_eq!(leave.name(), "leave");
}

// =============================================================================
// relay against a scripted backend
// =============================================================================

const HANDSHAKE: Duration = Duration::from_secs(2);

struct Backend {
    script: Vec<Value>,
    cookie: Mutex<Option<String>>,
}

async fn backend_ws(ws: WebSocketUpgrade, headers: HeaderMap, State(backend): State<Arc<Backend>>) -> impl IntoResponse {
    *backend.cookie.lock().unwrap() = headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    ws.protocols([PROTOCOL])
        .on_upgrade(move |socket| play_script(socket, backend))
}

async fn play_script(mut socket: WebSocket, backend: Arc<Backend>) {
    let Some(Ok(WsMessage::Text(init))) = socket.recv().await else {
        return;
    };
    assert!(init.as_str().contains("connection_init"));
    let ack = json!({ "type": "connection_ack" }).to_string();
    if socket.send(WsMessage::Text(ack.into())).await.is_err() {
        return;
    }
    for _ in 0..2 {
        let Some(Ok(WsMessage::Text(sub))) = socket.recv().await else {
            return;
        };
        assert!(sub.as_str().contains("\"subscribe\""));
    }
    for message in &backend.script {
        if socket.send(WsMessage::Text(message.to_string().into())).await.is_err() {
            return;
        }
    }
    // Hold the socket open until the client leaves.
    while let Some(Ok(_)) = socket.recv().await {}
}

async fn spawn_backend(script: Vec<Value>) -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend { script, cookie: Mutex::new(None) });
    let app = axum::Router::new()
        .route("/api/graphql", get(backend_ws))
        .with_state(backend.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("ws://{addr}/api/graphql"), backend)
}

fn viewer_headers() -> Headers {
    HashMap::from([
        ("cookie".to_string(), "gamma=abc".to_string()),
        ("host".to_string(), "hubbit.local".to_string()),
    ])
}

#[tokio::test]
async fn relay_forwards_cookie_and_streams_events_until_complete() {
    let (url, backend) = spawn_backend(vec![
        json!({ "type": "ping" }),
        json!({ "type": "next", "id": "join", "payload": { "data": { "userJoin": {
            "user": { "cid": "smurf", "nick": "Smurf" }, "startTime": "2021-09-01T08:00:00Z"
        } } } }),
        json!({ "type": "next", "id": "leave", "payload": { "data": { "userLeave": { "cid": "smurf", "nick": "Smurf" } } } }),
        json!({ "type": "complete", "id": "join" }),
        json!({ "type": "complete", "id": "leave" }),
    ])
    .await;

    let (tx, mut rx) = mpsc::channel(8);
    let headers = viewer_headers();
    let relay = tokio::spawn(async move { relay_presence(&url, &headers, HANDSHAKE, tx).await });

    let first = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert!(matches!(first, PresenceEvent::Join(ref s) if s.user.cid == "smurf"));
    let second = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(second.name(), "leave");

    let result = timeout(Duration::from_secs(2), relay).await.unwrap().unwrap();
    assert!(result.is_ok());
    assert!(rx.recv().await.is_none());
    assert_eq!(backend.cookie.lock().unwrap().as_deref(), Some("gamma=abc"));
}

#[tokio::test]
async fn relay_reports_rejected_subscription() {
    let (url, _backend) = spawn_backend(vec![json!({
        "type": "error", "id": "join", "payload": [{ "message": "not allowed" }]
    })])
    .await;

    let (tx, _rx) = mpsc::channel(8);
    let result = timeout(Duration::from_secs(2), relay_presence(&url, &Headers::new(), HANDSHAKE, tx))
        .await
        .unwrap();
    assert!(matches!(result, Err(SubscriptionError::Rejected { ref id, .. }) if id == "join"));
}

#[tokio::test]
async fn relay_stops_when_receiver_is_dropped() {
    let (url, _backend) = spawn_backend(Vec::new()).await;

    let (tx, rx) = mpsc::channel(8);
    drop(rx);
    let result = timeout(Duration::from_secs(2), relay_presence(&url, &Headers::new(), HANDSHAKE, tx))
        .await
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn relay_fails_to_connect_to_closed_port() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, _rx) = mpsc::channel(1);
    let result = relay_presence(&format!("ws://{addr}/api/graphql"), &Headers::new(), HANDSHAKE, tx).await;
    assert!(matches!(result, Err(SubscriptionError::Connect(_))));
}

// =============================================================================
// backend that upgrades but never acknowledges
// =============================================================================

async fn silent_ws(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.protocols([PROTOCOL]).on_upgrade(|mut socket: WebSocket| async move {
        while let Some(Ok(_)) = socket.recv().await {}
    })
}

async fn spawn_silent_backend() -> String {
    let app = axum::Router::new().route("/api/graphql", get(silent_ws));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{addr}/api/graphql")
}

#[tokio::test]
async fn relay_gives_up_on_missing_ack() {
    let url = spawn_silent_backend().await;

    let (tx, _rx) = mpsc::channel(1);
    let result = timeout(
        Duration::from_secs(3),
        relay_presence(&url, &Headers::new(), Duration::from_millis(200), tx),
    )
    .await
    .unwrap();
    assert!(matches!(result, Err(SubscriptionError::Timeout(_))));
}

#[tokio::test]
async fn relay_abandons_handshake_when_receiver_is_dropped() {
    let url = spawn_silent_backend().await;

    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let result = timeout(
        Duration::from_secs(3),
        relay_presence(&url, &Headers::new(), Duration::from_secs(60), tx),
    )
    .await
    .unwrap();
    assert!(result.is_ok());
}
