use super::*;
use crate::graphql::subscription::PROTOCOL;
use crate::model::UserRef;
use crate::state::test_helpers::{MockGraphql, test_app_state, test_app_state_with_config, test_config};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::json;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

#[test]
fn to_event_serializes_payloads() {
    let leave = PresenceEvent::Leave(UserRef { cid: "smurf".into(), nick: "Smurf".into() });
    assert!(to_event(&leave).is_ok());
}

async fn scripted(ws: WebSocketUpgrade, headers: HeaderMap) -> impl IntoResponse {
    assert_eq!(headers.get("cookie").and_then(|v| v.to_str().ok()), Some("gamma=abc"));
    ws.protocols([PROTOCOL]).on_upgrade(play)
}

async fn play(mut socket: WebSocket) {
    if !matches!(socket.recv().await, Some(Ok(Message::Text(_)))) {
        return;
    }
    if socket.send(Message::Text(json!({ "type": "connection_ack" }).to_string().into())).await.is_err() {
        return;
    }
    for _ in 0..2 {
        if !matches!(socket.recv().await, Some(Ok(Message::Text(_)))) {
            return;
        }
    }
    let script = [
        json!({ "type": "next", "id": "join", "payload": { "data": { "userJoin": {
            "user": { "cid": "smurf", "nick": "Smurf" }, "startTime": "2021-09-01T08:00:00Z"
        } } } }),
        json!({ "type": "next", "id": "leave", "payload": { "data": { "userLeave": { "cid": "smurf", "nick": "Smurf" } } } }),
        json!({ "type": "complete", "id": "join" }),
        json!({ "type": "complete", "id": "leave" }),
    ];
    for message in script {
        if socket.send(Message::Text(message.to_string().into())).await.is_err() {
            return;
        }
    }
    while let Some(Ok(_)) = socket.recv().await {}
}

#[tokio::test]
async fn presence_events_stream_join_and_leave_as_sse() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = axum::Router::new().route("/api/graphql", get(scripted));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut config = test_config();
    config.backend_address = format!("http://{addr}");
    let state = test_app_state_with_config(config, Arc::new(MockGraphql::default()));
    let mut headers = HeaderMap::new();
    headers.insert("cookie", HeaderValue::from_static("gamma=abc"));

    let response = presence_events(State(state), headers).await.unwrap().into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let body = timeout(Duration::from_secs(5), axum::body::to_bytes(response.into_body(), 64 * 1024))
        .await
        .unwrap()
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("event: join\n"));
    assert!(text.contains("event: leave\n"));
    assert!(text.find("event: join").unwrap() < text.find("event: leave").unwrap());
    assert!(text.contains("\"cid\":\"smurf\""));
}

#[tokio::test]
async fn presence_events_reject_non_http_backend() {
    let mut config = test_config();
    config.backend_address = "ftp://backend".into();
    let state = test_app_state_with_config(config, Arc::new(MockGraphql::default()));

    let err = presence_events(State(state), HeaderMap::new()).await.err().unwrap();
    assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn presence_events_end_when_backend_is_unreachable() {
    let state = test_app_state(Arc::new(MockGraphql::default()));
    let response = presence_events(State(state), HeaderMap::new()).await.unwrap().into_response();

    let body = timeout(Duration::from_secs(5), axum::body::to_bytes(response.into_body(), 1024))
        .await
        .unwrap()
        .unwrap();
    assert!(body.is_empty());
}
