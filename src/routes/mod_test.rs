use super::*;
use crate::graphql::subscription::PROTOCOL;
use crate::state::test_helpers::{MockGraphql, test_app_state_with_config, test_config};
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::header::LOCATION;
use axum::http::Method;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

// =============================================================================
// scripted backend behind /api
// =============================================================================

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let reply = json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "host": header("host"),
        "forwardedHost": header("x-forwarded-host"),
        "cookie": header("cookie"),
        "body": String::from_utf8_lossy(&body),
    });
    (StatusCode::CREATED, [("set-cookie", "gamma=fresh; Path=/")], reply.to_string())
}

async fn moved() -> Redirect {
    Redirect::to("/elsewhere")
}

async fn ws_echo(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.protocols([PROTOCOL]).on_upgrade(|mut socket: WebSocket| async move {
        while let Some(Ok(message)) = socket.recv().await {
            if let Message::Text(text) = message {
                if socket.send(Message::Text(format!("echo:{}", text.as_str()).into())).await.is_err() {
                    break;
                }
            }
        }
    })
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// The app, proxying to a scripted backend. Returns the app's address.
async fn spawn_app() -> SocketAddr {
    let backend = serve(
        Router::new()
            .route("/api/echo", any(echo))
            .route("/api/moved", get(moved))
            .route("/api/ws", get(ws_echo)),
    )
    .await;

    let mut config = test_config();
    config.proxy_target = format!("http://{backend}");
    let state = test_app_state_with_config(config, Arc::new(MockGraphql::default()));
    serve(app(state)).await
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

// =============================================================================
// router
// =============================================================================

#[tokio::test]
async fn healthz_is_ok() {
    let addr = spawn_app().await;
    let response = client().get(format!("http://{addr}/healthz")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stats_root_redirects_to_study_year() {
    let addr = spawn_app().await;
    let response = client().get(format!("http://{addr}/stats")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/stats/study-year");
}

#[tokio::test]
async fn unknown_stats_span_is_not_found() {
    let addr = spawn_app().await;
    let response = client().get(format!("http://{addr}/stats/decade")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_renders_not_found_page() {
    let addr = spawn_app().await;
    let response = client().get(format!("http://{addr}/nowhere")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("Page not found"));
}

#[test]
fn viewer_keeps_query_in_return_path() {
    let uri: Uri = "/stats/day?year=2021&month=9&day=6".parse().unwrap();
    let mut headers = HeaderMap::new();
    headers.insert("cookie", "gamma=abc".parse().unwrap());
    let viewer = Viewer::new(&uri, &headers);
    assert_eq!(viewer.from, "/stats/day?year=2021&month=9&day=6");
    assert_eq!(viewer.headers.get("cookie").map(String::as_str), Some("gamma=abc"));
}

// =============================================================================
// /api proxy
// =============================================================================

#[tokio::test]
async fn proxy_forwards_request_and_returns_backend_response() {
    let addr = spawn_app().await;
    let response = client()
        .post(format!("http://{addr}/api/echo?x=1"))
        .header("cookie", "gamma=abc")
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["set-cookie"], "gamma=fresh; Path=/");
    let seen: Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(seen["method"], "POST");
    assert_eq!(seen["uri"], "/api/echo?x=1");
    assert_eq!(seen["cookie"], "gamma=abc");
    assert_eq!(seen["body"], "payload");
    assert_eq!(seen["forwardedHost"], addr.to_string());
    assert_ne!(seen["host"], addr.to_string());
}

#[tokio::test]
async fn proxy_forwards_bodyless_get() {
    let addr = spawn_app().await;
    let response = client().get(format!("http://{addr}/api/echo")).send().await.unwrap();
    let seen: Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(seen["method"], "GET");
    assert_eq!(seen["body"], "");
}

#[tokio::test]
async fn proxy_passes_redirects_through_unfollowed() {
    let addr = spawn_app().await;
    let response = client().get(format!("http://{addr}/api/moved")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/elsewhere");
}

#[tokio::test]
async fn proxy_reports_bad_gateway_when_backend_is_down() {
    let state = test_app_state_with_config(test_config(), Arc::new(MockGraphql::default()));
    let addr = serve(app(state)).await;
    let response = client().get(format!("http://{addr}/api/anything")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn proxy_relays_websocket_frames_and_protocol() {
    let addr = spawn_app().await;
    let mut request = format!("ws://{addr}/api/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert("sec-websocket-protocol", PROTOCOL.parse().unwrap());

    let (mut socket, response) = tokio_tungstenite::connect_async(request).await.unwrap();
    assert_eq!(response.headers()["sec-websocket-protocol"], PROTOCOL);

    socket.send(tungstenite::Message::Text("hello".into())).await.unwrap();
    let reply = tokio::time::timeout(std::time::Duration::from_secs(2), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(reply, tungstenite::Message::Text("echo:hello".into()));
    socket.close(None).await.unwrap();
}
