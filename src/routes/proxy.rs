//! Reverse proxy for `/api/*`.
//!
//! DESIGN
//! ======
//! Browsers talk to the backend through this server, so auth cookies set by
//! the backend stay first-party. Plain requests are replayed with `reqwest`
//! and streamed back unchanged. Websocket upgrades open an upstream socket
//! first (so a dead backend yields `502` instead of a dangling upgrade), then
//! relay frames in both directions until either side closes.
//!
//! ```text
//! browser ──HTTP──▶ forward_http ──reqwest──▶ PROXY/api/...
//! browser ══WS═══▶ relay ═══tokio-tungstenite═══▶ PROXY/api/...
//! ```

use axum::body::Body;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

use crate::graphql::subscription::{self, Socket, SubscriptionError};
use crate::state::AppState;
use crate::util::header_map_to_dict;

/// Headers scoped to a single connection, never forwarded in either direction.
const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
    header::PROXY_AUTHENTICATE,
];

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("upstream websocket failed: {0}")]
    Socket(#[from] SubscriptionError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "proxy failed");
        (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
    }
}

// =============================================================================
// ENTRY
// =============================================================================

/// `ANY /api/*`: forward to the configured proxy target.
pub async fn forward(State(state): State<AppState>, request: Request) -> Response {
    let result = if is_websocket_upgrade(request.headers()) {
        let (mut parts, _body) = request.into_parts();
        match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
            Ok(ws) => relay(&state, ws, &parts).await,
            Err(rejection) => return rejection.into_response(),
        }
    } else {
        forward_http(&state, request).await
    };
    result.unwrap_or_else(IntoResponse::into_response)
}

fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

/// Target URL for a request path, e.g. `/api/graphql?x=1` under `http://backend`.
#[must_use]
pub fn target_url(proxy_target: &str, path_and_query: &str) -> String {
    format!("{proxy_target}{path_and_query}")
}

fn path_and_query(parts: &Parts) -> &str {
    parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path(), |pq| pq.as_str())
}

/// Copy end-to-end headers. `host` is rewritten by the client for the target.
fn copy_headers(from: &HeaderMap, to: &mut HeaderMap, skip_host: bool) {
    for (name, value) in from {
        if HOP_BY_HOP.contains(name) || (skip_host && name == header::HOST) {
            continue;
        }
        to.append(name.clone(), value.clone());
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// Requests without a declared length or chunked encoding carry no body.
fn has_body(headers: &HeaderMap) -> bool {
    headers.contains_key(header::TRANSFER_ENCODING)
        || headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() != "0")
}

async fn forward_http(state: &AppState, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let url = target_url(&state.config.proxy_target, path_and_query(&parts));

    let mut headers = HeaderMap::new();
    copy_headers(&parts.headers, &mut headers, true);
    if let Some(host) = parts.headers.get(header::HOST) {
        headers.insert(HeaderName::from_static("x-forwarded-host"), host.clone());
    }

    let mut upstream = state.proxy.request(parts.method.clone(), &url).headers(headers);
    if has_body(&parts.headers) {
        upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }
    let upstream = upstream.send().await?;

    tracing::debug!(method = %parts.method, %url, status = %upstream.status(), "proxied");

    let mut response = Response::builder().status(upstream.status());
    if let Some(out) = response.headers_mut() {
        copy_headers(upstream.headers(), out, false);
    }
    let response = response
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response());
    Ok(response)
}

// =============================================================================
// WEBSOCKET
// =============================================================================

fn offered_protocols(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SEC_WEBSOCKET_PROTOCOL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

async fn relay(state: &AppState, ws: WebSocketUpgrade, parts: &Parts) -> Result<Response, ProxyError> {
    let url = subscription::ws_url(&target_url(&state.config.proxy_target, path_and_query(parts)))?;
    let protocols = offered_protocols(&parts.headers);
    let (upstream, selected) =
        subscription::open_socket(&url, &header_map_to_dict(&parts.headers), &protocols).await?;

    let ws = match selected {
        Some(protocol) => ws.protocols([protocol]),
        None => ws,
    };
    tracing::info!(%url, "websocket proxied");
    Ok(ws.on_upgrade(move |socket| pump(socket, upstream)))
}

async fn pump(client: WebSocket, upstream: Socket) {
    let (mut client_tx, mut client_rx) = client.split();
    let (mut upstream_tx, mut upstream_rx) = upstream.split();

    let to_upstream = async {
        while let Some(Ok(message)) = client_rx.next().await {
            let closing = matches!(message, Message::Close(_));
            if upstream_tx.send(to_upstream_message(message)).await.is_err() || closing {
                break;
            }
        }
    };
    let to_client = async {
        while let Some(Ok(message)) = upstream_rx.next().await {
            let Some(message) = to_client_message(message) else {
                continue;
            };
            let closing = matches!(message, Message::Close(_));
            if client_tx.send(message).await.is_err() || closing {
                break;
            }
        }
    };

    tokio::select! {
        () = to_upstream => {}
        () = to_client => {}
    }
    tracing::debug!("websocket relay closed");
}

fn to_upstream_message(message: Message) -> tungstenite::Message {
    match message {
        Message::Text(text) => tungstenite::Message::Text(text.as_str().into()),
        Message::Binary(bytes) => tungstenite::Message::Binary(bytes),
        Message::Ping(bytes) => tungstenite::Message::Ping(bytes),
        Message::Pong(bytes) => tungstenite::Message::Pong(bytes),
        Message::Close(frame) => tungstenite::Message::Close(frame.map(|f| tungstenite::protocol::CloseFrame {
            code: f.code.into(),
            reason: f.reason.as_str().into(),
        })),
    }
}

fn to_client_message(message: tungstenite::Message) -> Option<Message> {
    Some(match message {
        tungstenite::Message::Text(text) => Message::Text(Utf8Bytes::from(text.as_str())),
        tungstenite::Message::Binary(bytes) => Message::Binary(bytes),
        tungstenite::Message::Ping(bytes) => Message::Ping(bytes),
        tungstenite::Message::Pong(bytes) => Message::Pong(bytes),
        tungstenite::Message::Close(frame) => Message::Close(frame.map(|f| CloseFrame {
            code: f.code.into(),
            reason: Utf8Bytes::from(f.reason.as_str()),
        })),
        tungstenite::Message::Frame(_) => return None,
    })
}

#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;
