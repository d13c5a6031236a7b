//! Live presence feed over the GraphQL websocket transport.
//!
//! DESIGN
//! ======
//! The backend publishes `userJoin` and `userLeave` subscriptions using the
//! `graphql-transport-ws` protocol. One upstream socket is opened per
//! `/events` viewer so the backend sees that viewer's cookies; the socket
//! lives exactly as long as the viewer's receiver does.
//!
//! ```text
//! client                         backend
//!   connection_init      ──▶
//!                        ◀──     connection_ack
//!   subscribe(join)      ──▶
//!   subscribe(leave)     ──▶
//!                        ◀──     next / error / complete / ping
//!   pong                 ──▶
//! ```

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};

use super::queries::{USER_JOIN, USER_LEAVE};
use super::types::{Request, Response};
use super::{GraphqlError, Headers, forwardable};
use crate::model::{ActiveSession, UserRef};

/// Subprotocol negotiated with the backend.
pub const PROTOCOL: &str = "graphql-transport-ws";

const JOIN_ID: &str = "join";
const LEAVE_ID: &str = "leave";

pub type Socket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("invalid subscription url: {0}")]
    Url(String),
    #[error("websocket connect failed: {0}")]
    Connect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket transport failed: {0}")]
    Transport(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed before acknowledgement")]
    Closed,
    #[error("no connection_ack within {0:?}")]
    Timeout(Duration),
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("subscription {id} failed: {message}")]
    Rejected { id: String, message: String },
}

/// A change to the set of present users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    Join(ActiveSession),
    Leave(UserRef),
}

impl PresenceEvent {
    /// SSE event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Leave(_) => "leave",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage<'a> {
    ConnectionInit { payload: Value },
    Subscribe { id: &'a str, payload: &'a Request },
    Pong,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    ConnectionAck,
    Next { id: String, payload: Response },
    // Older servers still speak the legacy subscriptions-transport-ws names.
    Data { id: String, payload: Response },
    Error { id: String, payload: Value },
    Complete { id: String },
    Ping,
    Pong,
    Ka,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// URL
// =============================================================================

/// Map the backend's HTTP GraphQL endpoint to its websocket counterpart.
///
/// # Errors
///
/// Returns [`SubscriptionError::Url`] for schemes other than http/https.
pub fn ws_url(graphql_url: &str) -> Result<String, SubscriptionError> {
    if let Some(rest) = graphql_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}"));
    }
    if let Some(rest) = graphql_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}"));
    }
    if graphql_url.starts_with("ws://") || graphql_url.starts_with("wss://") {
        return Ok(graphql_url.to_owned());
    }
    Err(SubscriptionError::Url(graphql_url.to_owned()))
}

// =============================================================================
// DECODING
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinData {
    user_join: ActiveSession,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaveData {
    user_leave: UserRef,
}

/// Turn the payload of a `next` message into a presence event.
///
/// # Errors
///
/// Returns GraphQL errors carried by the payload, or a decode error when the
/// data does not match the subscription's selection.
fn decode_event(id: &str, payload: Response) -> Result<Option<PresenceEvent>, GraphqlError> {
    let data = payload.into_data()?;
    let decode = |e: serde_json::Error| GraphqlError::Decode(e.to_string());
    match id {
        JOIN_ID => Ok(Some(PresenceEvent::Join(serde_json::from_value::<JoinData>(data).map_err(decode)?.user_join))),
        LEAVE_ID => Ok(Some(PresenceEvent::Leave(
            serde_json::from_value::<LeaveData>(data).map_err(decode)?.user_leave,
        ))),
        _ => Ok(None),
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn send(socket: &mut Socket, message: &ClientMessage<'_>) -> Result<(), SubscriptionError> {
    let text = serde_json::to_string(message).map_err(|e| SubscriptionError::Protocol(e.to_string()))?;
    socket
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| SubscriptionError::Transport(Box::new(e)))
}

async fn recv(socket: &mut Socket) -> Result<Option<ServerMessage>, SubscriptionError> {
    loop {
        let Some(message) = socket.next().await else {
            return Ok(None);
        };
        match message.map_err(|e| SubscriptionError::Transport(Box::new(e)))? {
            Message::Text(text) => {
                let parsed = serde_json::from_str(text.as_str())
                    .map_err(|e| SubscriptionError::Protocol(e.to_string()))?;
                return Ok(Some(parsed));
            }
            Message::Close(_) => return Ok(None),
            _ => {}
        }
    }
}

/// Open a websocket to `url` carrying the viewer's headers and offering
/// `protocols`. Websocket handshake headers from the viewer are not forwarded.
/// Returns the socket and the subprotocol the backend selected, if any.
///
/// # Errors
///
/// Returns [`SubscriptionError::Url`] for an unusable URL and
/// [`SubscriptionError::Connect`] when the handshake fails.
pub async fn open_socket(
    url: &str,
    headers: &Headers,
    protocols: &[String],
) -> Result<(Socket, Option<String>), SubscriptionError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| SubscriptionError::Url(e.to_string()))?;
    for (name, value) in forwardable(headers) {
        if name.to_ascii_lowercase().starts_with("sec-websocket") {
            continue;
        }
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            request.headers_mut().insert(name, value);
        }
    }
    if !protocols.is_empty() {
        let offered = HeaderValue::from_str(&protocols.join(", ")).map_err(|e| SubscriptionError::Url(e.to_string()))?;
        request.headers_mut().insert("sec-websocket-protocol", offered);
    }

    let (socket, response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| SubscriptionError::Connect(Box::new(e)))?;
    let selected = response
        .headers()
        .get("sec-websocket-protocol")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    Ok((socket, selected))
}

/// Open the subscription socket and complete the `connection_init` handshake.
async fn connect(url: &str, headers: &Headers) -> Result<Socket, SubscriptionError> {
    let (mut socket, _) = open_socket(url, headers, &[PROTOCOL.to_string()]).await?;

    send(&mut socket, &ClientMessage::ConnectionInit { payload: Value::Object(serde_json::Map::new()) }).await?;
    loop {
        match recv(&mut socket).await? {
            Some(ServerMessage::ConnectionAck) => return Ok(socket),
            Some(ServerMessage::Ping) => send(&mut socket, &ClientMessage::Pong).await?,
            Some(ServerMessage::Ka | ServerMessage::Pong | ServerMessage::Unknown) => {}
            Some(other) => return Err(SubscriptionError::Protocol(format!("expected connection_ack, got {other:?}"))),
            None => return Err(SubscriptionError::Closed),
        }
    }
}

/// Subscribe to joins and leaves and push each event into `tx` until the
/// backend closes the socket or the receiver is dropped.
///
/// The connect and `connection_ack` wait is bounded by `handshake` and
/// abandoned as soon as the receiver goes away. Payloads that fail to decode
/// are logged and skipped.
///
/// # Errors
///
/// Returns [`SubscriptionError`] when the socket cannot be opened, the
/// handshake times out, or the backend rejects a subscription.
pub async fn relay_presence(
    url: &str,
    headers: &Headers,
    handshake: Duration,
    tx: mpsc::Sender<PresenceEvent>,
) -> Result<(), SubscriptionError> {
    let mut socket = tokio::select! {
        () = tx.closed() => return Ok(()),
        connected = tokio::time::timeout(handshake, connect(url, headers)) => {
            connected.map_err(|_| SubscriptionError::Timeout(handshake))??
        }
    };

    let join = Request::new(USER_JOIN).named("UserJoin");
    let leave = Request::new(USER_LEAVE).named("UserLeave");
    send(&mut socket, &ClientMessage::Subscribe { id: JOIN_ID, payload: &join }).await?;
    send(&mut socket, &ClientMessage::Subscribe { id: LEAVE_ID, payload: &leave }).await?;

    let mut open = 2_u8;
    loop {
        let message = tokio::select! {
            () = tx.closed() => break,
            message = recv(&mut socket) => message?,
        };
        let Some(message) = message else {
            break;
        };

        match message {
            ServerMessage::Next { id, payload } | ServerMessage::Data { id, payload } => {
                match decode_event(&id, payload) {
                    Ok(Some(event)) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, %id, "dropping presence payload"),
                }
            }
            ServerMessage::Error { id, payload } => {
                return Err(SubscriptionError::Rejected { id, message: payload.to_string() });
            }
            ServerMessage::Complete { id } => {
                tracing::debug!(%id, "subscription completed");
                open = open.saturating_sub(1);
                if open == 0 {
                    break;
                }
            }
            ServerMessage::Ping => send(&mut socket, &ClientMessage::Pong).await?,
            ServerMessage::ConnectionAck | ServerMessage::Pong | ServerMessage::Ka | ServerMessage::Unknown => {}
        }
    }

    let _ = socket.close(None).await;
    Ok(())
}

#[cfg(test)]
#[path = "subscription_test.rs"]
mod tests;
