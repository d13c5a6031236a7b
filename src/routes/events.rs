//! Server-Sent Events feed of presence changes.
//!
//! DESIGN
//! ======
//! Each `/events` viewer gets its own upstream subscription, opened with the
//! viewer's cookies and relayed through a bounded channel. Dropping the SSE
//! response drops the receiver, which ends the relay task and closes the
//! upstream socket. When the upstream ends, the stream ends and the browser's
//! `EventSource` reconnects on its own.

use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::graphql::subscription::{self, PresenceEvent};
use crate::state::AppState;
use crate::util::header_map_to_dict;

const CHANNEL_CAPACITY: usize = 32;

/// SSE frame for one presence change. The data is the joined session or the
/// departed user as JSON.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized.
pub fn to_event(event: &PresenceEvent) -> Result<Event, axum::Error> {
    let frame = Event::default().event(event.name());
    match event {
        PresenceEvent::Join(session) => frame.json_data(session),
        PresenceEvent::Leave(user) => frame.json_data(user),
    }
}

/// `GET /events`
pub async fn presence_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let url = subscription::ws_url(&state.config.graphql_url())?;
    let forwarded = header_map_to_dict(&headers);
    let handshake = Duration::from_secs(state.config.timeouts.request_secs);
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        match subscription::relay_presence(&url, &forwarded, handshake, tx).await {
            Ok(()) => tracing::debug!("presence relay finished"),
            Err(e) => tracing::warn!(error = %e, "presence relay failed"),
        }
    });

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((to_event(&event), rx))
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
