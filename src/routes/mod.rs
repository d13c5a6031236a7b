//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages are rendered on the server from GraphQL data and returned as whole
//! HTML documents. `/events` streams presence changes so the home page can
//! refresh itself, and everything under `/api` is forwarded to the backend
//! so the browser only ever talks to this origin.

pub mod devices;
pub mod events;
pub mod pages;
pub mod proxy;
pub mod stats;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::Redirect;
use axum::routing::{any, get, post};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::calendar::Timespan;
use crate::error::AppError;
use crate::graphql::Headers;
use crate::state::AppState;
use crate::util::header_map_to_dict;

/// All routes, with compression and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/stats", get(redirect_stats))
        .route("/stats/{timespan}", get(stats::stats_page))
        .route("/user/{cid}", get(pages::user_page))
        .route("/me", get(devices::me_page))
        .route("/me/devices", post(devices::submit))
        .route("/events", get(events::presence_events))
        .route("/api/{*path}", any(proxy::forward))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn redirect_stats() -> Redirect {
    Redirect::temporary(&Timespan::StudyYear.path())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound { path: uri.path().to_string() }
}

/// What a page handler needs from the incoming request: the headers to
/// forward and the URL to come back to after login.
pub(crate) struct Viewer {
    pub headers: Headers,
    pub from: String,
}

impl Viewer {
    pub(crate) fn new(uri: &Uri, headers: &HeaderMap) -> Self {
        let from = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
        Self { headers: header_map_to_dict(headers), from }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
