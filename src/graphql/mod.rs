//! GraphQL client for the presence API.
//!
//! DESIGN
//! ======
//! Page handlers talk to the backend through the `GraphqlExecutor` trait so
//! tests can swap in canned responses. `HttpClient` is the production
//! implementation: it posts to `{BACKEND_ADDRESS}/api/graphql` and forwards
//! the viewer's request headers (cookies) so the backend sees the same
//! session the browser has.

pub mod queries;
pub mod subscription;
pub mod types;

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Timeouts;
pub use types::{GraphqlError, Request};

/// Header dictionary forwarded to the backend.
pub type Headers = HashMap<String, String>;

/// Headers that describe the hop to this server, not the viewer.
const HOP_HEADERS: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "content-type",
    "accept-encoding",
    "transfer-encoding",
    "upgrade",
    "keep-alive",
];

// =============================================================================
// EXECUTOR
// =============================================================================

/// Executes one GraphQL operation and returns its `data` object.
#[async_trait::async_trait]
pub trait GraphqlExecutor: Send + Sync {
    async fn execute(&self, request: Request, headers: &Headers) -> Result<Value, GraphqlError>;
}

/// Execute and decode `data` into `T`.
///
/// # Errors
///
/// Propagates executor errors; returns [`GraphqlError::Decode`] when `data`
/// does not match `T`.
pub async fn fetch<T: DeserializeOwned>(
    executor: &dyn GraphqlExecutor,
    request: Request,
    headers: &Headers,
) -> Result<T, GraphqlError> {
    let data = executor.execute(request, headers).await?;
    serde_json::from_value(data).map_err(|e| GraphqlError::Decode(e.to_string()))
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// Server-side transport: JSON over HTTP POST.
pub struct HttpClient {
    http: reqwest::Client,
    url: String,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns [`GraphqlError::Request`] if the HTTP client cannot be built.
    pub fn new(url: String, timeouts: Timeouts) -> Result<Self, GraphqlError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| GraphqlError::Request(e.to_string()))?;
        Ok(Self { http, url })
    }
}

#[async_trait::async_trait]
impl GraphqlExecutor for HttpClient {
    async fn execute(&self, request: Request, headers: &Headers) -> Result<Value, GraphqlError> {
        let mut builder = self.http.post(&self.url).json(&request);
        for (name, value) in forwardable(headers) {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GraphqlError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GraphqlError::Request(e.to_string()))?;

        // GraphQL servers may report errors with a 4xx status and a valid body.
        match serde_json::from_str::<types::Response>(&text) {
            Ok(parsed) if !parsed.errors.is_empty() || (200..300).contains(&status) => parsed.into_data(),
            Ok(_) => Err(GraphqlError::Status { status, body: text }),
            Err(_) if !(200..300).contains(&status) => Err(GraphqlError::Status { status, body: text }),
            Err(e) => Err(GraphqlError::Decode(e.to_string())),
        }
    }
}

/// Drop hop-specific headers from a forwarded header dictionary.
pub fn forwardable(headers: &Headers) -> impl Iterator<Item = (&str, &str)> {
    headers
        .iter()
        .filter(|(name, _)| !HOP_HEADERS.contains(&name.to_ascii_lowercase().as_str()))
        .map(|(name, value)| (name.as_str(), value.as_str()))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
