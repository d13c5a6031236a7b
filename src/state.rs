//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. Page
//! handlers reach the presence API through the `GraphqlExecutor` seam; the
//! `/api` proxy uses its own raw HTTP client so bodies and statuses pass
//! through untouched.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::graphql::{GraphqlExecutor, HttpClient};

/// Shared application state. Clone is required by Axum; all fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub graphql: Arc<dyn GraphqlExecutor>,
    /// Client for forwarding `/api/*`. Redirects are never followed so the
    /// browser sees the backend's own `Location`.
    pub proxy: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, graphql: Arc<dyn GraphqlExecutor>, proxy: reqwest::Client) -> Self {
        Self { config: Arc::new(config), graphql, proxy }
    }

    /// Production state: GraphQL over HTTP to `BACKEND_ADDRESS`.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self, String> {
        let graphql = HttpClient::new(config.graphql_url(), config.timeouts)
            .map_err(|e| format!("graphql client: {e}"))?;
        let proxy = proxy_client(&config).map_err(|e| format!("proxy client: {e}"))?;
        Ok(Self::new(config, Arc::new(graphql), proxy))
    }
}

fn proxy_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
        .build()
}

// =============================================================================
// TEST HELPERS
// =============================================================================
