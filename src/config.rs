//! Process configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOGIN_PATH: &str = "/api/auth/gamma/login";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required env var {0}")]
    Missing(&'static str),

    /// A variable is present but cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL used for server-side GraphQL requests (`{backend}/api/graphql`).
    pub backend_address: String,
    /// Target that `/api/*` is forwarded to.
    pub proxy_target: String,
    pub port: u16,
    /// External login flow; unauthenticated page views are sent here.
    pub login_path: String,
    pub timeouts: Timeouts,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `BACKEND_ADDRESS`
    ///
    /// Optional:
    /// - `PROXY`: defaults to `BACKEND_ADDRESS`
    /// - `PORT`: default 3000
    /// - `LOGIN_PATH`: default `/api/auth/gamma/login`
    /// - `REQUEST_TIMEOUT_SECS`: default 30
    /// - `CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if `BACKEND_ADDRESS` is missing or `PORT` is not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_address = lookup("BACKEND_ADDRESS")
            .map(|v| normalize_url(&v))
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("BACKEND_ADDRESS"))?;

        let proxy_target = lookup("PROXY")
            .map(|v| normalize_url(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| backend_address.clone());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let login_path = lookup("LOGIN_PATH").unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string());
        let timeouts = Timeouts {
            request_secs: parse_u64(lookup("REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { backend_address, proxy_target, port, login_path, timeouts })
    }

    /// Endpoint for server-side GraphQL requests.
    #[must_use]
    pub fn graphql_url(&self) -> String {
        format!("{}/api/graphql", self.backend_address)
    }
}

fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
