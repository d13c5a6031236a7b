//! GraphQL wire types and errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extension code the backend attaches to errors raised for anonymous viewers.
pub const NOT_LOGGED_IN_CODE: &str = "NOT_LOGGED_IN";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by GraphQL operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphqlError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("graphql request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("graphql endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a GraphQL response or did not match the expected shape.
    #[error("graphql response decode failed: {0}")]
    Decode(String),

    /// The response carried one or more GraphQL errors.
    #[error("graphql errors: {}", join_messages(.0))]
    Errors(Vec<ErrorEntry>),

    /// The response had neither data nor errors.
    #[error("graphql response carried no data")]
    MissingData,
}

fn join_messages(entries: &[ErrorEntry]) -> String {
    entries
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// A query or mutation document plus its variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub query: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn new(query: &'static str) -> Self {
        Self { query, operation_name: None, variables: None }
    }

    #[must_use]
    pub fn named(mut self, operation_name: &'static str) -> Self {
        self.operation_name = Some(operation_name);
        self
    }

    /// Attach variables. `Value::Null` and empty objects are dropped so the
    /// backend applies its own defaults.
    #[must_use]
    pub fn with_variables(mut self, variables: Value) -> Self {
        let empty = match &variables {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        self.variables = if empty { None } else { Some(variables) };
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

impl Response {
    /// Collapse into data, treating any error entry as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlError::Errors`] when the response carries errors and
    /// [`GraphqlError::MissingData`] when `data` is absent or null.
    pub fn into_data(self) -> Result<Value, GraphqlError> {
        if !self.errors.is_empty() {
            return Err(GraphqlError::Errors(self.errors));
        }
        match self.data {
            Some(Value::Null) | None => Err(GraphqlError::MissingData),
            Some(data) => Ok(data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl ErrorEntry {
    /// The `extensions.code` string, if present.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
