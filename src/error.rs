//! Page-level errors and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use leptos::prelude::*;

use crate::graphql::GraphqlError;
use crate::graphql::subscription::SubscriptionError;
use crate::util::{FetchErrorKind, auth_redirect, classify_error};
use crate::views::device_list::FormError;
use crate::views::layout::{self, ErrorNotice};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The backend rejected an anonymous viewer. Carries the login URL that
    /// returns the viewer to the page they asked for.
    #[error("login required")]
    LoginRequired { location: String },

    /// Page data could not be fetched while rendering `path`.
    #[error("backend request failed: {source}")]
    Backend {
        path: String,
        #[source]
        source: GraphqlError,
    },

    #[error("presence feed unavailable: {0}")]
    Subscription(#[from] SubscriptionError),

    #[error("page not found: {path}")]
    NotFound { path: String },

    #[error("malformed form: {0}")]
    Form(#[from] FormError),
}

impl AppError {
    /// Classify a failed fetch made while rendering `from` (path and query).
    #[must_use]
    pub fn from_fetch(error: GraphqlError, login_path: &str, from: &str) -> Self {
        match classify_error(&error) {
            FetchErrorKind::NotLoggedIn => Self::LoginRequired { location: auth_redirect(login_path, from) },
            FetchErrorKind::Other => {
                let path = from.split_once('?').map_or(from, |(path, _)| path);
                Self::Backend { path: path.to_string(), source: error }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::LoginRequired { location } => Redirect::temporary(&location).into_response(),
            Self::Backend { path, source } => {
                tracing::error!(error = %source, %path, "page data fetch failed");
                let body = layout::page(&path, view! { <ErrorNotice message=layout::FETCH_FAILED/> });
                (StatusCode::BAD_GATEWAY, Html(body)).into_response()
            }
            Self::Subscription(e) => {
                tracing::error!(error = %e, "presence feed failed");
                (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
            }
            Self::NotFound { path } => {
                let body = layout::page(&path, view! { <ErrorNotice message=layout::NOT_FOUND/> });
                (StatusCode::NOT_FOUND, Html(body)).into_response()
            }
            Self::Form(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
