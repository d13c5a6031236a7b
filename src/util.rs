//! Small helpers shared by page handlers and views.

use std::cmp::Ordering;
use std::sync::LazyLock;

use axum::http::HeaderMap;
use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};

use crate::graphql::types::{GraphqlError, NOT_LOGGED_IN_CODE};
use crate::graphql::Headers;

// =============================================================================
// HEADERS
// =============================================================================

/// Fold a flat `[name, value, name, value, ...]` list into a dictionary.
/// A trailing name without a value is dropped; repeated names keep the last value.
pub fn raw_headers_to_dict<S: AsRef<str>>(raw: &[S]) -> Headers {
    raw.chunks_exact(2)
        .map(|pair| (pair[0].as_ref().to_string(), pair[1].as_ref().to_string()))
        .collect()
}

/// Flatten an incoming header map into raw pairs and fold it into a dictionary.
/// Values that are not visible ASCII are skipped.
#[must_use]
pub fn header_map_to_dict(headers: &HeaderMap) -> Headers {
    let raw: Vec<&str> = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| [name.as_str(), v]))
        .flatten()
        .collect();
    raw_headers_to_dict(&raw)
}

// =============================================================================
// ERROR CLASSIFICATION
// =============================================================================

/// The two outcomes a failed data fetch can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The backend rejected an anonymous viewer; send them through login.
    NotLoggedIn,
    Other,
}

/// Classify a fetch failure. Any GraphQL error entry with
/// `extensions.code == "NOT_LOGGED_IN"` marks the viewer as unauthenticated.
#[must_use]
pub fn classify_error(error: &GraphqlError) -> FetchErrorKind {
    match error {
        GraphqlError::Errors(entries) if entries.iter().any(|e| e.code() == Some(NOT_LOGGED_IN_CODE)) => {
            FetchErrorKind::NotLoggedIn
        }
        _ => FetchErrorKind::Other,
    }
}

/// Login URL that returns the viewer to `from` afterwards.
#[must_use]
pub fn auth_redirect(login_path: &str, from: &str) -> String {
    let Ok(base) = reqwest::Url::parse("http://localhost") else {
        return format!("{login_path}?from={from}");
    };
    let Ok(mut url) = base.join(login_path) else {
        return format!("{login_path}?from={from}");
    };
    url.query_pairs_mut().append_pair("from", from);

    if url.host_str() == Some("localhost") && !login_path.contains("://") {
        let query = url.query().unwrap_or_default();
        return format!("{}?{query}", url.path());
    }
    url.to_string()
}

// =============================================================================
// NAMES
// =============================================================================

/// Display name for a user, decorated for a handful of regulars.
#[must_use]
pub fn format_nick(cid: &str, nick: &str) -> String {
    match cid {
        "mvidar" => format!("✌ {nick} ✌"),
        "rasros" => format!("🌹 {nick} 🌹"),
        "dahida" => format!("💤 {nick} 💤"),
        "hulthe" => format!("🎩{nick}🪄"),
        "jenhallb" => format!("❤ {nick} ❤"),
        "erijohns" => format!("🍔{nick}🦙"),
        "caeric" => "Loppan :dab:".to_string(),
        "lahtig" => format!("🥛(☕)🥛 {nick}"),
        _ => nick.to_string(),
    }
}

/// Root-locale collator. `None` only if the compiled collation data is unusable.
static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> =
    LazyLock::new(|| Collator::try_new(Default::default(), CollatorOptions::default()).ok());

/// Locale-aware ordering of display names: accents and case are secondary to
/// the base letters. Names that collate equal fall back to code-point order.
#[must_use]
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    COLLATOR
        .as_ref()
        .map_or(Ordering::Equal, |collator| collator.compare(a, b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "util_test.rs"]
mod tests;
