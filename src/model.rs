//! Records consumed from the presence API.
//!
//! DESIGN
//! ======
//! Every type here is a value snapshot of server state, valid only for the
//! render it arrives in. Nothing is mutated locally except the device scratch
//! list, which lives in `views::device_list`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// SESSIONS
// =============================================================================

/// A user who is present right now.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub user: ActiveUser,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub cid: String,
    pub nick: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Affiliation tags, used only for display grouping.
    #[serde(default)]
    pub groups: Vec<String>,
}

/// A finished presence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl UserSession {
    /// Length of the session in whole seconds. Inverted intervals count as zero.
    #[must_use]
    pub fn duration_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds().max(0)
    }
}

// =============================================================================
// USERS
// =============================================================================

/// Aggregated history of one user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub cid: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub total_time_seconds: i64,
    /// Minutes present per hour of day, index 0 = 00:00-00:59.
    #[serde(default)]
    pub hour_stats: Vec<u32>,
    /// Most recent first.
    #[serde(default)]
    pub recent_sessions: Vec<UserSession>,
    #[serde(default)]
    pub longest_session: Option<UserSession>,
}

/// The authenticated viewer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub cid: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub devices: Vec<Device>,
}

// =============================================================================
// STATS
// =============================================================================

/// A user's rank and accumulated time within one statistics window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    pub current_position: u32,
    /// Rank in the preceding window, absent when the user was not ranked.
    #[serde(default)]
    pub prev_position: Option<u32>,
    pub duration_seconds: i64,
    pub user: UserRef,
}

/// Minimal user reference carried by stats rows and leave notifications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserRef {
    pub cid: String,
    pub nick: String,
}

// =============================================================================
// DEVICES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default)]
    pub id: String,
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// One entry of the `setDevices` mutation input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceInput {
    pub address: String,
    pub name: String,
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
