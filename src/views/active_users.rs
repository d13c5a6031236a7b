//! Who is present right now, ordered by arrival.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use leptos::prelude::*;
use crate::format::{format_since, hours_diff_string};
use crate::model::ActiveSession;
use crate::util::{format_nick, locale_compare};

/// One rendered row of the active users table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUserRow {
    pub cid: String,
    pub nick: String,
    /// `Since HH:MM` in the display zone.
    pub since: String,
    /// `(N hours)` or `(N minutes)`.
    pub elapsed: String,
}

/// Earliest arrival first; simultaneous arrivals by decorated nickname.
#[must_use]
pub fn sorted(sessions: &[ActiveSession]) -> Vec<&ActiveSession> {
    let mut sorted: Vec<&ActiveSession> = sessions.iter().collect();
    sorted.sort_by(|left, right| {
        left.start_time.cmp(&right.start_time).then_with(|| {
            locale_compare(
                &format_nick(&left.user.cid, &left.user.nick),
                &format_nick(&right.user.cid, &right.user.nick),
            )
        })
    });
    sorted
}

/// Build table rows, showing times in `tz` and elapsed time relative to `now`.
#[must_use]
pub fn rows<Tz>(sessions: &[ActiveSession], now: DateTime<Utc>, tz: &Tz) -> Vec<ActiveUserRow>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    sorted(sessions)
        .into_iter()
        .map(|session| ActiveUserRow {
            cid: session.user.cid.clone(),
            nick: format_nick(&session.user.cid, &session.user.nick),
            since: format_since(&session.start_time.with_timezone(tz)),
            elapsed: hours_diff_string(&session.start_time, &now),
        })
        .collect()
}

#[must_use]
pub fn headline(count: usize) -> String {
    format!("There are {count} smurfs in the Hubb right now!")
}

/// Headline and one linked row per present user.
#[component]
pub fn ActiveUsers(rows: Vec<ActiveUserRow>) -> impl IntoView {
    let headline = headline(rows.len());
    let rows = rows
        .into_iter()
        .map(|row| {
            let href = format!("/user/{}", row.cid);
            view! {
                <tr class="data-table-row" data-cid=row.cid>
                    <td class="user"><a href=href>{row.nick}</a></td>
                    <td class="time">{format!("{} ", row.since)}<time>{row.elapsed}</time></td>
                </tr>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <div class="active-users">
            <p class="headline">{headline}</p>
            <table class="data-table">
                <thead>
                    <tr class="header-row"><th>"User"</th><th>"Current Status"</th></tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
    }
}

#[cfg(test)]
#[path = "active_users_test.rs"]
mod tests;
