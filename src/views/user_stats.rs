//! Per-user statistics: summary cards and the hour-of-day histogram.
//!
//! DESIGN
//! ======
//! Card text depends on the current instant and the display zone, so both
//! are parameters. Handlers pass `Utc::now()` and `chrono::Local`.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use leptos::prelude::*;

use crate::format::{
    date_diff_to_ago_string, date_diff_to_string, format_date, is_same_day, pretty_from_seconds, time_between,
};
use crate::model::{UserSession, UserStats};

pub const NEVER_SEEN: &str = "Never been seen in the Hubb! :o";
pub const NEVER_IN: &str = "Never been in the Hubb! :o";
pub const NOT_TODAY: &str = "Not seen today";

/// Points on the histogram: hours 0 through 24, where 24 repeats hour 0 to close the day.
pub const HOUR_POINTS: usize = 25;

// =============================================================================
// CARDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: &'static str,
    pub lines: Vec<String>,
}

/// `N ago` / date / `For about N` for the most recent session.
#[must_use]
pub fn last_session_lines<Tz>(recent: &[UserSession], now: DateTime<Utc>, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(last) = recent.first() else {
        return vec![NEVER_SEEN.to_string()];
    };
    vec![
        date_diff_to_ago_string(time_between(&last.end_time, &now)),
        format_date(&last.end_time.with_timezone(tz)),
        format!("For about {}", date_diff_to_string(time_between(&last.start_time, &last.end_time))),
    ]
}

/// Time since the most recent session ended, when that was today in `tz`.
#[must_use]
pub fn today_text<Tz: TimeZone>(recent: &[UserSession], now: DateTime<Utc>, tz: &Tz) -> String {
    let Some(last) = recent.first() else {
        return NEVER_IN.to_string();
    };
    if !is_same_day(&last.end_time.with_timezone(tz), &now.with_timezone(tz)) {
        return NOT_TODAY.to_string();
    }
    format!("For about {}", date_diff_to_string(time_between(&last.end_time, &now)))
}

#[must_use]
pub fn cards<Tz>(stats: &UserStats, now: DateTime<Utc>, tz: &Tz) -> Vec<Card>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let longest = stats
        .longest_session
        .as_ref()
        .map_or(0, UserSession::duration_seconds);
    vec![
        Card { title: "Last session", lines: last_session_lines(&stats.recent_sessions, now, tz) },
        Card { title: "Today", lines: vec![today_text(&stats.recent_sessions, now, tz)] },
        Card { title: "Total time", lines: vec![pretty_from_seconds(stats.total_time_seconds)] },
        Card { title: "Longest session", lines: vec![pretty_from_seconds(longest)] },
    ]
}

// =============================================================================
// HISTOGRAM
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourPoint {
    pub hour: u32,
    /// Minutes converted to hours, one decimal.
    pub hours: f64,
    /// Share of the day's total, 0.0 when the total is zero.
    pub share: f64,
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Histogram points from per-hour minute totals. Missing hours count as zero.
#[must_use]
pub fn hour_points(hour_stats: &[u32]) -> Vec<HourPoint> {
    let hours: Vec<f64> = (0..HOUR_POINTS)
        .map(|hour| round_tenth(f64::from(hour_stats.get(hour % 24).copied().unwrap_or(0)) / 60.0))
        .collect();
    let total: f64 = hours.iter().sum();
    hours
        .into_iter()
        .zip(0_u32..)
        .map(|(hours, hour)| HourPoint { hour, hours, share: if total > 0.0 { hours / total } else { 0.0 } })
        .collect()
}

/// Upper bound of the y axis: 20% headroom over the peak, rounded up to a multiple of 5.
#[must_use]
pub fn y_axis_max(points: &[HourPoint]) -> f64 {
    let max = points.iter().map(|p| p.hours).fold(0.0_f64, f64::max);
    (max * 1.2 / 5.0).ceil() * 5.0
}

// =============================================================================
// RENDER
// =============================================================================

#[component]
fn InfoCard(card: Card) -> impl IntoView {
    let lines = card
        .lines
        .into_iter()
        .map(|line| view! { <p>{line}</p> })
        .collect::<Vec<_>>();
    view! {
        <div class="info">
            <h2>{card.title}</h2>
            <div class="info-text">{lines}</div>
        </div>
    }
}

/// Hour-of-day histogram as a table with proportional bars.
#[component]
fn HourStats(points: Vec<HourPoint>) -> impl IntoView {
    let max = y_axis_max(&points);
    let rows = points
        .into_iter()
        .map(|p| {
            let height = if max > 0.0 { p.hours / max * 100.0 } else { 0.0 };
            view! {
                <tr>
                    <td>{p.hour}</td>
                    <td>{format!("{:.1}", p.hours)}</td>
                    <td>{format!("{:.1}%", p.share * 100.0)}</td>
                    <td><div class="bar" style=format!("width:{height:.1}%")></div></td>
                </tr>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <div class="hour-stats" data-y-max=max.to_string()>
            <h2>"Hour stats"</h2>
            <table class="data-table">
                <thead>
                    <tr class="header-row"><th>"Hour"</th><th>"Hours"</th><th>"Share"</th><th></th></tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
    }
}

/// Name, summary cards, and histogram for one user.
#[component]
pub fn UserStatsPanel(nick: String, cards: Vec<Card>, points: Vec<HourPoint>) -> impl IntoView {
    let cards = cards.into_iter().map(|card| view! { <InfoCard card=card/> }).collect::<Vec<_>>();
    view! {
        <section class="user-stats">
            <h1>{nick}</h1>
            <div class="cards">{cards}</div>
            <HourStats points=points/>
        </section>
    }
}

/// The statistics panel for `stats`, with card texts relative to `now` in `tz`.
#[must_use]
pub fn panel<Tz>(stats: &UserStats, now: DateTime<Utc>, tz: &Tz) -> impl IntoView + use<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let nick = stats.nick.clone();
    let cards = cards(stats, now, tz);
    let points = hour_points(&stats.hour_stats);
    view! { <UserStatsPanel nick=nick cards=cards points=points/> }
}

#[cfg(test)]
#[path = "user_stats_test.rs"]
mod tests;
