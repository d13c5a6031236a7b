//! Duration and timestamp formatting for display.

use chrono::{DateTime, TimeZone};

const MS_PER_SECOND: i64 = 1000;
const SECONDS_PER_MINUTE: i64 = 60;
const MINUTES_PER_HOUR: i64 = 60;
const HOURS_PER_DAY: i64 = 24;
const MS_PER_MINUTE: i64 = MS_PER_SECOND * SECONDS_PER_MINUTE;
const MS_PER_HOUR: i64 = MS_PER_MINUTE * MINUTES_PER_HOUR;

/// Round a non-negative quotient half up.
fn round_div(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 { format!("{count} {unit}") } else { format!("{count} {unit}s") }
}

// =============================================================================
// DURATIONS
// =============================================================================

/// `HH:MM:SS` with unbounded, zero-padded hours. Negative input renders as zero.
#[must_use]
pub fn format_hms(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let seconds = total % SECONDS_PER_MINUTE;
    let minutes = (total / SECONDS_PER_MINUTE) % MINUTES_PER_HOUR;
    let hours = total / (SECONDS_PER_MINUTE * MINUTES_PER_HOUR);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Long form such as `2 days, 3 hours, 1 minute`. Zero units are skipped and
/// anything under a minute renders as `0 minutes`.
#[must_use]
pub fn pretty_from_seconds(total_seconds: i64) -> String {
    let total_minutes = total_seconds.max(0) / SECONDS_PER_MINUTE;
    let minutes = total_minutes % MINUTES_PER_HOUR;
    let total_hours = total_minutes / MINUTES_PER_HOUR;
    let hours = total_hours % HOURS_PER_DAY;
    let days = total_hours / HOURS_PER_DAY;

    let parts: Vec<String> = [(days, "day"), (hours, "hour"), (minutes, "minute")]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, unit)| plural(count, unit))
        .collect();
    if parts.is_empty() { plural(0, "minute") } else { parts.join(", ") }
}

// =============================================================================
// DATE DIFFS
// =============================================================================

/// Elapsed time between two instants, each field an independently rounded total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateDiff {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Absolute distance between `a` and `b`. Seconds, minutes and hours each round
/// the previous total half up; days are whole days of the rounded hours.
#[must_use]
pub fn time_between<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> DateDiff {
    let ms = (a.timestamp_millis() - b.timestamp_millis()).abs();
    let seconds = round_div(ms, MS_PER_SECOND);
    let minutes = round_div(seconds, SECONDS_PER_MINUTE);
    let hours = round_div(minutes, MINUTES_PER_HOUR);
    let days = hours / HOURS_PER_DAY;
    DateDiff { days, hours, minutes, seconds }
}

/// Largest non-zero unit, e.g. `3 hours` or `1 minute`.
#[must_use]
pub fn date_diff_to_string(diff: DateDiff) -> String {
    if diff.days > 0 {
        plural(diff.days, "day")
    } else if diff.hours > 0 {
        plural(diff.hours, "hour")
    } else if diff.minutes > 0 {
        plural(diff.minutes, "minute")
    } else {
        plural(diff.seconds, "second")
    }
}

/// `Just now` under a minute, otherwise `<largest unit> ago`.
#[must_use]
pub fn date_diff_to_ago_string(diff: DateDiff) -> String {
    if diff.days == 0 && diff.hours == 0 && diff.minutes == 0 {
        return "Just now".to_string();
    }
    format!("{} ago", date_diff_to_string(diff))
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Whether both instants fall on the same calendar day in `date`'s zone.
#[must_use]
pub fn is_same_day<Tz: TimeZone>(date: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
    date.date_naive() == now.date_naive()
}

/// Short date such as `7 Mar 14:05`.
#[must_use]
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%-d %b %H:%M").to_string()
}

/// `Since HH:MM`, the arrival column of the active users table.
#[must_use]
pub fn format_since<Tz: TimeZone>(start: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Since {}", start.format("%H:%M"))
}

/// `(N hours)` once the rounded hour count reaches one, `(N minutes)` before that.
#[must_use]
pub fn hours_diff_string<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> String {
    let ms = (a.timestamp_millis() - b.timestamp_millis()).abs();
    let hours = round_div(ms, MS_PER_HOUR);
    if hours >= 1 {
        return format!("({hours} hours)");
    }
    format!("({} minutes)", round_div(ms, MS_PER_MINUTE))
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
