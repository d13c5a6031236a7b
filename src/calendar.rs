//! Statistics windows and calendar navigation.
//!
//! DESIGN
//! ======
//! Each granularity has its own reference type (`DayRef`, `WeekRef`, ...)
//! implementing `CalendarPeriod`. Constructors only accept years in
//! `YEARS`, which sits well inside chrono's date range, so stepping is total
//! and reversible: `p.next().prev() == p` for every period they build.
//! Query strings that are missing a part or fail to parse yield `None`,
//! which tells the backend to pick the current period.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Datelike, Days, Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// =============================================================================
// TIMESPANS
// =============================================================================

/// The statistics tabs, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timespan {
    AllTime,
    StudyYear,
    StudyPeriod,
    Month,
    Week,
    Day,
}

impl Timespan {
    pub const ALL: [Self; 6] = [Self::AllTime, Self::StudyYear, Self::StudyPeriod, Self::Month, Self::Week, Self::Day];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::AllTime => "all-time",
            Self::StudyYear => "study-year",
            Self::StudyPeriod => "study-period",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AllTime => "All time",
            Self::StudyYear => "Study year",
            Self::StudyPeriod => "Study Period",
            Self::Month => "Month",
            Self::Week => "Week",
            Self::Day => "Day",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }

    /// Route of the tab, e.g. `/stats/study-year`.
    #[must_use]
    pub fn path(self) -> String {
        format!("/stats/{}", self.slug())
    }
}

// =============================================================================
// PERIOD TRAIT
// =============================================================================

/// A navigable calendar window.
pub trait CalendarPeriod: Sized + Copy + Eq {
    #[must_use]
    fn next(self) -> Self;
    #[must_use]
    fn prev(self) -> Self;
    /// Human-readable label shown between the prev/next links.
    fn label(&self) -> String;
    /// Query-string pairs identifying this period.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
    /// Parse from page query parameters.
    fn from_query(params: &HashMap<String, String>) -> Option<Self>;

    /// Link to this period on the page served at `path`.
    fn link(&self, path: &str) -> String {
        let query = self
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{path}?{query}")
    }
}

/// Years a period may start in.
pub const YEARS: RangeInclusive<i32> = -262_000..=262_000;

fn param_i32(params: &HashMap<String, String>, key: &str) -> Option<i32> {
    params.get(key).and_then(|v| v.trim().parse::<i32>().ok())
}

fn param_u32(params: &HashMap<String, String>, key: &str) -> Option<u32> {
    params.get(key).and_then(|v| v.trim().parse::<u32>().ok())
}

/// Last two digits of a year, zero padded (`2021` -> `21`, `2005` -> `05`).
#[must_use]
pub fn short_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

// =============================================================================
// DAY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "DayParts", into = "DayParts")]
pub struct DayRef(NaiveDate);

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct DayParts {
    year: i32,
    month: u32,
    day: u32,
}

impl TryFrom<DayParts> for DayRef {
    type Error = String;

    fn try_from(parts: DayParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.month, parts.day)
            .ok_or_else(|| format!("invalid date {}-{}-{}", parts.year, parts.month, parts.day))
    }
}

impl From<DayRef> for DayParts {
    fn from(day: DayRef) -> Self {
        Self { year: day.0.year(), month: day.0.month(), day: day.0.day() }
    }
}

impl DayRef {
    /// `month` and `day` are 1-based.
    #[must_use]
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if !YEARS.contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl CalendarPeriod for DayRef {
    fn next(self) -> Self {
        self.0.succ_opt().map_or(self, Self)
    }

    fn prev(self) -> Self {
        self.0.pred_opt().map_or(self, Self)
    }

    fn label(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("year", self.0.year().to_string()),
            ("month", self.0.month().to_string()),
            ("day", self.0.day().to_string()),
        ]
    }

    fn from_query(params: &HashMap<String, String>) -> Option<Self> {
        Self::new(param_i32(params, "year")?, param_u32(params, "month")?, param_u32(params, "day")?)
    }
}

// =============================================================================
// WEEK
// =============================================================================

/// An ISO 8601 week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "WeekParts", into = "WeekParts")]
pub struct WeekRef {
    year: i32,
    week: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct WeekParts {
    year: i32,
    week: u32,
}

impl TryFrom<WeekParts> for WeekRef {
    type Error = String;

    fn try_from(parts: WeekParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.week).ok_or_else(|| format!("invalid week {} of {}", parts.week, parts.year))
    }
}

impl From<WeekRef> for WeekParts {
    fn from(week: WeekRef) -> Self {
        Self { year: week.year, week: week.week }
    }
}

impl WeekRef {
    #[must_use]
    pub fn new(year: i32, week: u32) -> Option<Self> {
        if !YEARS.contains(&year) {
            return None;
        }
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|_| Self { year, week })
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn week(self) -> u32 {
        self.week
    }

    fn monday(self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }

    fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self { year: iso.year(), week: iso.week() }
    }
}

impl CalendarPeriod for WeekRef {
    fn next(self) -> Self {
        self.monday()
            .and_then(|d| d.checked_add_days(Days::new(7)))
            .map_or(self, Self::from_date)
    }

    fn prev(self) -> Self {
        self.monday()
            .and_then(|d| d.checked_sub_days(Days::new(7)))
            .map_or(self, Self::from_date)
    }

    fn label(&self) -> String {
        format!("W{} {}", self.week(), self.year())
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("year", self.year.to_string()), ("week", self.week.to_string())]
    }

    fn from_query(params: &HashMap<String, String>) -> Option<Self> {
        Self::new(param_i32(params, "year")?, param_u32(params, "week")?)
    }
}

// =============================================================================
// MONTH
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "MonthParts", into = "MonthParts")]
pub struct MonthRef {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct MonthParts {
    year: i32,
    month: u32,
}

impl TryFrom<MonthParts> for MonthRef {
    type Error = String;

    fn try_from(parts: MonthParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.month).ok_or_else(|| format!("invalid month {}", parts.month))
    }
}

impl From<MonthRef> for MonthParts {
    fn from(month: MonthRef) -> Self {
        Self { year: month.year, month: month.month }
    }
}

impl MonthRef {
    /// `month` is 1-based.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (YEARS.contains(&year) && (1..=12).contains(&month)).then_some(Self { year, month })
    }
}

impl CalendarPeriod for MonthRef {
    fn next(self) -> Self {
        if self.month == 12 {
            self.year
                .checked_add(1)
                .map_or(self, |year| Self { year, month: 1 })
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    fn prev(self) -> Self {
        if self.month == 1 {
            self.year
                .checked_sub(1)
                .map_or(self, |year| Self { year, month: 12 })
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    fn label(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("?", |m| m.name());
        format!("{name} {}", self.year)
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("year", self.year.to_string()), ("month", self.month.to_string())]
    }

    fn from_query(params: &HashMap<String, String>) -> Option<Self> {
        Self::new(param_i32(params, "year")?, param_u32(params, "month")?)
    }
}

// =============================================================================
// STUDY PERIOD
// =============================================================================

/// Study periods in calendar order. A study year runs Summer, LP1 .. LP4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudyPeriod {
    Summer,
    Lp1,
    Lp2,
    Lp3,
    Lp4,
}

impl StudyPeriod {
    pub const ALL: [Self; 5] = [Self::Summer, Self::Lp1, Self::Lp2, Self::Lp3, Self::Lp4];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summer => "SUMMER",
            Self::Lp1 => "LP1",
            Self::Lp2 => "LP2",
            Self::Lp3 => "LP3",
            Self::Lp4 => "LP4",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|p| p.as_str() == upper)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

impl fmt::Display for StudyPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "StudyPeriodParts", into = "StudyPeriodParts")]
pub struct StudyPeriodRef {
    year: i32,
    period: StudyPeriod,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct StudyPeriodParts {
    year: i32,
    period: StudyPeriod,
}

impl TryFrom<StudyPeriodParts> for StudyPeriodRef {
    type Error = String;

    fn try_from(parts: StudyPeriodParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.period).ok_or_else(|| format!("invalid study year {}", parts.year))
    }
}

impl From<StudyPeriodRef> for StudyPeriodParts {
    fn from(period: StudyPeriodRef) -> Self {
        Self { year: period.year, period: period.period }
    }
}

impl StudyPeriodRef {
    #[must_use]
    pub fn new(year: i32, period: StudyPeriod) -> Option<Self> {
        YEARS.contains(&year).then_some(Self { year, period })
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn period(self) -> StudyPeriod {
        self.period
    }
}

impl CalendarPeriod for StudyPeriodRef {
    fn next(self) -> Self {
        let len = StudyPeriod::ALL.len();
        let period = StudyPeriod::ALL[(self.period.index() + 1) % len];
        if period == StudyPeriod::Summer {
            self.year
                .checked_add(1)
                .map_or(self, |year| Self { year, period })
        } else {
            Self { year: self.year, period }
        }
    }

    fn prev(self) -> Self {
        let len = StudyPeriod::ALL.len();
        let period = StudyPeriod::ALL[(self.period.index() + len - 1) % len];
        if period == StudyPeriod::Lp4 {
            self.year
                .checked_sub(1)
                .map_or(self, |year| Self { year, period })
        } else {
            Self { year: self.year, period }
        }
    }

    fn label(&self) -> String {
        format!("{} {}/{}", self.period, short_year(self.year), short_year(self.year.saturating_add(1)))
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("year", self.year.to_string()), ("period", self.period.as_str().to_string())]
    }

    fn from_query(params: &HashMap<String, String>) -> Option<Self> {
        Self::new(param_i32(params, "year")?, StudyPeriod::parse(params.get("period")?)?)
    }
}

// =============================================================================
// STUDY YEAR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "StudyYearParts", into = "StudyYearParts")]
pub struct StudyYearRef {
    year: i32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct StudyYearParts {
    year: i32,
}

impl TryFrom<StudyYearParts> for StudyYearRef {
    type Error = String;

    fn try_from(parts: StudyYearParts) -> Result<Self, Self::Error> {
        Self::new(parts.year).ok_or_else(|| format!("invalid study year {}", parts.year))
    }
}

impl From<StudyYearRef> for StudyYearParts {
    fn from(year: StudyYearRef) -> Self {
        Self { year: year.year }
    }
}

impl StudyYearRef {
    #[must_use]
    pub fn new(year: i32) -> Option<Self> {
        YEARS.contains(&year).then_some(Self { year })
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }
}

impl CalendarPeriod for StudyYearRef {
    fn next(self) -> Self {
        self.year
            .checked_add(1)
            .map_or(self, |year| Self { year })
    }

    fn prev(self) -> Self {
        self.year
            .checked_sub(1)
            .map_or(self, |year| Self { year })
    }

    fn label(&self) -> String {
        format!("{}/{}", short_year(self.year), short_year(self.year.saturating_add(1)))
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("year", self.year.to_string())]
    }

    fn from_query(params: &HashMap<String, String>) -> Option<Self> {
        param_i32(params, "year").and_then(Self::new)
    }
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
