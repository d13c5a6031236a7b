//! Documents sent to the presence API and the shapes of their `data`.

use serde::Deserialize;
use serde_json::json;

use super::Request;
use crate::calendar::{DayRef, MonthRef, StudyPeriodRef, StudyYearRef, WeekRef};
use crate::model::{ActiveSession, Device, DeviceInput, Me, Stat, UserStats};

macro_rules! stats_table_stat_fragment {
    () => {
        "fragment StatsTableStat on Stat { currentPosition prevPosition durationSeconds user { cid nick } }"
    };
}

macro_rules! device_fragment {
    () => {
        "fragment Device on Device { id address name isActive }"
    };
}

macro_rules! session_fields {
    () => {
        "user { cid nick avatarUrl groups } startTime"
    };
}

// =============================================================================
// DOCUMENTS
// =============================================================================

pub const CURRENT_SESSIONS: &str = concat!("query CurrentSessions { currentSessions { ", session_fields!(), " } }");

pub const STATS_DAY: &str = concat!(
    "query StatsDay($input: StatsDayInput) { statsDay(input: $input) { ",
    "stats { ...StatsTableStat } curr { year month day } next { year month day } prev { year month day } } ",
    "me { cid } } ",
    stats_table_stat_fragment!()
);

pub const STATS_WEEK: &str = concat!(
    "query StatsWeek($input: StatsWeekInput) { statsWeek(input: $input) { ",
    "stats { ...StatsTableStat } curr { year week } next { year week } prev { year week } } ",
    "me { cid } } ",
    stats_table_stat_fragment!()
);

pub const STATS_MONTH: &str = concat!(
    "query StatsMonth($input: StatsMonthInput) { statsMonth(input: $input) { ",
    "stats { ...StatsTableStat } curr { year month } next { year month } prev { year month } } ",
    "me { cid } } ",
    stats_table_stat_fragment!()
);

pub const STATS_STUDY_PERIOD: &str = concat!(
    "query StatsStudyPeriod($input: StatsStudyPeriodInput) { statsStudyPeriod(input: $input) { ",
    "stats { ...StatsTableStat } year period } ",
    "me { cid } } ",
    stats_table_stat_fragment!()
);

pub const STATS_STUDY_YEAR: &str = concat!(
    "query StatsStudyYear($input: StatsStudyYearInput) { statsStudyYear(input: $input) { ",
    "stats { ...StatsTableStat } year } ",
    "me { cid } } ",
    stats_table_stat_fragment!()
);

pub const STATS_ALL_TIME: &str = concat!(
    "query StatsAlltime { statsAlltime { ...StatsTableStat } me { cid } } ",
    stats_table_stat_fragment!()
);

pub const USER_STATS: &str = "query UserStats($input: UserUniqueInput!) { user(input: $input) { \
     cid nick totalTimeSeconds hourStats \
     recentSessions { startTime endTime } longestSession { startTime endTime } } }";

pub const ME_CID: &str = "query MeCid { me { cid } }";

pub const ME_DEVICES: &str = concat!("query Me { me { cid nick devices { ...Device } } } ", device_fragment!());

pub const SET_DEVICES: &str = concat!(
    "mutation SetDevices($input: SetDevicesInput!) { setDevices(data: $input) { ...Device } } ",
    device_fragment!()
);

pub const USER_JOIN: &str = concat!("subscription UserJoin { userJoin { ", session_fields!(), " } }");

pub const USER_LEAVE: &str = "subscription UserLeave { userLeave { cid nick } }";

// =============================================================================
// REQUEST BUILDERS
// =============================================================================

#[must_use]
pub fn current_sessions() -> Request {
    Request::new(CURRENT_SESSIONS).named("CurrentSessions")
}

/// Wrap a period's query pairs as `{ input: {...} }`, or no variables when the
/// page was opened without a period.
fn windowed<P: serde::Serialize>(document: &'static str, name: &'static str, period: Option<P>) -> Request {
    let variables = period.map_or(serde_json::Value::Null, |p| json!({ "input": p }));
    Request::new(document)
        .named(name)
        .with_variables(variables)
}

#[must_use]
pub fn stats_day(period: Option<DayRef>) -> Request {
    windowed(STATS_DAY, "StatsDay", period)
}

#[must_use]
pub fn stats_week(period: Option<WeekRef>) -> Request {
    windowed(STATS_WEEK, "StatsWeek", period)
}

#[must_use]
pub fn stats_month(period: Option<MonthRef>) -> Request {
    windowed(STATS_MONTH, "StatsMonth", period)
}

#[must_use]
pub fn stats_study_period(period: Option<StudyPeriodRef>) -> Request {
    windowed(STATS_STUDY_PERIOD, "StatsStudyPeriod", period)
}

#[must_use]
pub fn stats_study_year(period: Option<StudyYearRef>) -> Request {
    windowed(STATS_STUDY_YEAR, "StatsStudyYear", period)
}

#[must_use]
pub fn stats_all_time() -> Request {
    Request::new(STATS_ALL_TIME).named("StatsAlltime")
}

#[must_use]
pub fn user_stats(cid: &str) -> Request {
    Request::new(USER_STATS)
        .named("UserStats")
        .with_variables(json!({ "input": { "cid": cid } }))
}

#[must_use]
pub fn me_cid() -> Request {
    Request::new(ME_CID).named("MeCid")
}

#[must_use]
pub fn me_devices() -> Request {
    Request::new(ME_DEVICES).named("Me")
}

#[must_use]
pub fn set_devices(devices: &[DeviceInput]) -> Request {
    Request::new(SET_DEVICES)
        .named("SetDevices")
        .with_variables(json!({ "input": { "devices": devices } }))
}

// =============================================================================
// RESPONSE SHAPES
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSessionsData {
    pub current_sessions: Vec<ActiveSession>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeCid {
    pub cid: String,
}

/// Ranked stats for one window plus the server's view of the adjacent windows.
#[derive(Debug, Clone, Deserialize)]
pub struct Windowed<P> {
    pub stats: Vec<Stat>,
    pub curr: P,
    pub next: Option<P>,
    pub prev: Option<P>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDayData {
    pub stats_day: Windowed<DayRef>,
    pub me: MeCid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsWeekData {
    pub stats_week: Windowed<WeekRef>,
    pub me: MeCid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsMonthData {
    pub stats_month: Windowed<MonthRef>,
    pub me: MeCid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudyPeriodStats {
    pub stats: Vec<Stat>,
    #[serde(flatten)]
    pub period: StudyPeriodRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsStudyPeriodData {
    pub stats_study_period: StudyPeriodStats,
    pub me: MeCid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudyYearStats {
    pub stats: Vec<Stat>,
    #[serde(flatten)]
    pub period: StudyYearRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsStudyYearData {
    pub stats_study_year: StudyYearStats,
    pub me: MeCid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsAllTimeData {
    pub stats_alltime: Vec<Stat>,
    pub me: MeCid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserStatsData {
    pub user: UserStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeCidData {
    pub me: MeCid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeData {
    pub me: Me,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDevicesData {
    pub set_devices: Vec<Device>,
}

#[cfg(test)]
#[path = "queries_test.rs"]
mod tests;
