//! Ranked statistics per calendar window.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Uri};
use axum::response::Html;
use leptos::prelude::*;
use serde::de::DeserializeOwned;

use super::Viewer;
use crate::calendar::{CalendarPeriod, DayRef, MonthRef, StudyPeriodRef, StudyYearRef, Timespan, WeekRef};
use crate::error::AppError;
use crate::graphql::queries::{
    self, StatsAllTimeData, StatsDayData, StatsMonthData, StatsStudyPeriodData, StatsStudyYearData, StatsWeekData,
};
use crate::graphql::{Request, fetch};
use crate::state::AppState;
use crate::views::layout;
use crate::views::stats_nav::{PeriodNav, PeriodSelect, StatsTabs};
use crate::views::stats_table::{self, StatsTable};

/// `GET /stats/{timespan}`. Query parameters pick the window; without them
/// the backend answers for the current one.
pub async fn stats_page(
    State(state): State<AppState>,
    Path(timespan): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let span = Timespan::from_slug(&timespan)
        .ok_or_else(|| AppError::NotFound { path: uri.path().to_string() })?;
    let viewer = Viewer::new(&uri, &headers);
    let path = span.path();

    let (selector, stats, me_cid) = match span {
        Timespan::Day => {
            let data: StatsDayData = load(&state, &viewer, queries::stats_day(DayRef::from_query(&params))).await?;
            let w = data.stats_day;
            (Some(PeriodSelect::new(&path, w.curr, w.prev, w.next)), w.stats, data.me.cid)
        }
        Timespan::Week => {
            let data: StatsWeekData = load(&state, &viewer, queries::stats_week(WeekRef::from_query(&params))).await?;
            let w = data.stats_week;
            (Some(PeriodSelect::new(&path, w.curr, w.prev, w.next)), w.stats, data.me.cid)
        }
        Timespan::Month => {
            let data: StatsMonthData =
                load(&state, &viewer, queries::stats_month(MonthRef::from_query(&params))).await?;
            let w = data.stats_month;
            (Some(PeriodSelect::new(&path, w.curr, w.prev, w.next)), w.stats, data.me.cid)
        }
        Timespan::StudyPeriod => {
            let request = queries::stats_study_period(StudyPeriodRef::from_query(&params));
            let data: StatsStudyPeriodData = load(&state, &viewer, request).await?;
            let s = data.stats_study_period;
            (Some(PeriodSelect::new(&path, s.period, None, None)), s.stats, data.me.cid)
        }
        Timespan::StudyYear => {
            let request = queries::stats_study_year(StudyYearRef::from_query(&params));
            let data: StatsStudyYearData = load(&state, &viewer, request).await?;
            let s = data.stats_study_year;
            (Some(PeriodSelect::new(&path, s.period, None, None)), s.stats, data.me.cid)
        }
        Timespan::AllTime => {
            let data: StatsAllTimeData = load(&state, &viewer, queries::stats_all_time()).await?;
            (None, data.stats_alltime, data.me.cid)
        }
    };

    let rows = stats_table::rows(&stats, &me_cid);
    let selector = selector.map(|select| view! { <PeriodNav select=select/> });
    let body = view! {
        <section class="stats">
            <StatsTabs active=span/>
            {selector}
            <StatsTable rows=rows/>
        </section>
    };
    Ok(Html(layout::page(&path, body)))
}

async fn load<T: DeserializeOwned>(state: &AppState, viewer: &Viewer, request: Request) -> Result<T, AppError> {
    fetch(state.graphql.as_ref(), request, &viewer.headers)
        .await
        .map_err(|e| AppError::from_fetch(e, &state.config.login_path, &viewer.from))
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
