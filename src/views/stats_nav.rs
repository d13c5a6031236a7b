//! Granularity tabs and the prev/current/next period selector.

use leptos::prelude::*;

use crate::calendar::{CalendarPeriod, Timespan};

/// Tab list for every granularity, `active` highlighted.
#[component]
pub fn StatsTabs(active: Timespan) -> impl IntoView {
    let items = Timespan::ALL
        .into_iter()
        .map(|span| {
            let is_selected = span == active;
            view! {
                <li class:selected=is_selected>
                    <a href=span.path()>{span.label()}</a>
                </li>
            }
        })
        .collect::<Vec<_>>();

    view! { <ul class="stats-tabs">{items}</ul> }
}

/// Labels and links for the period selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSelect {
    pub current: String,
    pub prev_href: String,
    pub next_href: String,
}

impl PeriodSelect {
    /// Links for `curr` on `path`. Adjacent periods reported by the backend
    /// win over locally computed ones.
    #[must_use]
    pub fn new<P: CalendarPeriod>(path: &str, curr: P, prev: Option<P>, next: Option<P>) -> Self {
        Self {
            current: curr.label(),
            prev_href: prev.unwrap_or_else(|| curr.prev()).link(path),
            next_href: next.unwrap_or_else(|| curr.next()).link(path),
        }
    }
}

#[component]
pub fn PeriodNav(select: PeriodSelect) -> impl IntoView {
    view! {
        <div class="period-select">
            <a href=select.prev_href>"Prev"</a>
            <div class="current">{select.current}</div>
            <a href=select.next_href>"Next"</a>
        </div>
    }
}

#[cfg(test)]
#[path = "stats_nav_test.rs"]
mod tests;
