//! Ranked totals for one statistics window.

use std::cmp::Ordering;

use leptos::prelude::*;

use crate::format::format_hms;
use crate::model::Stat;
use crate::util::format_nick;

/// Movement in rank compared to the preceding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    New,
    Up(u32),
    Down(u32),
    Same,
}

impl Change {
    #[must_use]
    pub fn between(current: u32, previous: Option<u32>) -> Self {
        let Some(previous) = previous else {
            return Self::New;
        };
        match current.cmp(&previous) {
            Ordering::Less => Self::Up(previous - current),
            Ordering::Greater => Self::Down(current - previous),
            Ordering::Equal => Self::Same,
        }
    }

    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::New => "New".to_string(),
            Self::Up(n) => format!("▲ {n}"),
            Self::Down(n) => format!("▼ {n}"),
            Self::Same => "-".to_string(),
        }
    }

    fn class(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Up(_) => "up",
            Self::Down(_) => "down",
            Self::Same => "same",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub position: u32,
    pub change: Change,
    pub cid: String,
    pub nick: String,
    pub duration: String,
    pub is_me: bool,
}

/// Rows in server order. `me_cid` marks the viewer's own row.
#[must_use]
pub fn rows(stats: &[Stat], me_cid: &str) -> Vec<StatsRow> {
    stats
        .iter()
        .map(|stat| StatsRow {
            position: stat.current_position,
            change: Change::between(stat.current_position, stat.prev_position),
            cid: stat.user.cid.clone(),
            nick: format_nick(&stat.user.cid, &stat.user.nick),
            duration: format_hms(stat.duration_seconds),
            is_me: stat.user.cid == me_cid,
        })
        .collect()
}

/// Ranking table; the viewer's own row carries the `me` class.
#[component]
pub fn StatsTable(rows: Vec<StatsRow>) -> impl IntoView {
    let rows = rows
        .into_iter()
        .map(|row| {
            let href = format!("/user/{}", row.cid);
            view! {
                <tr class="data-table-row" class:me=row.is_me>
                    <td class=format!("change {}", row.change.class())>{row.change.label()}</td>
                    <td>{row.position}</td>
                    <td><a href=href>{row.nick}</a></td>
                    <td>{row.duration}</td>
                </tr>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <table class="data-table stats-table">
            <thead>
                <tr class="header-row">
                    <th>"Change"</th>
                    <th>"#"</th>
                    <th>"Name"</th>
                    <th>"Total time"</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
    }
}

#[cfg(test)]
#[path = "stats_table_test.rs"]
mod tests;
