//! Present users grouped by affiliation tag.
//!
//! A user appears under every tag they hold, once per tag even when the tag
//! is listed twice. Larger groups come first; ties and members sort by name.

use std::collections::BTreeMap;

use leptos::prelude::*;

use crate::model::ActiveSession;
use crate::util::locale_compare;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub members: Vec<String>,
}

#[must_use]
pub fn group(sessions: &[ActiveSession]) -> Vec<Group> {
    let mut by_tag: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for session in sessions {
        let mut seen: Vec<&str> = Vec::with_capacity(session.user.groups.len());
        for tag in &session.user.groups {
            if seen.contains(&tag.as_str()) {
                continue;
            }
            seen.push(tag.as_str());
            by_tag
                .entry(tag.as_str())
                .or_default()
                .push(session.user.nick.as_str());
        }
    }

    let mut groups: Vec<Group> = by_tag
        .into_iter()
        .map(|(name, mut members)| {
            members.sort_by(|a, b| locale_compare(a, b));
            Group { name: name.to_string(), members: members.into_iter().map(str::to_string).collect() }
        })
        .collect();
    groups.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| locale_compare(&a.name, &b.name))
    });
    groups
}

/// One table per group, headed by the tag.
#[component]
pub fn ActiveGroups(groups: Vec<Group>) -> impl IntoView {
    let tables = groups
        .into_iter()
        .map(|group| {
            let members = group
                .members
                .into_iter()
                .map(|nick| view! { <tr><td class="user">{nick}</td></tr> })
                .collect::<Vec<_>>();
            let id = group.name.clone();
            view! {
                <div class="group">
                    <table class="data-table">
                        <tbody>
                            <tr class="header-row" id=id><th>{group.name}</th></tr>
                            {members}
                        </tbody>
                    </table>
                </div>
            }
        })
        .collect::<Vec<_>>();

    view! { <div class="active-groups">{tables}</div> }
}

#[cfg(test)]
#[path = "active_groups_test.rs"]
mod tests;
