//! Home and user statistics pages.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{Local, Utc};
use leptos::prelude::*;

use super::Viewer;
use crate::error::AppError;
use crate::graphql::{GraphqlError, fetch};
use crate::graphql::queries::{self, CurrentSessionsData, MeCidData, UserStatsData};
use crate::state::AppState;
use crate::views::active_groups::{self, ActiveGroups};
use crate::views::active_users::{self, ActiveUsers};
use crate::views::layout::{self, Loading};
use crate::views::user_stats;

/// Path segment that stands for the viewer's own cid.
pub const ME: &str = "me";

/// Reload the page whenever someone arrives or leaves, showing the loading
/// placeholder until the fresh page arrives.
fn live_reload() -> String {
    format!(
        "(function(){{if(!window.EventSource)return;\
         var s=new EventSource('/events');\
         var r=function(){{s.close();document.querySelector('main').innerHTML='{}';window.location.reload();}};\
         s.addEventListener('join',r);s.addEventListener('leave',r);}})();",
        view! { <Loading/> }.to_html()
    )
}

/// `GET /`: everyone in the Hubb right now, then the same people by group.
pub async fn home(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Result<Html<String>, AppError> {
    let viewer = Viewer::new(&uri, &headers);
    let data: CurrentSessionsData = fetch(state.graphql.as_ref(), queries::current_sessions(), &viewer.headers)
        .await
        .map_err(|e| AppError::from_fetch(e, &state.config.login_path, &viewer.from))?;

    let sessions = &data.current_sessions;
    let rows = active_users::rows(sessions, Utc::now(), &Local);
    let groups = active_groups::group(sessions);
    let script = live_reload();
    let body = view! {
        <ActiveUsers rows=rows/>
        <ActiveGroups groups=groups/>
        <script inner_html=script></script>
    };
    Ok(Html(layout::page(uri.path(), body)))
}

/// `GET /user/{cid}`: one user's history. `me` resolves to the viewer first.
pub async fn user_page(
    State(state): State<AppState>,
    Path(cid): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let viewer = Viewer::new(&uri, &headers);
    let login = |e: GraphqlError| AppError::from_fetch(e, &state.config.login_path, &viewer.from);

    if cid == ME {
        let data: MeCidData = fetch(state.graphql.as_ref(), queries::me_cid(), &viewer.headers)
            .await
            .map_err(login)?;
        return Ok(Redirect::temporary(&format!("/user/{}", data.me.cid)).into_response());
    }

    let data: UserStatsData = fetch(state.graphql.as_ref(), queries::user_stats(&cid), &viewer.headers)
        .await
        .map_err(login)?;
    let body = user_stats::panel(&data.user, Utc::now(), &Local);
    Ok(Html(layout::page(uri.path(), body)).into_response())
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
