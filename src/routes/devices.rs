//! Device management for the signed-in viewer.
//!
//! DESIGN
//! ======
//! The scratch list is not kept on the server. Every render embeds the
//! current edits, their saved counterparts and flags as form fields, and each
//! button posts the whole form back with an `action`. Only `save` talks to the
//! backend; the other actions rebuild the list, apply the change and render it
//! again.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Form;
use leptos::prelude::*;

use crate::error::AppError;
use crate::graphql::fetch;
use crate::graphql::queries::{self, MeData, SetDevicesData};
use crate::state::AppState;
use crate::util::header_map_to_dict;
use crate::views::device_list::{self, DeviceEditor, DeviceList, FormAction};
use crate::views::layout;

/// Page the form lives on; also where login sends the viewer back to.
pub const ME_PATH: &str = "/me";

pub const SAVED_NOTICE: &str = "Devices saved";

/// `GET /me`: the viewer's registered devices.
pub async fn me_page(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>, AppError> {
    let data: MeData = fetch(state.graphql.as_ref(), queries::me_devices(), &header_map_to_dict(&headers))
        .await
        .map_err(|e| AppError::from_fetch(e, &state.config.login_path, ME_PATH))?;

    let list = DeviceList::from_devices(&data.me.devices);
    Ok(page(data.me.nick, list, None))
}

/// `POST /me/devices`: apply one form action.
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let mut form = device_list::parse_form(&pairs)?;

    if form.action != FormAction::Save {
        form.apply_local();
        return Ok(page(form.nick, form.list, None));
    }

    let inputs = form.list.to_inputs();
    tracing::info!(count = inputs.len(), "saving devices");
    let data: SetDevicesData = fetch(state.graphql.as_ref(), queries::set_devices(&inputs), &header_map_to_dict(&headers))
        .await
        .map_err(|e| AppError::from_fetch(e, &state.config.login_path, ME_PATH))?;

    let list = DeviceList::from_devices(&data.set_devices);
    Ok(page(form.nick, list, Some(SAVED_NOTICE)))
}

fn page(nick: String, list: DeviceList, notice: Option<&'static str>) -> Html<String> {
    Html(layout::page(ME_PATH, view! { <DeviceEditor nick=nick list=list notice=notice/> }))
}

#[cfg(test)]
#[path = "devices_test.rs"]
mod tests;
