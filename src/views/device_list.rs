//! Device management: a scratch copy of the viewer's devices.
//!
//! DESIGN
//! ======
//! The server-side list is only replaced when the viewer saves. Until then
//! every edit lives in a `DeviceList`, which travels between requests as the
//! hidden and visible fields of the device form. Each POST rebuilds the list
//! from the form, applies one `FormAction`, and renders the result again.
//!
//! ```text
//! GET /me ──▶ DeviceList::from_devices ──▶ DeviceEditor
//! POST /me/devices ──▶ parse_form ──▶ apply_local ──▶ DeviceEditor
//!                                        └─ Save ──▶ setDevices ──▶ from_devices
//! ```

use leptos::prelude::*;

use crate::model::{Device, DeviceInput};

/// Fits an EUI-64 address with separators.
pub const MAX_ADDRESS_LEN: usize = 23;
pub const MAX_DESCRIPTION_LEN: usize = 40;

pub const DELETE_CONFIRM: &str = "Do you really want to delete this device?";

fn truncate(raw: &str, max: usize) -> String {
    raw.chars().take(max).collect()
}

// =============================================================================
// ENTRIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditableDevice {
    pub address: String,
    pub description: String,
    pub saved_address: String,
    pub saved_description: String,
    pub is_new: bool,
    pub is_active: bool,
}

impl EditableDevice {
    #[must_use]
    pub fn from_device(device: &Device) -> Self {
        Self {
            address: device.address.clone(),
            description: device.name.clone(),
            saved_address: device.address.clone(),
            saved_description: device.name.clone(),
            is_new: false,
            is_active: device.is_active,
        }
    }

    /// A blank entry appended by "Add device".
    #[must_use]
    pub fn blank() -> Self {
        Self { is_new: true, ..Self::default() }
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.is_new || self.address != self.saved_address || self.description != self.saved_description
    }

    pub fn set_address(&mut self, raw: &str) {
        self.address = truncate(raw, MAX_ADDRESS_LEN);
    }

    pub fn set_description(&mut self, raw: &str) {
        self.description = truncate(raw, MAX_DESCRIPTION_LEN);
    }
}

// =============================================================================
// LIST
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceList {
    /// Length of the list as last saved; a different length means unsaved removals or additions.
    initial_len: usize,
    entries: Vec<EditableDevice>,
}

impl DeviceList {
    #[must_use]
    pub fn from_devices(devices: &[Device]) -> Self {
        Self { initial_len: devices.len(), entries: devices.iter().map(EditableDevice::from_device).collect() }
    }

    #[must_use]
    pub fn entries(&self) -> &[EditableDevice] {
        &self.entries
    }

    #[must_use]
    pub fn initial_len(&self) -> usize {
        self.initial_len
    }

    pub fn add(&mut self) {
        self.entries.push(EditableDevice::blank());
    }

    /// Replace the visible fields of entry `index`. Returns `false` when out of range.
    pub fn edit(&mut self, index: usize, address: &str, description: &str) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        entry.set_address(address);
        entry.set_description(description);
        true
    }

    /// Returns `false` when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    /// Saving is offered once anything differs from the last saved list.
    #[must_use]
    pub fn save_enabled(&self) -> bool {
        self.entries.len() != self.initial_len || self.entries.iter().any(EditableDevice::has_unsaved_changes)
    }

    /// The complete list as mutation input. The backend replaces all devices with it.
    #[must_use]
    pub fn to_inputs(&self) -> Vec<DeviceInput> {
        self.entries
            .iter()
            .map(|e| DeviceInput { address: e.address.clone(), name: e.description.clone() })
            .collect()
    }
}

// =============================================================================
// FORM
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    /// Keep the edits and render again.
    Update,
    Add,
    Remove(usize),
    Save,
}

impl FormAction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "update" => Some(Self::Update),
            "add" => Some(Self::Add),
            "save" => Some(Self::Save),
            _ => raw
                .strip_prefix("remove:")
                .and_then(|i| i.parse().ok())
                .map(Self::Remove),
        }
    }

    fn value(self) -> String {
        match self {
            Self::Update => "update".into(),
            Self::Add => "add".into(),
            Self::Remove(i) => format!("remove:{i}"),
            Self::Save => "save".into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing form field {0}")]
    Missing(&'static str),
    #[error("invalid form field {0}")]
    Invalid(&'static str),
    #[error("device fields have mismatched lengths")]
    Ragged,
}

/// A submitted device form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceForm {
    pub nick: String,
    pub list: DeviceList,
    pub action: FormAction,
}

fn flag(raw: &str) -> Result<bool, FormError> {
    match raw {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        _ => Err(FormError::Invalid("flag")),
    }
}

fn field_values<'a>(pairs: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .collect()
}

/// Rebuild the scratch list from url-encoded pairs. Per-device fields repeat
/// once per entry, in list order.
///
/// # Errors
///
/// Returns [`FormError`] when a required field is missing, a value does not
/// parse, or the per-device fields disagree in count.
pub fn parse_form(pairs: &[(String, String)]) -> Result<DeviceForm, FormError> {
    let single = |name: &'static str| {
        field_values(pairs, name)
            .first()
            .map(|v| (*v).to_string())
            .ok_or(FormError::Missing(name))
    };

    let action = FormAction::parse(&single("action")?).ok_or(FormError::Invalid("action"))?;
    let initial_len = single("initial_len")?
        .parse::<usize>()
        .map_err(|_| FormError::Invalid("initial_len"))?;
    let nick = single("nick").unwrap_or_default();

    let address = field_values(pairs, "address");
    let description = field_values(pairs, "description");
    let saved_address = field_values(pairs, "saved_address");
    let saved_description = field_values(pairs, "saved_description");
    let is_new = field_values(pairs, "is_new");
    let is_active = field_values(pairs, "is_active");
    let len = address.len();
    if [description.len(), saved_address.len(), saved_description.len(), is_new.len(), is_active.len()]
        .iter()
        .any(|l| *l != len)
    {
        return Err(FormError::Ragged);
    }

    let mut list = DeviceList { initial_len, entries: Vec::with_capacity(len) };
    for i in 0..len {
        list.entries.push(EditableDevice {
            saved_address: saved_address[i].to_string(),
            saved_description: saved_description[i].to_string(),
            is_new: flag(is_new[i])?,
            is_active: flag(is_active[i])?,
            ..EditableDevice::default()
        });
        list.edit(i, address[i], description[i]);
    }

    Ok(DeviceForm { nick, list, action })
}

impl DeviceForm {
    /// Apply a non-save action to the scratch list.
    pub fn apply_local(&mut self) {
        match self.action {
            FormAction::Add => self.list.add(),
            FormAction::Remove(index) => {
                self.list.remove(index);
            }
            FormAction::Update | FormAction::Save => {}
        }
    }
}

// =============================================================================
// RENDER
// =============================================================================

fn bool_value(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

#[component]
fn DeviceRow(index: usize, entry: EditableDevice) -> impl IntoView {
    let changed = if entry.has_unsaved_changes() { "*" } else { " " };
    let indicator = if entry.is_active { "indicator active" } else { "indicator inactive" };
    let remove = FormAction::Remove(index).value();
    let confirm = format!("return confirm('{DELETE_CONFIRM}')");
    view! {
        <tr>
            <td class="status"><div class=indicator></div></td>
            <td>
                <input name="address" maxlength=MAX_ADDRESS_LEN.to_string() value=entry.address.clone()/>
            </td>
            <td>
                <input name="description" maxlength=MAX_DESCRIPTION_LEN.to_string() value=entry.description.clone()/>
            </td>
            <td class="changed">{changed}</td>
            <td>
                <input type="hidden" name="saved_address" value=entry.saved_address/>
                <input type="hidden" name="saved_description" value=entry.saved_description/>
                <input type="hidden" name="is_new" value=bool_value(entry.is_new)/>
                <input type="hidden" name="is_active" value=bool_value(entry.is_active)/>
                <button name="action" value=remove onclick=confirm>"Delete"</button>
            </td>
        </tr>
    }
}

/// The device form. `notice` is shown above the table when present.
#[component]
pub fn DeviceEditor(nick: String, list: DeviceList, notice: Option<&'static str>) -> impl IntoView {
    let save_disabled = !list.save_enabled();
    let initial_len = list.initial_len().to_string();
    let rows = list
        .entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| view! { <DeviceRow index=index entry=entry/> })
        .collect::<Vec<_>>();
    let notice = notice.map(|text| view! { <p class="notice">{text}</p> });

    view! {
        <section class="devices">
            <h1>{nick.clone()}</h1>
            {notice}
            <form method="post" action="/me/devices">
                <input type="hidden" name="nick" value=nick/>
                <input type="hidden" name="initial_len" value=initial_len/>
                <button name="action" value="update">"Apply"</button>
                <table class="data-table">
                    <thead>
                        <tr class="header-row">
                            <th>"Active"</th>
                            <th>"MAC-Address"</th>
                            <th>"Device Description"</th>
                            <th>"Changed"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>{rows}</tbody>
                </table>
                <div class="help">
                    "Don't know how to find your "
                    <a href="https://en.wikipedia.org/wiki/MAC_address">"MAC Address"</a>
                    "? Take a look at "
                    <a href="https://www.wikihow.com/Find-the-MAC-Address-of-Your-Computer">"this guide"</a>
                    "!"
                </div>
                <button name="action" value="add">"Add device"</button>
                <button name="action" value="save" disabled=save_disabled>"Save"</button>
            </form>
        </section>
    }
}

#[cfg(test)]
#[path = "device_list_test.rs"]
mod tests;
