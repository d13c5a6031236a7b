use super::*;
use leptos::prelude::*;

fn device(address: &str, name: &str, is_active: bool) -> Device {
    Device { id: format!("id-{address}"), address: address.into(), name: name.into(), is_active }
}

fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

fn saved_list() -> DeviceList {
    DeviceList::from_devices(&[device("AA:BB:CC:DD:EE:FF", "Laptop", true), device("11:22:33:44:55:66", "Phone", false)])
}

// =============================================================================
// entries
// =============================================================================

#[test]
fn loaded_devices_have_no_unsaved_changes() {
    let list = saved_list();
    assert!(list.entries().iter().all(|e| !e.has_unsaved_changes()));
    assert!(!list.save_enabled());
    assert!(list.entries()[0].is_active);
}

#[test]
fn blank_entry_is_new_and_unsaved() {
    let blank = EditableDevice::blank();
    assert!(blank.is_new);
    assert!(blank.has_unsaved_changes());
}

#[test]
fn editing_back_to_saved_value_clears_change() {
    let mut list = saved_list();
    assert!(list.edit(1, "11:22:33:44:55:67", "Phone"));
    assert!(list.entries()[1].has_unsaved_changes());
    assert!(list.save_enabled());

    assert!(list.edit(1, "11:22:33:44:55:66", "Phone"));
    assert!(!list.entries()[1].has_unsaved_changes());
    assert!(!list.save_enabled());
}

#[test]
fn inputs_are_truncated() {
    let mut entry = EditableDevice::default();
    entry.set_address("AA:BB:CC:DD:EE:FF:00:11:22");
    entry.set_description(&"x".repeat(60));
    assert_eq!(entry.address.chars().count(), MAX_ADDRESS_LEN);
    assert_eq!(entry.description.chars().count(), MAX_DESCRIPTION_LEN);

    entry.set_description(&"å".repeat(41));
    assert_eq!(entry.description, "å".repeat(40));
}

// =============================================================================
// list operations
// =============================================================================

#[test]
fn add_then_remove_returns_to_saved_state() {
    let mut list = saved_list();
    list.add();
    assert_eq!(list.entries().len(), 3);
    assert!(list.save_enabled());

    assert!(list.remove(2));
    assert!(!list.save_enabled());
}

#[test]
fn removing_saved_entry_enables_save() {
    let mut list = saved_list();
    assert!(list.remove(0));
    assert!(list.save_enabled());
    assert_eq!(list.entries()[0].description, "Phone");
}

#[test]
fn out_of_range_operations_are_rejected() {
    let mut list = saved_list();
    assert!(!list.remove(5));
    assert!(!list.edit(5, "a", "b"));
    assert_eq!(list, saved_list());
}

#[test]
fn inputs_carry_address_and_description() {
    let mut list = saved_list();
    list.remove(1);
    assert_eq!(list.to_inputs(), vec![DeviceInput { address: "AA:BB:CC:DD:EE:FF".into(), name: "Laptop".into() }]);
}

// =============================================================================
// form
// =============================================================================

#[test]
fn form_action_parsing() {
    assert_eq!(FormAction::parse("add"), Some(FormAction::Add));
    assert_eq!(FormAction::parse("save"), Some(FormAction::Save));
    assert_eq!(FormAction::parse("update"), Some(FormAction::Update));
    assert_eq!(FormAction::parse("remove:3"), Some(FormAction::Remove(3)));
    assert_eq!(FormAction::parse("remove:x"), None);
    assert_eq!(FormAction::parse("drop"), None);
}

#[test]
fn parse_form_rebuilds_edited_list() {
    let form = parse_form(&pairs(&[
        ("nick", "Smurf"),
        ("initial_len", "1"),
        ("address", "AA:BB:CC:DD:EE:00"),
        ("description", "Laptop"),
        ("saved_address", "AA:BB:CC:DD:EE:FF"),
        ("saved_description", "Laptop"),
        ("is_new", "0"),
        ("is_active", "1"),
        ("action", "remove:0"),
    ]))
    .unwrap();

    assert_eq!(form.nick, "Smurf");
    assert_eq!(form.action, FormAction::Remove(0));
    assert_eq!(form.list.initial_len(), 1);
    let entry = &form.list.entries()[0];
    assert!(entry.has_unsaved_changes());
    assert!(entry.is_active);
}

#[test]
fn parse_form_accepts_empty_list() {
    let form = parse_form(&pairs(&[("initial_len", "2"), ("action", "save")])).unwrap();
    assert!(form.list.entries().is_empty());
    assert!(form.list.save_enabled());
}

#[test]
fn parse_form_rejects_bad_input() {
    assert_eq!(parse_form(&pairs(&[("initial_len", "0")])), Err(FormError::Missing("action")));
    assert_eq!(parse_form(&pairs(&[("action", "save")])), Err(FormError::Missing("initial_len")));
    assert_eq!(
        parse_form(&pairs(&[("action", "save"), ("initial_len", "0"), ("address", "a")])),
        Err(FormError::Ragged)
    );
    assert_eq!(
        parse_form(&pairs(&[("action", "jump"), ("initial_len", "0")])),
        Err(FormError::Invalid("action"))
    );
}

#[test]
fn apply_local_handles_add_and_remove() {
    let mut form = DeviceForm { nick: String::new(), list: saved_list(), action: FormAction::Add };
    form.apply_local();
    assert_eq!(form.list.entries().len(), 3);

    form.action = FormAction::Remove(0);
    form.apply_local();
    assert_eq!(form.list.entries()[0].description, "Phone");
}

#[test]
fn rendered_form_parses_back_to_same_list() {
    let mut list = saved_list();
    list.add();
    list.edit(2, "DE:AD:BE:EF:00:01", "Tablet <new>");
    let html = view! { <DeviceEditor nick="Smurf".to_string() list=list.clone() notice=None/> }.to_html();

    // Pull name/value pairs back out of the markup the way a browser would submit them.
    let mut submitted = Vec::new();
    for tag in html.split('<').filter(|t| t.starts_with("input")) {
        let attr = |name: &str| -> Option<String> {
            let start = tag.find(&format!("{name}=\""))? + name.len() + 2;
            let end = tag[start..].find('"')? + start;
            Some(tag[start..end].replace("&lt;", "<").replace("&gt;", ">"))
        };
        if let (Some(name), Some(value)) = (attr("name"), attr("value")) {
            submitted.push((name, value));
        }
    }
    submitted.push(("action".to_string(), "update".to_string()));

    let form = parse_form(&submitted).unwrap();
    assert_eq!(form.nick, "Smurf");
    assert_eq!(form.list, list);
}

#[test]
fn editor_disables_save_without_changes() {
    let html = view! { <DeviceEditor nick="Smurf".to_string() list=saved_list() notice=Some("Saved!")/> }.to_html();
    assert!(html.contains("value=\"save\" disabled"));
    assert!(html.contains("<p class=\"notice\">Saved!</p>"));
    assert!(html.contains("value=\"remove:1\""));
    assert!(html.contains("Do you really want to delete this device?"));
}

#[test]
fn editor_enables_save_after_an_edit() {
    let mut list = saved_list();
    list.edit(0, "AA:BB:CC:DD:EE:00", "Laptop");
    let html = view! { <DeviceEditor nick="Smurf".to_string() list=list notice=None/> }.to_html();
    assert!(!html.contains(" disabled"));
    assert!(!html.contains("class=\"notice\""));
}
