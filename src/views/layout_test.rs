use super::*;
use leptos::prelude::*;

/// The markup between the active nav entry's class and the end of its item.
fn active_item(html: &str) -> &str {
    let after = html.split_once("class=\"active\"").unwrap().1;
    after.split_once("</li>").unwrap().0
}

#[test]
fn nav_marks_exactly_the_matching_entry() {
    let active = |path: &str| -> Vec<NavItem> { NavItem::ALL.into_iter().filter(|i| i.is_active(path)).collect() };
    assert_eq!(active("/"), vec![NavItem::Home]);
    assert_eq!(active("/me"), vec![NavItem::Me]);
    assert_eq!(active("/stats/week"), vec![NavItem::Stats]);
    assert_eq!(active("/user/smurf"), vec![NavItem::MyStats]);
    assert!(active("/stats").is_empty());
}

#[test]
fn header_links_every_section() {
    let html = view! { <Header path="/".to_string()/> }.to_html();
    for item in NavItem::ALL {
        assert!(html.contains(&format!("href=\"{}\"", item.href())));
        assert!(html.contains(item.label()));
    }
    assert_eq!(html.matches("class=\"active\"").count(), 1);
    assert!(active_item(&html).contains(">SMURFS IN THE HUBB</a>"));
}

#[test]
fn page_wraps_body_in_shell() {
    let html = page("/me", view! { <p>"hi"</p> });
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Who is in the Hubb?</title>"));
    assert!(html.contains("<main><p>hi</p></main>"));
    assert!(html.contains("<footer>"));
    assert!(html.contains("Rosen 🌹</a> &amp; <a"));
    assert!(active_item(&html).contains("href=\"/me\""));
}

#[test]
fn page_escapes_text_content() {
    let html = page("/", view! { <p>{"<script>alert(1)</script>".to_string()}</p> });
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>alert"));
}

#[test]
fn notices_have_distinct_classes() {
    assert!(view! { <ErrorNotice message=FETCH_FAILED/> }.to_html().contains("class=\"error\""));
    assert!(view! { <Loading/> }.to_html().contains("class=\"loading\""));
}
