mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::overlay::{OverlayEvent, RecordingOverlay};
use common::utils::{document, fixture_path, manual_collector};
use page_autofill::collect::collector::{CollectorConfig, PageCollector};
use page_autofill::collect::scheduler::ManualClock;
use page_autofill::dom::dom_model::Document;
use page_autofill::dom::query::TreeWalkerQuery;
use page_autofill::dom::visibility::StyleVisibility;

fn login_page() -> Document {
    let path = fixture_path("login_page.json");
    Document::load(path.to_str().expect("utf-8 path")).expect("login fixture")
}

fn opids_and_names(collector: &mut PageCollector, doc: &Document) -> Vec<(String, String)> {
    collector
        .get_snapshot(doc)
        .fields
        .into_iter()
        .map(|f| (f.opid, f.html_name.unwrap_or_default()))
        .collect()
}

fn pair(opid: &str, name: &str) -> (String, String) {
    (opid.to_string(), name.to_string())
}

// ============================================================================
// Full collection
// ============================================================================

#[test]
fn test_collects_login_fixture() {
    let clock = ManualClock::new(1_000);
    let mut collector = manual_collector(&clock);
    let doc = login_page();

    let snapshot = collector.get_snapshot(&doc);

    assert_eq!(snapshot.url, "https://accounts.example.com/login");
    assert_eq!(snapshot.title, "Sign in");
    assert_eq!(snapshot.collected_timestamp, 1_000);

    let form = snapshot.forms.get("__form__0").expect("login form");
    assert_eq!(form.html_action, "https://accounts.example.com/session");
    assert_eq!(form.html_id.as_deref(), Some("login"));
    assert_eq!(form.html_method.as_deref(), Some("post"));

    let summary: Vec<(&str, Option<&str>, Option<&str>)> = snapshot
        .fields
        .iter()
        .map(|f| (f.opid.as_str(), f.field_type.as_deref(), f.form.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("__0", Some("email"), Some("__form__0")),
            ("__1", Some("password"), Some("__form__0")),
            ("__2", Some("checkbox"), Some("__form__0")),
        ],
        "submit button is not a field"
    );
    assert_eq!(snapshot.fields[0].label_tag.as_deref(), Some("Email"));
    assert_eq!(snapshot.fields[0].max_length, Some(999));
    assert!(snapshot.fields.iter().all(|f| f.viewable));
    assert!(collector.observers_installed());
}

#[test]
fn test_repeated_snapshot_served_from_cache() {
    let clock = ManualClock::new(0);
    let mut collector = manual_collector(&clock);
    let doc = login_page();

    let first = collector.get_snapshot(&doc);
    let second = collector.get_snapshot(&doc);

    assert_eq!(first.fields, second.fields);
    assert_eq!(first.forms, second.forms);
    assert_eq!(collector.stats().full_collections, 1);
    assert_eq!(collector.stats().cached_snapshots, 1);
}

#[test]
fn test_field_cap_drops_checkboxes_first() {
    let clock = ManualClock::new(0);
    let config = CollectorConfig {
        max_fields: 3,
        ..CollectorConfig::default()
    };
    let mut collector = PageCollector::new(
        config,
        Box::new(StyleVisibility),
        Box::new(TreeWalkerQuery::new()),
        Box::new(clock.clone()),
    );
    let doc = document(json!({
        "url": "https://example.com/",
        "body": [
            { "tag": "input", "attrs": { "type": "checkbox", "name": "cb1" } },
            { "tag": "input", "attrs": { "name": "a" } },
            { "tag": "input", "attrs": { "name": "b" } },
            { "tag": "input", "attrs": { "type": "radio", "name": "cb2" } }
        ]
    }));

    assert_eq!(
        opids_and_names(&mut collector, &doc),
        vec![pair("__0", "cb1"), pair("__1", "a"), pair("__2", "b")],
        "important fields kept, then the first checkbox, in document order"
    );
}

#[test]
fn test_ignored_inputs_and_unmarked_spans_skipped() {
    let clock = ManualClock::new(0);
    let mut collector = manual_collector(&clock);
    let doc = document(json!({
        "url": "https://example.com/",
        "body": [
            { "tag": "input", "attrs": { "type": "hidden", "name": "csrf" } },
            { "tag": "input", "attrs": { "type": "submit", "name": "go" } },
            { "tag": "input", "attrs": { "name": "ignored", "data-bwignore": "" } },
            { "tag": "span", "attrs": { "id": "plain" }, "children": ["text"] },
            { "tag": "span", "attrs": { "id": "marked", "data-bwautofill": "" }, "children": ["42"] },
            { "tag": "textarea", "attrs": { "name": "notes" } },
            { "tag": "select", "attrs": { "name": "country" }, "children": [
                { "tag": "option", "attrs": { "value": "us" }, "children": ["United States"] }
            ] }
        ]
    }));

    let snapshot = collector.get_snapshot(&doc);
    let tags: Vec<&str> = snapshot.fields.iter().map(|f| f.tag_name.as_str()).collect();

    assert_eq!(tags, vec!["span", "textarea", "select"]);
    assert_eq!(snapshot.fields[0].html_id.as_deref(), Some("marked"));
    assert_eq!(snapshot.fields[0].field_type, None, "spans carry only base attributes");
    assert_eq!(snapshot.fields[2].value.as_deref(), Some("us"));
}

#[test]
fn test_fields_inside_submit_button_keep_their_index() {
    let clock = ManualClock::new(0);
    let mut collector = manual_collector(&clock);
    let doc = document(json!({
        "url": "https://example.com/",
        "body": [
            { "tag": "input", "attrs": { "name": "first" } },
            { "tag": "button", "attrs": { "type": "submit" }, "children": [
                { "tag": "input", "attrs": { "name": "inner" } }
            ] },
            { "tag": "input", "attrs": { "name": "last" } }
        ]
    }));

    assert_eq!(
        opids_and_names(&mut collector, &doc),
        vec![pair("__0", "first"), pair("__2", "last")]
    );
}

#[test]
fn test_shadow_root_fields_collected() {
    let clock = ManualClock::new(0);
    let mut collector = manual_collector(&clock);
    let doc = document(json!({
        "url": "https://example.com/",
        "body": [
            { "tag": "form", "attrs": { "id": "outer" }, "children": [
                { "tag": "login-box", "shadow": [
                    { "tag": "input", "attrs": { "type": "password", "name": "secret" } }
                ] }
            ] }
        ]
    }));

    let snapshot = collector.get_snapshot(&doc);

    assert_eq!(snapshot.fields.len(), 1);
    assert_eq!(snapshot.fields[0].html_name.as_deref(), Some("secret"));
    assert_eq!(
        snapshot.fields[0].form.as_deref(),
        Some("__form__0"),
        "owning form found through the shadow host"
    );
    assert!(collector.is_password_field_within_document(&doc));
}

#[test]
fn test_page_without_fields_is_not_recollected() {
    let clock = ManualClock::new(0);
    let mut collector = manual_collector(&clock);
    let doc = document(json!({
        "url": "https://example.com/about",
        "title": "About",
        "body": [ { "tag": "p", "children": ["Nothing to fill"] } ]
    }));

    let first = collector.get_snapshot(&doc);
    let second = collector.get_snapshot(&doc);

    assert!(first.fields.is_empty());
    assert!(second.fields.is_empty());
    assert_eq!(second.title, "About");
    assert_eq!(collector.stats().full_collections, 1);
    assert_eq!(collector.stats().cached_snapshots, 0);
    assert!(!collector.is_password_field_within_document(&doc));
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn test_field_element_by_opid_falls_back_to_index() {
    let clock = ManualClock::new(0);
    let mut collector = manual_collector(&clock);
    let doc = login_page();
    collector.get_snapshot(&doc);
    let password = doc.element_by_id("password").expect("password");

    assert_eq!(collector.field_element_by_opid(&doc, "__1"), Some(password));

    collector.destroy();
    assert!(collector.cached_field(password).is_none());
    assert_eq!(
        collector.field_element_by_opid(&doc, "__1"),
        Some(password),
        "index fallback after the cache is gone"
    );
    assert_eq!(collector.field_element_by_opid(&doc, "__9"), None);
    assert_eq!(collector.field_element_by_opid(&doc, "__form__0"), None);
    assert_eq!(collector.field_element_by_opid(&doc, "email"), None);
}

// ============================================================================
// Viewport intersection
// ============================================================================

fn page_with_hidden_code() -> Document {
    document(json!({
        "url": "https://example.com/verify",
        "body": [
            { "tag": "input", "attrs": { "name": "user" } },
            { "tag": "input", "attrs": { "id": "code", "name": "code", "style": "display: none" } }
        ]
    }))
}

#[test]
fn test_hidden_field_announced_once_when_it_appears() {
    let clock = ManualClock::new(0);
    let overlay = RecordingOverlay::default();
    let mut collector = manual_collector(&clock).with_overlay(Box::new(overlay.clone()));
    let mut doc = page_with_hidden_code();

    let snapshot = collector.get_snapshot(&doc);
    let code = doc.element_by_id("code").expect("code");
    assert!(!snapshot.fields[1].viewable);
    assert!(collector.is_observing_intersection(code));

    collector.handle_intersections(&doc, &[code]);
    assert!(overlay.events().is_empty(), "initial report is skipped");

    doc.set_attribute(code, "style", "display: block").expect("style");
    collector.handle_intersections(&doc, &[code]);
    collector.handle_intersections(&doc, &[code]);

    assert_eq!(
        overlay.events(),
        vec![OverlayEvent::Viewable {
            opid: "__1".to_string(),
            url: "https://example.com/verify".to_string(),
        }]
    );
    assert!(!collector.is_observing_intersection(code));
    assert!(collector.cached_field(code).map(|f| f.viewable).unwrap_or(false));

    collector.get_snapshot(&doc);
    assert_eq!(overlay.viewable_opids(), vec!["__1"], "cache refresh does not announce again");
}

#[test]
fn test_cache_refresh_announces_newly_viewable_field() {
    let clock = ManualClock::new(0);
    let overlay = RecordingOverlay::default();
    let mut collector = manual_collector(&clock).with_overlay(Box::new(overlay.clone()));
    let mut doc = page_with_hidden_code();
    collector.get_snapshot(&doc);
    let code = doc.element_by_id("code").expect("code");

    doc.remove_attribute(code, "style").expect("style");
    let snapshot = collector.get_snapshot(&doc);

    assert!(snapshot.fields[1].viewable);
    assert_eq!(overlay.viewable_opids(), vec!["__1"]);

    collector.handle_intersections(&doc, &[code]);
    assert_eq!(overlay.viewable_opids().len(), 1);
}

#[test]
fn test_still_hidden_report_keeps_observing() {
    let clock = ManualClock::new(0);
    let overlay = RecordingOverlay::default();
    let mut collector = manual_collector(&clock).with_overlay(Box::new(overlay.clone()));
    let doc = page_with_hidden_code();
    collector.get_snapshot(&doc);
    let code = doc.element_by_id("code").expect("code");

    collector.handle_intersections(&doc, &[code]);
    collector.handle_intersections(&doc, &[code]);

    assert!(overlay.events().is_empty());
    assert!(collector.is_observing_intersection(code));
}
