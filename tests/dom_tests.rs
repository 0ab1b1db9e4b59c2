mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::utils::{document, fixture_path};
use page_autofill::dom::dom_model::{Document, MutationRecord, NodeId, Rect};
use page_autofill::dom::error::{DomError, VisibilityError};
use page_autofill::dom::query::{DomQuery, TreeWalkerQuery};
use page_autofill::dom::visibility::{StyleVisibility, VisibilityOracle, inline_style, viewable_or_hidden};

fn inputs(doc: &Document, query: &TreeWalkerQuery) -> Vec<String> {
    let is_input = |d: &Document, n: NodeId| d.tag(n) == Some("input");
    query
        .query_all(doc, doc.root(), &is_input, false)
        .into_iter()
        .map(|n| doc.attribute(n, "name").unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn test_load_fixture_file() {
    let path = fixture_path("login_page.json");
    let doc = Document::load(path.to_str().expect("utf-8 path")).expect("fixture loads");

    assert_eq!(doc.url(), "https://accounts.example.com/login");
    assert_eq!(doc.title(), "Sign in");
    let form = doc.element_by_id("login").expect("form");
    assert_eq!(doc.tag(form), Some("form"));
    assert_eq!(doc.text_content(form), "EmailPasswordSign in");
}

#[test]
fn test_missing_fixture_file_is_an_error() {
    let result = Document::load("/nonexistent/page.json");
    assert!(matches!(result, Err(DomError::FixtureRead { .. })));
}

#[test]
fn test_malformed_fixture_is_an_error() {
    let result = Document::from_json_str("{\"title\": 3}");
    assert!(matches!(result, Err(DomError::FixtureParse { .. })));
}

// ============================================================================
// Tree edits
// ============================================================================

#[test]
fn test_insert_fixture_returns_child_list_record() {
    let mut doc = document(json!({
        "url": "https://example.com/",
        "body": [ { "tag": "div", "attrs": { "id": "slot" } } ]
    }));
    let slot = doc.element_by_id("slot").expect("slot");

    let (node, record) = doc
        .insert_fixture(slot, json!({ "tag": "input", "attrs": { "name": "late" } }))
        .expect("insert");

    assert_eq!(
        record,
        MutationRecord::ChildList {
            target: slot,
            added: vec![node],
            removed: vec![],
        }
    );
    assert!(doc.is_connected(node));
}

#[test]
fn test_remove_child_detaches_subtree() {
    let mut doc = document(json!({
        "url": "https://example.com/",
        "body": [ { "tag": "form", "attrs": { "id": "f" }, "children": [
            { "tag": "div", "attrs": { "id": "wrap" }, "children": [ { "tag": "input", "attrs": { "id": "i" } } ] }
        ] } ]
    }));
    let form = doc.element_by_id("f").expect("form");
    let wrap = doc.element_by_id("wrap").expect("wrap");
    let input = doc.element_by_id("i").expect("input");

    let record = doc.remove_child(form, wrap).expect("remove");

    assert_eq!(
        record,
        MutationRecord::ChildList {
            target: form,
            added: vec![],
            removed: vec![wrap],
        }
    );
    assert!(!doc.is_connected(input));
    assert!(doc.element_by_id("i").is_none(), "detached nodes are not found by id");
}

#[test]
fn test_append_under_own_descendant_rejected() {
    let mut doc = document(json!({
        "url": "https://example.com/",
        "body": [ { "tag": "div", "attrs": { "id": "outer" }, "children": [ { "tag": "div", "attrs": { "id": "inner" } } ] } ]
    }));
    let outer = doc.element_by_id("outer").expect("outer");
    let inner = doc.element_by_id("inner").expect("inner");

    assert!(matches!(
        doc.append_child(inner, outer),
        Err(DomError::HierarchyRequest { .. })
    ));
}

#[test]
fn test_set_attribute_lowercases_name() {
    let mut doc = document(json!({
        "url": "https://example.com/",
        "body": [ { "tag": "input", "attrs": { "id": "i" } } ]
    }));
    let input = doc.element_by_id("i").expect("input");

    let record = doc.set_attribute(input, "MaxLength", "8").expect("set");

    assert_eq!(
        record,
        MutationRecord::Attributes {
            target: input,
            name: "maxlength".to_string(),
        }
    );
    assert_eq!(doc.attribute(input, "maxlength"), Some("8"));
}

// ============================================================================
// Form-control properties
// ============================================================================

#[test]
fn test_element_type_defaults() {
    let doc = document(json!({
        "url": "https://example.com/",
        "body": [
            { "tag": "input", "attrs": { "id": "plain" } },
            { "tag": "input", "attrs": { "id": "odd", "type": "Fancy" } },
            { "tag": "input", "attrs": { "id": "mail", "type": "EMAIL" } },
            { "tag": "select", "attrs": { "id": "one" } },
            { "tag": "select", "attrs": { "id": "many", "multiple": "" } },
            { "tag": "textarea", "attrs": { "id": "notes" } }
        ]
    }));
    let kind = |id: &str| doc.element_by_id(id).and_then(|n| doc.element_type(n));

    assert_eq!(kind("plain").as_deref(), Some("text"));
    assert_eq!(kind("odd").as_deref(), Some("text"));
    assert_eq!(kind("mail").as_deref(), Some("email"));
    assert_eq!(kind("one").as_deref(), Some("select-one"));
    assert_eq!(kind("many").as_deref(), Some("select-multiple"));
    assert_eq!(kind("notes").as_deref(), Some("textarea"));
}

#[test]
fn test_select_value_is_selected_or_first_option() {
    let doc = document(json!({
        "url": "https://example.com/",
        "body": [
            { "tag": "select", "attrs": { "id": "a" }, "children": [
                { "tag": "option", "attrs": { "value": "1" }, "children": ["One"] },
                { "tag": "option", "attrs": { "value": "2", "selected": "" }, "children": ["Two"] }
            ] },
            { "tag": "select", "attrs": { "id": "b" }, "children": [
                { "tag": "option", "children": ["  First   choice "] }
            ] }
        ]
    }));

    assert_eq!(doc.element_by_id("a").and_then(|n| doc.value(n)).as_deref(), Some("2"));
    assert_eq!(doc.element_by_id("b").and_then(|n| doc.value(n)).as_deref(), Some("First choice"));
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn test_style_visibility_rules() {
    let doc = document(json!({
        "url": "https://example.com/",
        "viewport": { "x": 0, "y": 0, "width": 800, "height": 600 },
        "body": [
            { "tag": "input", "attrs": { "id": "shown" } },
            { "tag": "input", "attrs": { "id": "none", "style": "color: red; display: none !important" } },
            { "tag": "input", "attrs": { "id": "faded", "style": "opacity:0" } },
            { "tag": "div", "attrs": { "hidden": "" }, "children": [ { "tag": "input", "attrs": { "id": "nested" } } ] },
            { "tag": "input", "attrs": { "id": "covered", "data-occluded": "" } },
            { "tag": "input", "attrs": { "id": "offscreen" }, "rect": { "x": 0, "y": 2000, "width": 100, "height": 20 } },
            { "tag": "input", "attrs": { "id": "collapsed" }, "rect": { "x": 0, "y": 0, "width": 0, "height": 20 } },
            { "tag": "input", "attrs": { "id": "onscreen" }, "rect": { "x": 10, "y": 10, "width": 100, "height": 20 } }
        ]
    }));
    let oracle = StyleVisibility;
    let viewable = |id: &str| {
        let node = doc.element_by_id(id).expect("element");
        oracle.is_viewable(&doc, node).expect("measurable")
    };

    assert!(viewable("shown"));
    assert!(!viewable("none"));
    assert!(!viewable("faded"));
    assert!(!viewable("nested"), "hidden ancestor");
    assert!(!viewable("covered"));
    assert!(!viewable("offscreen"));
    assert!(!viewable("collapsed"));
    assert!(viewable("onscreen"));
}

#[test]
fn test_detached_element_is_hidden() {
    let mut doc = document(json!({ "url": "https://example.com/", "body": [] }));
    let orphan = doc.create_element("input");

    assert_eq!(StyleVisibility.is_viewable(&doc, orphan), Err(VisibilityError::Detached(orphan)));
    assert!(!viewable_or_hidden(&StyleVisibility, &doc, orphan));
}

#[test]
fn test_inline_style_parsing() {
    let pairs: Vec<(String, String)> = inline_style("Display: Block; ; visibility:hidden").collect();
    assert_eq!(
        pairs,
        vec![
            ("display".to_string(), "block".to_string()),
            ("visibility".to_string(), "hidden".to_string()),
        ]
    );
}

#[test]
fn test_rect_intersection() {
    let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert!(Rect::new(90.0, 90.0, 20.0, 20.0).intersects(&viewport));
    assert!(!Rect::new(100.0, 0.0, 10.0, 10.0).intersects(&viewport));
    assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
}

// ============================================================================
// Shadow trees
// ============================================================================

#[test]
fn test_tree_walker_enters_shadow_roots_once_detected() {
    let doc = document(json!({
        "url": "https://example.com/",
        "body": [
            { "tag": "input", "attrs": { "name": "light" } },
            { "tag": "login-widget", "shadow": [ { "tag": "input", "attrs": { "name": "shadow" } } ],
              "children": [ { "tag": "input", "attrs": { "name": "slotted" } } ] }
        ]
    }));
    let mut query = TreeWalkerQuery::new();

    assert_eq!(inputs(&doc, &query), vec!["light", "slotted"]);
    assert!(query.check_page_contains_shadow_dom(&doc));
    assert_eq!(inputs(&doc, &query), vec!["light", "shadow", "slotted"], "shadow tree before light children");
}
