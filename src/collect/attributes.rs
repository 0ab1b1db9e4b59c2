use crate::collect::snapshot_model::{SelectInfo, SelectOption};
use crate::dom::dom_model::{Document, NodeId};

// ============================================================================
// Candidate selection
// ============================================================================

/// Input types never collected as fields.
pub const IGNORED_INPUT_TYPES: &[&str] = &["hidden", "submit", "reset", "button", "image", "file"];

/// Upper bound for `maxLength`; also the value reported when none is set.
pub const MAX_LENGTH_CAP: usize = 999;

/// Hidden values longer than this are snipped.
pub const HIDDEN_VALUE_MAX_LENGTH: usize = 254;

pub const CHECKED_MARKER: &str = "✓";

pub fn is_form_element(doc: &Document, node: NodeId) -> bool {
    doc.tag(node) == Some("form")
}

/// Inputs (minus ignored types and `data-bwignore`), textareas, selects and
/// spans marked `data-bwautofill`.
pub fn is_field_element(doc: &Document, node: NodeId) -> bool {
    match doc.tag(node) {
        Some("input") => {
            if doc.has_attribute(node, "data-bwignore") {
                return false;
            }
            let input_type = doc.element_type(node).unwrap_or_default();
            !IGNORED_INPUT_TYPES.contains(&input_type.as_str())
        }
        Some("textarea") | Some("select") => !doc.has_attribute(node, "data-bwignore"),
        Some("span") => doc.has_attribute(node, "data-bwautofill"),
        _ => false,
    }
}

pub fn is_form_or_field_element(doc: &Document, node: NodeId) -> bool {
    is_form_element(doc, node) || is_field_element(doc, node)
}

/// Checkboxes and radios are dropped first when a page exceeds the field cap.
pub fn is_important_field(doc: &Document, node: NodeId) -> bool {
    !matches!(doc.element_type(node).as_deref(), Some("checkbox") | Some("radio"))
}

pub fn is_inside_submit_button(doc: &Document, node: NodeId) -> bool {
    doc.closest(node, |d, n| {
        d.tag(n) == Some("button") && d.attribute(n, "type").map(|t| t.eq_ignore_ascii_case("submit")) == Some(true)
    })
    .is_some()
}

/// The form that owns a control: `form="id"` reference first, else the
/// nearest ancestor form.
pub fn owning_form(doc: &Document, node: NodeId) -> Option<NodeId> {
    if let Some(form_id) = doc.attribute(node, "form").filter(|f| !f.is_empty()) {
        if let Some(form) = doc.element_by_id(form_id).filter(|f| is_form_element(doc, *f)) {
            return Some(form);
        }
    }
    doc.closest(node, is_form_element)
}

// ============================================================================
// Attribute getters
// ============================================================================

/// Attribute value with the name matched case-insensitively.
pub fn attribute_value(doc: &Document, node: NodeId, name: &str) -> Option<String> {
    doc.attribute(node, name).map(str::to_string)
}

/// Boolean content attribute (`disabled`, `readonly`, `checked`): present means true.
pub fn boolean_attribute(doc: &Document, node: NodeId, name: &str) -> bool {
    doc.has_attribute(node, name)
}

/// ARIA state attribute: true only for the literal `"true"`.
pub fn aria_flag(doc: &Document, node: NodeId, name: &str) -> bool {
    doc.attribute(node, name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn max_length(doc: &Document, node: NodeId) -> Option<usize> {
    match doc.tag(node) {
        Some("input") | Some("textarea") => {
            let declared = doc
                .attribute(node, "maxlength")
                .and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > -1)
                .map(|v| v as usize)
                .unwrap_or(MAX_LENGTH_CAP);
            Some(declared.min(MAX_LENGTH_CAP))
        }
        _ => None,
    }
}

/// `x-autocompletetype`, then `autocompletetype`, then `autocomplete`.
pub fn autocomplete_type(doc: &Document, node: NodeId) -> Option<String> {
    ["x-autocompletetype", "autocompletetype", "autocomplete"]
        .iter()
        .find_map(|name| doc.attribute(node, name).filter(|v| !v.is_empty()))
        .map(str::to_string)
}

/// `dataset` rendered as `key: value, ` pairs with camel-cased keys.
pub fn data_set_values(doc: &Document, node: NodeId) -> String {
    doc.attributes(node)
        .iter()
        .filter_map(|(name, value)| {
            name.strip_prefix("data-")
                .map(|key| format!("{}: {}, ", dataset_key(key), value))
        })
        .collect()
}

fn dataset_key(attribute_suffix: &str) -> String {
    let mut key = String::with_capacity(attribute_suffix.len());
    let mut upper_next = false;
    for c in attribute_suffix.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next && c.is_ascii_lowercase() {
            key.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            if upper_next {
                key.push('-');
            }
            key.push(c);
            upper_next = false;
        }
    }
    if upper_next {
        key.push('-');
    }
    key
}

/// Current value as reported to the engine.
pub fn element_value(doc: &Document, node: NodeId) -> String {
    if doc.tag(node) == Some("span") {
        return doc.text_content(node);
    }

    let value = doc.value(node).unwrap_or_default();
    match doc.element_type(node).as_deref() {
        Some("checkbox") => {
            if boolean_attribute(doc, node, "checked") {
                CHECKED_MARKER.to_string()
            } else {
                String::new()
            }
        }
        Some("hidden") if value.chars().count() > HIDDEN_VALUE_MAX_LENGTH => {
            let head: String = value.chars().take(HIDDEN_VALUE_MAX_LENGTH).collect();
            format!("{}...SNIPPED", head)
        }
        _ => value,
    }
}

const OPTION_PUNCTUATION: &str = "~`!@$%^&#*()-_+=:;'\"[]|\\,<.>?";

/// Option text lowercased with whitespace and punctuation removed, paired with the raw value.
pub fn select_options(doc: &Document, node: NodeId) -> Option<SelectInfo> {
    if doc.tag(node) != Some("select") {
        return None;
    }
    let options = doc
        .select_options(node)
        .into_iter()
        .map(|option| {
            let text = doc.option_text(option);
            let normalized = if text.is_empty() {
                None
            } else {
                Some(
                    text.to_lowercase()
                        .chars()
                        .filter(|c| !c.is_whitespace() && !OPTION_PUNCTUATION.contains(*c))
                        .collect(),
                )
            };
            SelectOption(normalized, doc.option_value(option))
        })
        .collect();
    Some(SelectInfo { options })
}

/// Form `action` resolved against the document address. Falls back to the
/// raw attribute when it cannot be resolved.
pub fn form_action(doc: &Document, form: NodeId) -> String {
    let raw = doc.attribute(form, "action").unwrap_or("");
    match url::Url::parse(doc.url()).and_then(|base| base.join(raw)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => raw.to_string(),
    }
}
