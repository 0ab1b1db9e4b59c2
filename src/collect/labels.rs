use crate::dom::dom_model::{Document, NodeId};

// ============================================================================
// Text normalization
// ============================================================================

/// Replace non-printable characters and whitespace runs with one space, then trim.
pub fn normalize_text(raw: &str) -> String {
    raw.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized text of a text node, or of an element's `textContent`.
pub fn text_from_node(doc: &Document, node: NodeId) -> String {
    match doc.node_text(node) {
        Some(text) => normalize_text(text),
        None => normalize_text(&doc.text_content(node)),
    }
}

/// Tags that end a run of neighbour text.
const SECTION_BOUNDARY_TAGS: &[&str] = &[
    "html", "body", "button", "form", "head", "iframe", "input", "option", "script", "select",
    "table", "textarea",
];

pub fn is_new_section_element(doc: &Document, node: Option<NodeId>) -> bool {
    match node {
        None => true,
        Some(n) => doc
            .tag(n)
            .map(|tag| SECTION_BOUNDARY_TAGS.contains(&tag))
            .unwrap_or(false),
    }
}

// ============================================================================
// Associated <label> text
// ============================================================================

/// Text of every label tied to the field: native association first, then
/// `for` matches on id or name plus wrapping labels, then a `<dt>` when the
/// field sits in a `<dd>`.
pub fn label_tag_text(doc: &Document, node: NodeId) -> String {
    let native = native_labels(doc, node);
    if !native.is_empty() {
        return join_label_text(doc, &native);
    }

    let mut labels: Vec<NodeId> = Vec::new();
    let push_unique = |labels: &mut Vec<NodeId>, n: NodeId| {
        if !labels.contains(&n) {
            labels.push(n);
        }
    };

    let id = doc.attribute(node, "id").filter(|v| !v.is_empty());
    let name = doc.attribute(node, "name").filter(|v| !v.is_empty());
    if id.is_some() || name.is_some() {
        let root = doc.tree_root(node);
        for candidate in doc.descendants(root) {
            if doc.tag(candidate) != Some("label") {
                continue;
            }
            let target = doc.attribute(candidate, "for");
            if target.is_some() && (target == id || target == name) {
                push_unique(&mut labels, candidate);
            }
        }
    }

    let document_element = doc.document_element();
    let mut current = Some(node);
    while let Some(el) = current {
        if Some(el) == document_element {
            break;
        }
        if doc.tag(el) == Some("label") {
            push_unique(&mut labels, el);
        }
        current = doc
            .parent_element(el)
            .and_then(|p| doc.closest(p, |d, n| d.tag(n) == Some("label")));
    }

    if labels.is_empty() {
        if let Some(parent) = doc.parent_element(node) {
            if doc.tag(parent) == Some("dd") {
                if let Some(term) = doc.previous_element_sibling(parent) {
                    if doc.tag(term) == Some("dt") {
                        labels.push(term);
                    }
                }
            }
        }
    }

    join_label_text(doc, &labels)
}

/// `element.labels`: labels whose `for` names the element id, and the
/// wrapping label. Only labelable controls have them.
fn native_labels(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let labelable = match doc.tag(node) {
        Some("input") => doc.element_type(node).as_deref() != Some("hidden"),
        Some("select") | Some("textarea") => true,
        _ => false,
    };
    if !labelable {
        return vec![];
    }

    let mut labels = Vec::new();
    if let Some(id) = doc.attribute(node, "id").filter(|v| !v.is_empty()) {
        let root = doc.tree_root(node);
        labels.extend(
            doc.descendants(root)
                .into_iter()
                .filter(|n| doc.tag(*n) == Some("label") && doc.attribute(*n, "for") == Some(id)),
        );
    }
    if let Some(wrapping) = doc.closest(node, |d, n| d.tag(n) == Some("label")) {
        if doc.attribute(wrapping, "for").is_none() && !labels.contains(&wrapping) {
            labels.push(wrapping);
        }
    }
    labels
}

fn join_label_text(doc: &Document, labels: &[NodeId]) -> String {
    labels
        .iter()
        .map(|l| normalize_text(&doc.text_content(*l)))
        .collect::<Vec<_>>()
        .join("")
}

// ============================================================================
// Neighbour text
// ============================================================================

/// Text of following siblings up to the next section boundary.
pub fn right_label_text(doc: &Document, node: NodeId) -> String {
    let mut parts = Vec::new();
    let mut current = doc.next_sibling(node);
    while let Some(sibling) = current {
        if is_new_section_element(doc, Some(sibling)) {
            break;
        }
        let text = text_from_node(doc, sibling);
        if !text.is_empty() {
            parts.push(text);
        }
        current = doc.next_sibling(sibling);
    }
    parts.join("")
}

/// Text preceding the field. Walks previous siblings; when none carry text,
/// climbs to the parent's previous sibling and descends to its deepest last
/// child, repeating until text or a section boundary is found.
pub fn left_label_text(doc: &Document, node: NodeId) -> String {
    let mut parts = previous_sibling_text(doc, node);
    parts.reverse();
    parts.join("")
}

fn previous_sibling_text(doc: &Document, start: NodeId) -> Vec<String> {
    let mut element = start;
    loop {
        let mut parts = Vec::new();
        let mut current = element;
        while let Some(sibling) = doc.previous_sibling(current) {
            current = sibling;
            if is_new_section_element(doc, Some(current)) {
                return parts;
            }
            let text = text_from_node(doc, current);
            if !text.is_empty() {
                parts.push(text);
            }
        }

        if !parts.is_empty() {
            return parts;
        }

        let Some(parent) = doc.parent(current) else {
            return parts;
        };
        let mut sibling = if doc.is_element(parent) {
            doc.previous_element_sibling(parent)
        } else {
            doc.previous_sibling(parent)
        };
        while let Some(s) = sibling {
            match doc.last_child(s) {
                Some(last) if !is_new_section_element(doc, Some(s)) => sibling = Some(last),
                _ => break,
            }
        }

        let Some(next) = sibling.filter(|s| !is_new_section_element(doc, Some(*s))) else {
            return parts;
        };

        let text = text_from_node(doc, next);
        if !text.is_empty() {
            return vec![text];
        }
        element = next;
    }
}

/// Column header one row up when the field sits in a table cell.
pub fn top_label_text(doc: &Document, node: NodeId) -> Option<String> {
    let cell = doc.closest(node, |d, n| d.tag(n) == Some("td"))?;
    let row = doc.parent_element(cell).filter(|r| doc.tag(*r) == Some("tr"))?;
    let cell_index = table_cells(doc, row).iter().position(|c| *c == cell)?;

    let previous_row = doc
        .previous_element_sibling(row)
        .filter(|r| doc.tag(*r) == Some("tr"))?;
    let header = table_cells(doc, previous_row).get(cell_index).copied()?;
    Some(text_from_node(doc, header))
}

fn table_cells(doc: &Document, row: NodeId) -> Vec<NodeId> {
    doc.element_children(row)
        .into_iter()
        .filter(|c| matches!(doc.tag(*c), Some("td") | Some("th")))
        .collect()
}
