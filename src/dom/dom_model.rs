use serde::{Deserialize, Serialize};

use crate::dom::error::{DomError, Result};

// ============================================================================
// Node arena
// ============================================================================

/// Handle of a node inside a [`Document`] arena. Handles are never reused,
/// so a removed node keeps its id (and its subtree) until the document is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in insertion order, names lowercased
    pub attributes: Vec<(String, String)>,
    pub shadow_root: Option<NodeId>,
    /// Layout box, when the host measured one
    pub rect: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    ShadowRoot { host: NodeId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Structural change delivered by the host's mutation observer.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    Attributes {
        target: NodeId,
        name: String,
    },
}

/// Live document: an arena of nodes plus location and viewport.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    url: String,
    title: String,
    viewport: Rect,
}

pub const DEFAULT_VIEWPORT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1280.0,
    height: 800.0,
};

impl Document {
    pub fn new(url: &str) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: vec![],
            }],
            root: NodeId(0),
            url: url.to_string(),
            title: String::new(),
            viewport: DEFAULT_VIEWPORT,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Change the document address the way a same-document navigation does.
    /// No mutation record is produced; observers notice on their next delivery.
    pub fn navigate(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// First element child of the document node (`<html>`).
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|c| self.is_element(*c))
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: vec![],
            shadow_root: None,
            rect: None,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: vec![],
        });
        id
    }

    /// Attach an open shadow root to `host` (or return the existing one).
    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId> {
        if let Some(existing) = self.shadow_root(host) {
            return Ok(existing);
        }
        self.element(host)?;
        let shadow = self.push(NodeKind::ShadowRoot { host });
        if let Some(NodeKind::Element(data)) = self.nodes.get_mut(host.0).map(|n| &mut n.kind) {
            data.shadow_root = Some(shadow);
        }
        Ok(shadow)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<MutationRecord> {
        self.node(parent).ok_or(DomError::UnknownNode(parent))?;
        self.node(child).ok_or(DomError::UnknownNode(child))?;
        if parent == child || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        // Moving a node detaches it from its previous parent first.
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);

        Ok(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: vec![],
        })
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<MutationRecord> {
        self.node(parent).ok_or(DomError::UnknownNode(parent))?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::UnknownNode(child));
        }
        self.nodes[parent.0].children.retain(|c| *c != child);
        self.nodes[child.0].parent = None;

        Ok(MutationRecord::ChildList {
            target: parent,
            added: vec![],
            removed: vec![child],
        })
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<MutationRecord> {
        let name = name.to_ascii_lowercase();
        let data = self.element_mut(node)?;
        match data.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => data.attributes.push((name.clone(), value.to_string())),
        }
        Ok(MutationRecord::Attributes { target: node, name })
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<MutationRecord> {
        let name = name.to_ascii_lowercase();
        self.element_mut(node)?.attributes.retain(|(n, _)| *n != name);
        Ok(MutationRecord::Attributes { target: node, name })
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Option<Rect>) -> Result<()> {
        self.element_mut(node)?.rect = rect;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Result<&ElementData> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Element(data)) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(|n| &n.kind), Some(NodeKind::Element(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let data = self.element(id).ok()?;
        data.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        self.element(id).map(|e| e.attributes.as_slice()).unwrap_or(&[])
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.element(id).ok().and_then(|e| e.rect)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Parent element, crossing out of a shadow root into its host.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        match self.node(parent).map(|n| &n.kind) {
            Some(NodeKind::Element(_)) => Some(parent),
            Some(NodeKind::ShadowRoot { host }) => Some(*host),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).ok().and_then(|e| e.shadow_root)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|c| *c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling(id);
        while let Some(node) = current {
            if self.is_element(node) {
                return Some(node);
            }
            current = self.previous_sibling(node);
        }
        None
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// True if `node` is `ancestor` or sits anywhere below it in the light tree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Nearest inclusive ancestor element satisfying `pred`, crossing shadow boundaries.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Option<NodeId> {
        let mut current = if self.is_element(id) { Some(id) } else { self.parent_element(id) };
        while let Some(node) = current {
            if pred(self, node) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }

    /// Root of the tree `id` lives in: the document node, a shadow root, or the
    /// top of a detached subtree.
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Attached to the document, possibly through shadow hosts.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            let root = self.tree_root(current);
            match self.node(root).map(|n| &n.kind) {
                Some(NodeKind::Document) => return true,
                Some(NodeKind::ShadowRoot { host }) => current = *host,
                _ => return false,
            }
        }
    }

    /// Light-tree descendants of `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Concatenated text of every descendant text node (`textContent`).
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.node_text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.node_text(n))
            .collect()
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<MutationRecord> {
        let removed: Vec<NodeId> = self.children(id).to_vec();
        for child in &removed {
            self.nodes[child.0].parent = None;
        }
        self.node(id).ok_or(DomError::UnknownNode(id))?;
        self.nodes[id.0].children.clear();
        let text_node = self.create_text(text);
        self.nodes[text_node.0].parent = Some(id);
        self.nodes[id.0].children.push(text_node);
        Ok(MutationRecord::ChildList {
            target: id,
            added: vec![text_node],
            removed,
        })
    }

    // ------------------------------------------------------------------------
    // Form-control properties
    // ------------------------------------------------------------------------

    /// The `type` property of a form control. Inputs default to `text` for a
    /// missing or unknown type, selects report `select-one`/`select-multiple`.
    pub fn element_type(&self, id: NodeId) -> Option<String> {
        match self.tag(id)? {
            "input" => {
                let raw = self
                    .attribute(id, "type")
                    .map(|t| t.trim().to_ascii_lowercase())
                    .unwrap_or_default();
                if INPUT_TYPES.contains(&raw.as_str()) {
                    Some(raw)
                } else {
                    Some("text".to_string())
                }
            }
            "select" => Some(if self.has_attribute(id, "multiple") {
                "select-multiple".to_string()
            } else {
                "select-one".to_string()
            }),
            "textarea" => Some("textarea".to_string()),
            "button" => Some(
                self.attribute(id, "type")
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_else(|| "submit".to_string()),
            ),
            _ => self.attribute(id, "type").map(|t| t.to_ascii_lowercase()),
        }
    }

    /// Option elements of a select, including those inside optgroups.
    pub fn select_options(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.tag(*n) == Some("option"))
            .collect()
    }

    /// The `value` property: selected option for selects, text for textareas,
    /// the `value` attribute otherwise.
    pub fn value(&self, id: NodeId) -> Option<String> {
        match self.tag(id)? {
            "select" => {
                let options = self.select_options(id);
                let selected = options
                    .iter()
                    .copied()
                    .find(|o| self.has_attribute(*o, "selected"))
                    .or_else(|| options.first().copied())?;
                Some(self.option_value(selected))
            }
            "textarea" => Some(
                self.attribute(id, "value")
                    .map(str::to_string)
                    .unwrap_or_else(|| self.text_content(id)),
            ),
            "option" => Some(self.option_value(id)),
            _ => self.attribute(id, "value").map(str::to_string),
        }
    }

    pub fn option_value(&self, option: NodeId) -> String {
        match self.attribute(option, "value") {
            Some(v) => v.to_string(),
            None => collapse_whitespace(&self.text_content(option)),
        }
    }

    /// Option label as `HTMLOptionElement.text` reports it.
    pub fn option_text(&self, option: NodeId) -> String {
        collapse_whitespace(&self.text_content(option))
    }
}

const INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "date", "datetime-local", "email", "file", "hidden", "image",
    "month", "number", "password", "radio", "range", "reset", "search", "submit", "tel", "text",
    "time", "url", "week",
];

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
