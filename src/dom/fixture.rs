use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dom::dom_model::{Document, MutationRecord, NodeId, Rect};
use crate::dom::error::{DomError, Result};

// ============================================================================
// JSON document fixtures
// ============================================================================

/// Serialized page used by the CLI and tests.
///
/// ```json
/// { "url": "https://example.com/login", "title": "Sign in",
///   "body": [ { "tag": "form", "children": [
///       { "tag": "input", "attrs": { "type": "email", "name": "email" } } ] } ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentFixture {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub viewport: Option<Rect>,
    #[serde(default)]
    pub body: Vec<NodeFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeFixture {
    Text(String),
    Element(ElementFixture),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementFixture {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeFixture>,
    /// Children of an open shadow root attached to this element
    pub shadow: Option<Vec<NodeFixture>>,
    pub rect: Option<Rect>,
}

impl Document {
    /// Build `<html><head/><body>…</body></html>` from a fixture.
    pub fn from_fixture(fixture: &DocumentFixture) -> Result<Document> {
        let mut doc = Document::new(&fixture.url);
        doc.set_title(&fixture.title);
        if let Some(viewport) = fixture.viewport {
            doc.set_viewport(viewport);
        }

        let html = doc.create_element("html");
        doc.append_child(doc.root(), html)?;
        let head = doc.create_element("head");
        doc.append_child(html, head)?;
        let body = doc.create_element("body");
        doc.append_child(html, body)?;

        for child in &fixture.body {
            build_node(&mut doc, body, child)?;
        }
        Ok(doc)
    }

    pub fn from_json_str(json: &str) -> Result<Document> {
        let fixture: DocumentFixture =
            serde_json::from_str(json).map_err(|source| DomError::FixtureParse {
                context: "document".to_string(),
                source,
            })?;
        Document::from_fixture(&fixture)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Document> {
        let fixture: DocumentFixture =
            serde_json::from_value(value).map_err(|source| DomError::FixtureParse {
                context: "document".to_string(),
                source,
            })?;
        Document::from_fixture(&fixture)
    }

    pub fn load(path: &str) -> Result<Document> {
        let content = std::fs::read_to_string(path).map_err(|source| DomError::FixtureRead {
            path: path.to_string(),
            source,
        })?;
        Document::from_json_str(&content)
    }

    /// Build a fixture subtree and append it under `parent` in one step,
    /// returning the record an observer would deliver for the insertion.
    pub fn insert_fixture(
        &mut self,
        parent: NodeId,
        value: serde_json::Value,
    ) -> Result<(NodeId, MutationRecord)> {
        let fixture: NodeFixture =
            serde_json::from_value(value).map_err(|source| DomError::FixtureParse {
                context: "node".to_string(),
                source,
            })?;
        let node = build_detached(self, &fixture)?;
        let record = self.append_child(parent, node)?;
        Ok((node, record))
    }

    /// First connected element whose `id` attribute equals `id`, searching shadow trees too.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if self.attribute(node, "id") == Some(id) {
                return Some(node);
            }
            for child in self.children(node).iter().rev() {
                stack.push(*child);
            }
            if let Some(shadow) = self.shadow_root(node) {
                stack.push(shadow);
            }
        }
        None
    }
}

/// Build a fixture subtree without attaching it anywhere.
pub fn build_detached(doc: &mut Document, fixture: &NodeFixture) -> Result<NodeId> {
    match fixture {
        NodeFixture::Text(text) => Ok(doc.create_text(text)),
        NodeFixture::Element(el) => {
            let node = doc.create_element(&el.tag);
            for (name, value) in &el.attrs {
                doc.set_attribute(node, name, value)?;
            }
            doc.set_rect(node, el.rect)?;
            for child in &el.children {
                let built = build_detached(doc, child)?;
                doc.append_child(node, built)?;
            }
            if let Some(shadow_children) = &el.shadow {
                let shadow = doc.attach_shadow(node)?;
                for child in shadow_children {
                    let built = build_detached(doc, child)?;
                    doc.append_child(shadow, built)?;
                }
            }
            Ok(node)
        }
    }
}

fn build_node(doc: &mut Document, parent: NodeId, fixture: &NodeFixture) -> Result<NodeId> {
    let node = build_detached(doc, fixture)?;
    doc.append_child(parent, node)?;
    Ok(node)
}
