use crate::dom::dom_model::{Document, NodeId};

// ============================================================================
// DomQuery trait
// ============================================================================

pub type NodeFilter<'a> = &'a dyn Fn(&Document, NodeId) -> bool;

/// Finds elements under a root. Implementations decide whether shadow trees
/// are entered; `force_deep` asks for traversal even when the page has not been
/// seen to contain shadow roots.
pub trait DomQuery {
    fn query_all(&self, doc: &Document, root: NodeId, filter: NodeFilter, force_deep: bool) -> Vec<NodeId>;

    /// Re-scan the page for shadow roots; returns the updated flag.
    fn check_page_contains_shadow_dom(&mut self, doc: &Document) -> bool;

    fn page_contains_shadow_dom(&self) -> bool;
}

// ============================================================================
// Tree walker
// ============================================================================

/// Pre-order walk in document order. Once shadow roots are known to exist the
/// walk descends into each host's shadow tree before its light children.
#[derive(Debug, Clone, Default)]
pub struct TreeWalkerQuery {
    contains_shadow_dom: bool,
}

impl TreeWalkerQuery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomQuery for TreeWalkerQuery {
    fn query_all(&self, doc: &Document, root: NodeId, filter: NodeFilter, force_deep: bool) -> Vec<NodeId> {
        let deep = force_deep || self.contains_shadow_dom;
        let mut matches = Vec::new();
        let mut stack: Vec<NodeId> = doc.children(root).iter().rev().copied().collect();
        if deep {
            if let Some(shadow) = doc.shadow_root(root) {
                stack.push(shadow);
            }
        }

        while let Some(node) = stack.pop() {
            if doc.is_element(node) && filter(doc, node) {
                matches.push(node);
            }
            stack.extend(doc.children(node).iter().rev().copied());
            if deep {
                if let Some(shadow) = doc.shadow_root(node) {
                    stack.push(shadow);
                }
            }
        }
        matches
    }

    fn check_page_contains_shadow_dom(&mut self, doc: &Document) -> bool {
        let root = doc.root();
        self.contains_shadow_dom = doc
            .descendants(root)
            .into_iter()
            .any(|n| doc.shadow_root(n).is_some());
        self.contains_shadow_dom
    }

    fn page_contains_shadow_dom(&self) -> bool {
        self.contains_shadow_dom
    }
}
