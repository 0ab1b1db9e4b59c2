use std::collections::{BTreeSet, HashSet};

use crate::dom::dom_model::NodeId;

/// Elements waiting to scroll or render into view.
///
/// The host reports an entry for each observed element as soon as observation
/// starts; that first report is skipped. Each element is announced as
/// viewable at most once.
#[derive(Debug, Clone, Default)]
pub struct IntersectionRegistry {
    observed: BTreeSet<NodeId>,
    initializing: HashSet<NodeId>,
    announced: HashSet<NodeId>,
}

impl IntersectionRegistry {
    pub fn observe(&mut self, node: NodeId) {
        if self.announced.contains(&node) {
            return;
        }
        if self.observed.insert(node) {
            self.initializing.insert(node);
        }
    }

    pub fn unobserve(&mut self, node: NodeId) {
        self.observed.remove(&node);
        self.initializing.remove(&node);
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    /// True (and cleared) when this is the initial report for `node`.
    pub fn take_initializing(&mut self, node: NodeId) -> bool {
        self.initializing.remove(&node)
    }

    /// Record the first viewable announcement; false if already announced.
    pub fn mark_announced(&mut self, node: NodeId) -> bool {
        self.unobserve(node);
        self.announced.insert(node)
    }

    pub fn observed(&self) -> Vec<NodeId> {
        self.observed.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.observed.clear();
        self.initializing.clear();
        self.announced.clear();
    }
}
