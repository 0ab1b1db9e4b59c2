use std::collections::HashMap;

use crate::collect::snapshot_model::{FieldDescriptor, FormDescriptor};
use crate::dom::dom_model::NodeId;

/// Descriptor types that carry an opid.
pub trait Descriptor {
    fn opid(&self) -> &str;
}

impl Descriptor for FieldDescriptor {
    fn opid(&self) -> &str {
        &self.opid
    }
}

impl Descriptor for FormDescriptor {
    fn opid(&self) -> &str {
        &self.opid
    }
}

// ============================================================================
// Descriptor arena
// ============================================================================

/// Arena of descriptors. Slots never move; a removed element frees its slot
/// and drops its side-table entries (`node → slot`, `opid → node`).
#[derive(Debug, Clone)]
pub struct DescriptorCache<T> {
    slots: Vec<Option<(NodeId, T)>>,
    free: Vec<usize>,
    by_node: HashMap<NodeId, usize>,
    by_opid: HashMap<String, NodeId>,
}

impl<T> Default for DescriptorCache<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_node: HashMap::new(),
            by_opid: HashMap::new(),
        }
    }
}

impl<T: Descriptor> DescriptorCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.by_node.contains_key(&node)
    }

    pub fn get(&self, node: NodeId) -> Option<&T> {
        let slot = *self.by_node.get(&node)?;
        self.slots.get(slot)?.as_ref().map(|(_, d)| d)
    }

    /// Mutable access for in-place attribute updates. The opid must not be
    /// changed through this reference; re-insert instead.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        let slot = *self.by_node.get(&node)?;
        self.slots.get_mut(slot)?.as_mut().map(|(_, d)| d)
    }

    pub fn insert(&mut self, node: NodeId, descriptor: T) {
        self.remove(node);
        self.by_opid.insert(descriptor.opid().to_string(), node);
        let entry = Some((node, descriptor));
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = entry;
                slot
            }
            None => {
                self.slots.push(entry);
                self.slots.len() - 1
            }
        };
        self.by_node.insert(node, slot);
    }

    pub fn remove(&mut self, node: NodeId) -> Option<T> {
        let slot = self.by_node.remove(&node)?;
        let (_, descriptor) = self.slots.get_mut(slot)?.take()?;
        if self.by_opid.get(descriptor.opid()) == Some(&node) {
            self.by_opid.remove(descriptor.opid());
        }
        self.free.push(slot);
        Some(descriptor)
    }

    pub fn node_for_opid(&self, opid: &str) -> Option<NodeId> {
        self.by_opid.get(opid).copied()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.by_node.clear();
        self.by_opid.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref().map(|(n, d)| (*n, d)))
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.iter().map(|(n, _)| n).collect()
    }
}
