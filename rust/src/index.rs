//! Activity id interning for the graph arena.
//!
//! The dependency graph stores nodes in a `Vec` and refers to them by dense
//! integer ids; string ids are only used at the API boundary.

use rustc_hash::FxHashMap;

/// Position of a node in the graph arena.
pub type NodeId = u32;

/// Bidirectional map between activity id strings and arena positions.
///
/// Ids are handed out in insertion order, which is also the order every
/// graph traversal visits nodes in.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    to_node: FxHashMap<String, NodeId>,
    to_id: Vec<String>,
}

impl ActivityIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_node: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            to_id: Vec::with_capacity(capacity),
        }
    }

    /// Register an activity id, returning its node and whether it was new.
    pub fn insert(&mut self, activity_id: &str) -> (NodeId, bool) {
        if let Some(&node) = self.to_node.get(activity_id) {
            return (node, false);
        }
        let node = self.to_id.len() as NodeId;
        self.to_id.push(activity_id.to_string());
        self.to_node.insert(activity_id.to_string(), node);
        (node, true)
    }

    #[inline]
    pub fn get(&self, activity_id: &str) -> Option<NodeId> {
        self.to_node.get(activity_id).copied()
    }

    #[inline]
    pub fn resolve(&self, node: NodeId) -> Option<&str> {
        self.to_id.get(node as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }
}
