//! Per-element evaluation and marking state.

use std::collections::HashMap;

use crate::tree::NodeId;

/// Elements seen by the scanner. An entry exists once an element has been
/// evaluated; its value is `true` once the element is marked. Entries are
/// never removed and a `true` never reverts.
#[derive(Debug, Default, Clone)]
pub struct FlagState {
    entries: HashMap<NodeId, bool>,
}

impl FlagState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_marked(&self, node: NodeId) -> bool {
        self.entries.get(&node).copied().unwrap_or(false)
    }

    /// Whether `node` was evaluated (marked or found clean).
    pub fn is_evaluated(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    /// Record `node` as marked. Returns `true` only on the first call for a
    /// given node, which makes this the check-and-set used before drawing.
    pub fn set_marked(&mut self, node: NodeId) -> bool {
        let marked = self.entries.entry(node).or_insert(false);
        !std::mem::replace(marked, true)
    }

    /// Record that `node` has been looked at. Returns `true` on first sight.
    /// Leaves an existing mark untouched.
    pub fn set_evaluated(&mut self, node: NodeId) -> bool {
        if self.entries.contains_key(&node) {
            return false;
        }
        self.entries.insert(node, false);
        true
    }

    pub fn marked_count(&self) -> usize {
        self.entries.values().filter(|marked| **marked).count()
    }

    pub fn evaluated_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marked elements, in no particular order.
    pub fn marked(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries
            .iter()
            .filter(|(_, marked)| **marked)
            .map(|(node, _)| *node)
    }
}
