//! Host tree capabilities consumed by the scanner.
//!
//! The scanner never touches a concrete tree. A host implements
//! [`ContentTree`] for whatever it renders into; [`crate::Document`] is the
//! in-memory implementation used by the CLI and the tests.

use serde::Serialize;

/// Opaque handle to a node in a [`ContentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

pub trait ContentTree {
    /// Structural query understood by this tree. Opaque to the scanner.
    type Query;

    /// `None` when the handle does not belong to the tree (e.g. removed).
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Lowercase tag name; `None` for non-element nodes.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Concatenated text of every descendant text node.
    fn text_content(&self, node: NodeId) -> String;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Elements under `root`, `root` included, in document order.
    fn descendant_elements(&self, root: NodeId) -> Vec<NodeId>;

    /// Elements under `root` matching any of `queries`, in document order,
    /// each reported once.
    fn query(&self, root: NodeId, queries: &[Self::Query]) -> Vec<NodeId>;

    /// Draw the visual indicator on `node`.
    fn mark(&mut self, node: NodeId);

    /// Nearest element with tag `tag`, starting from `node` itself.
    fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self
                .tag_name(id)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.node_kind(node) == Some(NodeKind::Element)
    }
}
