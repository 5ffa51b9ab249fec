//! In-memory content tree.
//!
//! An arena of element, text and comment nodes with just enough structure
//! for structural queries: tag names, attributes, class tokens and
//! ancestor constraints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::{ContentTree, NodeId, NodeKind};

// ---------------------------------------------------------------------------
// Structural queries
// ---------------------------------------------------------------------------

/// Element predicate. Every populated field must hold for a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralQuery {
    /// Accepted tag names; empty accepts any element.
    pub tags: Vec<String>,
    pub attribute: Option<String>,
    /// Required value of `attribute`; ignored without one.
    pub attribute_value: Option<String>,
    /// Substring of the `class` attribute.
    pub class_contains: Option<String>,
    /// Tag of a required strict ancestor.
    pub within: Option<String>,
}

impl StructuralQuery {
    pub fn tags(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            ..Self::default()
        }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str) -> Self {
        self.attribute = Some(name.to_string());
        self
    }

    pub fn with_attribute_value(mut self, name: &str, value: &str) -> Self {
        self.attribute = Some(name.to_string());
        self.attribute_value = Some(value.to_string());
        self
    }

    pub fn with_class(mut self, fragment: &str) -> Self {
        self.class_contains = Some(fragment.to_string());
        self
    }

    pub fn within(mut self, tag: &str) -> Self {
        self.within = Some(tag.to_ascii_lowercase());
        self
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let node = doc.node(id);
        if node.kind != NodeKind::Element {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| t.eq_ignore_ascii_case(&node.tag)) {
            return false;
        }
        if let Some(name) = &self.attribute {
            match (node.attr(name), &self.attribute_value) {
                (None, _) => return false,
                (Some(actual), Some(expected)) if actual != expected => return false,
                _ => {}
            }
        }
        if let Some(fragment) = &self.class_contains {
            if !node.attr("class").is_some_and(|c| c.contains(fragment.as_str())) {
                return false;
            }
        }
        if let Some(tag) = &self.within {
            return node
                .parent
                .and_then(|parent| doc.closest(parent, tag))
                .is_some();
        }
        true
    }
}

/// Queries for common headline markup: headings and ARIA headings inside
/// links, titled links, and title/headline class containers.
pub fn default_queries() -> Vec<StructuralQuery> {
    vec![
        StructuralQuery::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]).within("a"),
        StructuralQuery::tags(&["a"]).with_attribute("title"),
        StructuralQuery::any()
            .with_attribute_value("role", "heading")
            .within("a"),
        StructuralQuery::any().with_class("title"),
        StructuralQuery::any().with_class("headline"),
    ]
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    mark_count: usize,
}

impl Node {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Nested JSON form of a tree, used to load documents from files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Text {
        text: String,
    },
    Comment {
        comment: String,
    },
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document whose root is a `body` element.
    pub fn new() -> Self {
        Self::with_root("body", &[])
    }

    pub fn with_root(tag: &str, attrs: &[(&str, &str)]) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId::from_raw(0),
        };
        doc.root = doc.push(None, NodeKind::Element, tag, attrs_owned(attrs), String::new());
        doc
    }

    /// Build a document from its JSON form. A top-level element becomes
    /// the root; anything else is wrapped in a `body`.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(&spec))
    }

    pub fn from_spec(spec: &NodeSpec) -> Self {
        match spec {
            NodeSpec::Element {
                tag,
                attrs,
                children,
            } => {
                let mut doc = Self::new();
                let root = doc.root;
                doc.nodes[root.index()].tag = tag.to_ascii_lowercase();
                doc.nodes[root.index()].attrs =
                    attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                for child in children {
                    doc.append_spec(root, child);
                }
                doc
            }
            other => {
                let mut doc = Self::new();
                let root = doc.root;
                doc.append_spec(root, other);
                doc
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Panics if `parent` does not belong to this document.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.push(Some(parent), NodeKind::Element, tag, attrs_owned(attrs), String::new())
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(Some(parent), NodeKind::Text, "", Vec::new(), text.to_string())
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(Some(parent), NodeKind::Comment, "", Vec::new(), text.to_string())
    }

    /// Append an element whose only child is a text node.
    pub fn append_with_text(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let id = self.append_element(parent, tag, attrs);
        self.append_text(id, text);
        id
    }

    pub fn append_spec(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        match spec {
            NodeSpec::Element {
                tag,
                attrs,
                children,
            } => {
                let attrs = attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                let id = self.push(Some(parent), NodeKind::Element, tag, attrs, String::new());
                for child in children {
                    self.append_spec(id, child);
                }
                id
            }
            NodeSpec::Text { text } => self.append_text(parent, text),
            NodeSpec::Comment { comment } => self.append_comment(parent, comment),
        }
    }

    /// Change an attribute in place. Already scanned elements are not
    /// re-evaluated when this happens.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let attrs = &mut self.nodes[node.index()].attrs;
        match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    /// Whether the visual indicator has been drawn on `node`.
    pub fn is_marked(&self, node: NodeId) -> bool {
        self.mark_count(node) > 0
    }

    /// How many times the indicator was drawn on `node`.
    pub fn mark_count(&self, node: NodeId) -> usize {
        self.nodes.get(node.index()).map_or(0, |n| n.mark_count)
    }

    /// Marked elements in document order.
    pub fn marked_elements(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root)
            .into_iter()
            .filter(|id| self.is_marked(*id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn push(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        tag: &str,
        attrs: Vec<(String, String)>,
        text: String,
    ) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len());
        self.nodes.push(Node {
            kind,
            tag: tag.to_ascii_lowercase(),
            attrs,
            text,
            parent,
            children: Vec::new(),
            mark_count: 0,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match node.kind {
            NodeKind::Text => out.push_str(&node.text),
            NodeKind::Element => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
            NodeKind::Comment => {}
        }
    }
}

fn attrs_owned(attrs: &[(&str, &str)]) -> Vec<(String, String)> {
    attrs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl ContentTree for Document {
    type Query = StructuralQuery;

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node.index()).map(|n| n.kind)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node.index())
            .filter(|n| n.kind == NodeKind::Element)
            .map(|n| n.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node.index()).and_then(|n| n.attr(name))
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if node.index() < self.nodes.len() {
            self.collect_text(node, &mut out);
        }
        out
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|n| n.parent)
    }

    fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.index()) else {
                continue;
            };
            if node.kind != NodeKind::Element {
                continue;
            }
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn query(&self, root: NodeId, queries: &[StructuralQuery]) -> Vec<NodeId> {
        self.descendant_elements(root)
            .into_iter()
            .filter(|id| queries.iter().any(|q| q.matches(self, *id)))
            .collect()
    }

    fn mark(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.mark_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_skips_comments() {
        let mut doc = Document::new();
        let root = doc.root();
        let h = doc.append_element(root, "h2", &[]);
        doc.append_text(h, "Hello ");
        doc.append_comment(h, "ignored");
        let span = doc.append_element(h, "span", &[]);
        doc.append_text(span, "world");
        assert_eq!(doc.text_content(h), "Hello world");
    }

    #[test]
    fn descendants_are_in_document_order_and_include_root() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "a", &[]);
        let b = doc.append_element(a, "b", &[]);
        doc.append_text(b, "x");
        let c = doc.append_element(root, "c", &[]);
        assert_eq!(doc.descendant_elements(root), vec![root, a, b, c]);
        assert_eq!(doc.descendant_elements(a), vec![a, b]);
    }

    #[test]
    fn heading_query_requires_link_ancestor() {
        let mut doc = Document::new();
        let root = doc.root();
        let link = doc.append_element(root, "a", &[("href", "/story")]);
        let inside = doc.append_with_text(link, "h3", &[], "Inside");
        doc.append_with_text(root, "h3", &[], "Outside");
        let query = [StructuralQuery::tags(&["h3"]).within("a")];
        assert_eq!(doc.query(root, &query), vec![inside]);
    }

    #[test]
    fn query_reports_each_element_once() {
        let mut doc = Document::new();
        let root = doc.root();
        let link = doc.append_element(root, "a", &[("title", "t"), ("class", "headline")]);
        let found = doc.query(root, &default_queries());
        assert_eq!(found, vec![link]);
    }

    #[test]
    fn attribute_value_and_class_predicates() {
        let mut doc = Document::new();
        let root = doc.root();
        let link = doc.append_element(root, "a", &[]);
        let aria = doc.append_element(link, "div", &[("role", "heading")]);
        doc.append_element(link, "div", &[("role", "button")]);
        let titled = doc.append_element(root, "span", &[("class", "card-title big")]);

        let aria_query = [StructuralQuery::any()
            .with_attribute_value("role", "heading")
            .within("a")];
        assert_eq!(doc.query(root, &aria_query), vec![aria]);

        let class_query = [StructuralQuery::any().with_class("title")];
        assert_eq!(doc.query(root, &class_query), vec![titled]);
    }

    #[test]
    fn closest_starts_at_node_itself() {
        let mut doc = Document::new();
        let root = doc.root();
        let link = doc.append_element(root, "a", &[]);
        let img = doc.append_element(link, "img", &[("alt", "x")]);
        assert_eq!(doc.closest(img, "a"), Some(link));
        assert_eq!(doc.closest(link, "a"), Some(link));
        assert_eq!(doc.closest(root, "a"), None);
    }

    #[test]
    fn loads_nested_json() {
        let json = r#"{
            "tag": "main",
            "children": [
                {"tag": "a", "attrs": {"href": "/x"}, "children": [
                    {"tag": "h2", "children": [{"text": "Top story"}]}
                ]},
                {"comment": "ad slot"},
                {"text": "trailing"}
            ]
        }"#;
        let doc = Document::from_json(json).unwrap();
        let root = doc.root();
        assert_eq!(doc.tag_name(root), Some("main"));
        assert_eq!(doc.text_content(root), "Top storytrailing");
        assert_eq!(doc.descendant_elements(root).len(), 3);
    }

    #[test]
    fn mark_counts_every_call() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "a", &[]);
        assert!(!doc.is_marked(a));
        doc.mark(a);
        assert!(doc.is_marked(a));
        assert_eq!(doc.mark_count(a), 1);
        assert_eq!(doc.marked_elements(), vec![a]);
    }
}
