//! Render tree implementation for the Quokka renderer.
//!
//! This crate provides an arena-based tree of elements and text runs modeled
//! on the [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships.
//! Children are owned ordered lists of ids; the parent link is a plain id, so
//! there are no reference cycles and ancestor walks stay O(1) per step.

use std::collections::HashMap;

use serde::Serialize;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the render tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// Ids are assigned in creation order and never reused, so they stay stable
/// for the lifetime of the tree and can key side tables (computed styles,
/// layout boxes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct RenderNode {
    /// "Each node has an associated node type"
    pub kind: NodeKind,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,
}

/// The closed set of node kinds a render tree holds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// A raw, uncollapsed text run.
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data: tag name, attributes and the parsed class list.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name", lowercased by the parser.
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
    /// Tokens of the `class` attribute, in source order, without duplicates.
    pub classes: Vec<String>,
}

impl ElementData {
    /// Create element data, deriving the class list from the `class` attribute.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, attrs: AttributesMap) -> Self {
        let classes = attrs
            .get("class")
            .map(|value| split_class_list(value))
            .unwrap_or_default();
        Self {
            tag_name: tag_name.into(),
            attrs,
            classes,
        }
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }

    /// Returns an attribute value by (lowercase) name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the class list contains `class_name` (case-sensitive).
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.iter().any(|c| c == class_name)
    }

    /// Set an attribute, keeping the class list in sync.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if name == "class" {
            self.classes = split_class_list(&value);
        }
        let _ = self.attrs.insert(name, value);
    }
}

/// [§ 2.7.3 Space-separated tokens](https://html.spec.whatwg.org/multipage/common-microsyntaxes.html#space-separated-tokens)
///
/// "A set of space-separated tokens is a string containing zero or more words
/// separated by one or more ASCII whitespace, where words consist of any string
/// of one or more characters, none of which are ASCII whitespace."
fn split_class_list(value: &str) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for token in value.split_ascii_whitespace() {
        if !classes.iter().any(|c| c == token) {
            classes.push(token.to_string());
        }
    }
    classes
}

/// Arena-based render tree with O(1) node access and traversal.
///
/// The Document node is always at index 0 ([`NodeId::ROOT`]).
#[derive(Debug, Clone)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![RenderNode {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree (including the Document).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node id in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(RenderNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Appends `child` as the last child of `parent`. A node that already has
    /// a parent, or an append that would create a cycle, is ignored so the
    /// tree stays acyclic with exactly one parent per node.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child
            || child == NodeId::ROOT
            || parent.0 >= self.nodes.len()
            || child.0 >= self.nodes.len()
            || self.nodes[child.0].parent.is_some()
            || self.is_descendant_of(parent, child)
        {
            return;
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Allocate an element and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let id = self.alloc(NodeKind::Element(ElementData::new(tag_name, attrs)));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text run and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over `id` and all its descendants in tree (pre-)order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: vec![id],
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get the text content if this node is a text run.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// Get the tag name if this node is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#dom-document-documentelement)
    ///
    /// "The documentElement getter steps are to return this's document element."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#dom-document-body)
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| self.tag_name(id) == Some("body"))
    }

    /// Find the first element (in tree order) with the given id attribute.
    #[must_use]
    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .find(|&id| self.as_element(id).and_then(ElementData::id) == Some(element_id))
    }

    /// Find all elements (in tree order) with the given tag name.
    #[must_use]
    pub fn elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .filter(|&id| self.tag_name(id) == Some(tag_name))
            .collect()
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Concatenation of every descendant text run, in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| self.as_text(node))
            .collect()
    }
}

/// Iterator over ancestors of a node (parent, grandparent, ...).
pub struct AncestorIterator<'a> {
    tree: &'a RenderTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a RenderTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_builds_parent_links() {
        let mut tree = RenderTree::new();
        let html = tree.append_element(NodeId::ROOT, "html", &[]);
        let body = tree.append_element(html, "body", &[]);
        let text = tree.append_text(body, "hi");

        assert_eq!(tree.parent(text), Some(body));
        assert_eq!(tree.children(html), &[body]);
        assert_eq!(tree.document_element(), Some(html));
        assert_eq!(tree.body(), Some(body));
        let ancestors: Vec<NodeId> = tree.ancestors(text).collect();
        assert_eq!(ancestors, vec![body, html, NodeId::ROOT]);
    }

    #[test]
    fn test_append_rejects_cycles_and_reparenting() {
        let mut tree = RenderTree::new();
        let a = tree.append_element(NodeId::ROOT, "div", &[]);
        let b = tree.append_element(a, "div", &[]);

        tree.append_child(b, a);
        assert_eq!(tree.parent(a), Some(NodeId::ROOT));
        assert!(tree.children(b).is_empty());

        let c = tree.append_element(NodeId::ROOT, "p", &[]);
        tree.append_child(b, c);
        assert_eq!(tree.parent(c), Some(NodeId::ROOT));
    }

    #[test]
    fn test_class_list_is_parsed_once() {
        let mut tree = RenderTree::new();
        let div = tree.append_element(NodeId::ROOT, "div", &[("class", " a  b\ta ")]);
        let element = tree.as_element(div).unwrap();
        assert_eq!(element.classes, vec!["a".to_string(), "b".to_string()]);
        assert!(element.has_class("b"));
        assert!(!element.has_class("c"));

        tree.as_element_mut(div).unwrap().set_attr("class", "c");
        assert!(tree.as_element(div).unwrap().has_class("c"));
    }

    #[test]
    fn test_descendants_are_preorder() {
        let mut tree = RenderTree::new();
        let a = tree.append_element(NodeId::ROOT, "a", &[]);
        let b = tree.append_element(a, "b", &[]);
        let c = tree.append_element(a, "c", &[]);
        let d = tree.append_element(b, "d", &[]);
        let order: Vec<NodeId> = tree.descendants(a).collect();
        assert_eq!(order, vec![a, b, d, c]);
        assert_eq!(tree.elements_by_tag_name("d"), vec![d]);
    }

    #[test]
    fn test_text_content_concatenates_runs() {
        let mut tree = RenderTree::new();
        let p = tree.append_element(NodeId::ROOT, "p", &[("id", "x")]);
        let _ = tree.append_text(p, "Hello ");
        let em = tree.append_element(p, "em", &[]);
        let _ = tree.append_text(em, "world");
        assert_eq!(tree.text_content(p), "Hello world");
        assert_eq!(tree.element_by_id("x"), Some(p));
    }
}
