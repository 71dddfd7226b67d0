//! The syntax tree.
//!
//! Nodes live in an arena owned by [Document] and refer to each other by [NodeId]. A parent owns
//! its children through the `children` list; the `parent` index is a plain back-reference.
use std::sync::Arc;

use static_assertions::assert_impl_all;

use crate::{
    parser::Attributes,
    tags::{TagDescriptor, TagRef},
};

mod builder;
mod passes;

pub use builder::{parse, ParserConfig};
pub use passes::{post_process, sanitize};

/// Index of a node inside its [Document].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One element of the tree. Tags, text runs, line breaks and the root are all nodes; what sets
/// them apart is their descriptor.
#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub name: String,
    pub tag: TagRef,
    pub attributes: Attributes,
    /// Text payload of text and line break nodes, or the verbatim body of a tag that does not
    /// parse its content.
    pub content: String,
    pub source_open_tag: Option<String>,
    /// `Some("")` when the node was closed implicitly by its parent's closing tag.
    pub source_close_tag: Option<String>,
    /// Footnote number, filled in while post-processing.
    pub ordinal: Option<u32>,
}

impl Node {
    pub fn new(name: impl Into<String>, tag: TagRef) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            name: name.into(),
            tag,
            attributes: Attributes::new(),
            content: String::new(),
            source_open_tag: None,
            source_close_tag: None,
            ordinal: None,
        }
    }

    /// A node of `tag` named after the descriptor, carrying `content`.
    pub fn text(tag: &TagRef, content: impl Into<String>) -> Self {
        let mut node = Self::new(tag.name(), Arc::clone(tag));
        node.content = content.into();
        node
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn descriptor(&self) -> &dyn TagDescriptor {
        self.tag.as_ref()
    }
}

/// A parsed document.
///
/// Detached nodes stay in the arena until the document is dropped but are unreachable from the
/// root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    footnote_counter: u32,
}

assert_impl_all!(Document: Send, Sync);

impl Document {
    pub fn new(root_tag: TagRef) -> Self {
        let name = root_tag.name().to_owned();
        Self {
            nodes: vec![Node::new(name, root_tag)],
            root: NodeId(0),
            footnote_counter: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Depth below the root, which is at depth 0.
    pub fn depth(&self, mut id: NodeId) -> usize {
        let mut depth = 0;
        while let Some(parent) = self.parent(id) {
            depth += 1;
            id = parent;
        }
        depth
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(
            u32::try_from(self.nodes.len()).unwrap_or_else(|_| panic!("node arena overflow")),
        );
        self.nodes.push(node);
        id
    }

    pub fn append_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        node.parent = Some(parent);
        let id = self.alloc(node);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Appends a text-like node of `tag` carrying `content`.
    pub fn append_text(&mut self, parent: NodeId, tag: &TagRef, content: &str) -> NodeId {
        self.append_child(parent, Node::text(tag, content))
    }

    fn position_in_parent(&self, id: NodeId) -> (NodeId, usize) {
        let parent = self
            .parent(id)
            .unwrap_or_else(|| panic!("the root node cannot be detached"));
        let position = self
            .children(parent)
            .iter()
            .position(|&child| child == id)
            .unwrap_or_else(|| panic!("node {id:?} is not a child of its parent"));
        (parent, position)
    }

    /// Detaches `id` from the tree, dropping its whole subtree.
    ///
    /// # Panics
    /// When called on the root.
    pub fn remove_node(&mut self, id: NodeId) {
        assert!(!self.is_root(id), "the root node cannot be removed");
        let (parent, position) = self.position_in_parent(id);
        self.node_mut(parent).children.remove(position);
        self.node_mut(id).parent = None;
    }

    /// Replaces `id` with erroneous text built from its source plus its reparented children.
    ///
    /// The replacement is the open tag source, the node's own verbatim content, its children and
    /// the close tag source, in that order. Sources that were never recorded are skipped.
    ///
    /// # Panics
    /// When called on the root.
    pub fn unwrap_node(&mut self, id: NodeId, erroneous: &TagRef) {
        assert!(!self.is_root(id), "the root node cannot be unwrapped");
        let (parent, position) = self.position_in_parent(id);

        let node = self.node_mut(id);
        let open = node.source_open_tag.take().filter(|s| !s.is_empty());
        let close = node.source_close_tag.take().filter(|s| !s.is_empty());
        let content = std::mem::take(&mut node.content);
        let children = std::mem::take(&mut node.children);
        node.parent = None;

        let mut replacement = Vec::with_capacity(children.len() + 3);
        for text in [open, Some(content).filter(|s| !s.is_empty())].into_iter().flatten() {
            replacement.push(self.alloc_text(parent, erroneous, text));
        }
        for &child in &children {
            self.node_mut(child).parent = Some(parent);
        }
        replacement.extend(children);
        if let Some(close) = close {
            replacement.push(self.alloc_text(parent, erroneous, close));
        }

        self.node_mut(parent)
            .children
            .splice(position..=position, replacement);
    }

    fn alloc_text(&mut self, parent: NodeId, tag: &TagRef, text: String) -> NodeId {
        let mut node = Node::text(tag, text);
        node.parent = Some(parent);
        self.alloc(node)
    }

    /// Unwraps `id` into erroneous text, or removes it outright when `drop` is set.
    pub fn reject(&mut self, id: NodeId, erroneous: &TagRef, drop: bool) {
        if drop {
            self.remove_node(id);
        } else {
            self.unwrap_node(id, erroneous);
        }
    }

    /// The node's own content followed by the raw content of its children, recursively.
    pub fn raw_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_raw_content(id, &mut out);
        out
    }

    fn collect_raw_content(&self, id: NodeId, out: &mut String) {
        out.push_str(&self.node(id).content);
        for &child in self.children(id) {
            self.collect_raw_content(child, out);
        }
    }

    /// Hands out the next footnote number of this document, starting at 1.
    pub fn next_footnote_number(&mut self) -> u32 {
        self.footnote_counter += 1;
        self.footnote_counter
    }

    /// Pre-order walk over the nodes reachable from the root, root included.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![self.root],
        }
    }

    /// Every reachable node named `name`, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants()
            .filter(move |&id| self.node(id).name == name)
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Read-only view of a node, handed to renderers.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn node(&self) -> &'a Node {
        self.doc.node(self.id)
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    pub fn attributes(&self) -> &'a Attributes {
        &self.node().attributes
    }

    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.node().attributes.get(key).map(String::as_str)
    }

    /// The `[tag=value]` value if present, otherwise the `fallback` attribute.
    pub fn primary_value(&self, fallback: &str) -> Option<&'a str> {
        self.attr(self.name()).or_else(|| self.attr(fallback))
    }

    pub fn content(&self) -> &'a str {
        &self.node().content
    }

    pub fn raw_content(&self) -> String {
        self.doc.raw_content(self.id)
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id).iter().map(move |&id| doc.get(id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.doc.parent(self.id).map(|id| self.doc.get(id))
    }

    pub fn ordinal(&self) -> Option<u32> {
        self.node().ordinal
    }

    pub fn source_open_tag(&self) -> Option<&'a str> {
        self.node().source_open_tag.as_deref()
    }

    pub fn source_close_tag(&self) -> Option<&'a str> {
        self.node().source_close_tag.as_deref()
    }

    /// Whether the node was closed by an explicit closing tag.
    pub fn has_close_tag(&self) -> bool {
        self.source_close_tag().is_some_and(|s| !s.is_empty())
    }
}
