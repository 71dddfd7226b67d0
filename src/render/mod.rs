//! Renderers. Each is a fold over the tree: children first, then the node's descriptor wraps the
//! concatenated output of its children. The renderers themselves never look at tag names.
use crate::tree::{Document, NodeId, NodeRef};

pub mod markup;

/// Settings threaded through HTML rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlContext {
    /// Add `rel="nofollow"` to rendered links.
    pub force_rel_nofollow: bool,
}

impl Default for HtmlContext {
    fn default() -> Self {
        Self {
            force_rel_nofollow: true,
        }
    }
}

/// Settings for writing a tree back out as markup. The delimiters have to match the ones the
/// document is going to be parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupContext {
    pub open: char,
    pub close: char,
    /// Write a tag's own-name attribute as `[tag=value]`.
    pub allow_tagvalue_shortcut: bool,
}

impl Default for MarkupContext {
    fn default() -> Self {
        Self {
            open: '[',
            close: ']',
            allow_tagvalue_shortcut: true,
        }
    }
}

fn fold(doc: &Document, id: NodeId, render: &dyn Fn(NodeRef<'_>, &str) -> String) -> String {
    let mut children = String::new();
    for &child in doc.children(id) {
        children.push_str(&fold(doc, child, render));
    }
    render(doc.get(id), &children)
}

pub fn render_html(doc: &Document, ctx: &HtmlContext) -> String {
    fold(doc, doc.root(), &|node: NodeRef<'_>, children: &str| {
        node.node().tag.render_html(node, children, ctx)
    })
}

pub fn render_text(doc: &Document) -> String {
    fold(doc, doc.root(), &|node: NodeRef<'_>, children: &str| {
        node.node().tag.render_text(node, children)
    })
}

pub fn render_markup(doc: &Document, ctx: &MarkupContext) -> String {
    fold(doc, doc.root(), &|node: NodeRef<'_>, children: &str| {
        node.node().tag.render_markup(node, children, ctx)
    })
}

#[cfg(test)]
mod tests;
