//! Tag descriptors: the per-tag behavior plugged into the tree builder, the tree passes and the
//! renderers.
use std::{fmt, sync::Arc};

use bitflags::bitflags;
use static_assertions::assert_obj_safe;

use crate::{
    escape::escape_html,
    render::{markup, HtmlContext, MarkupContext},
    tree::{Document, NodeId, NodeRef},
};

#[cfg(feature = "builtin_tags")]
pub mod builtins;
mod registry;

pub use registry::TagRegistry;

/// Names starting with this are used by pseudo-nodes and can never be registered.
pub const RESERVED_PREFIX: &str = "#";

pub const ROOT_NAME: &str = "#root";
pub const TEXT_NAME: &str = "#text";
pub const NEWLINE_NAME: &str = "#newline";
pub const ERRONEOUS_NAME: &str = "#erroneous";

/// Shared handle to a descriptor. Many nodes point at the same instance.
pub type TagRef = Arc<dyn TagDescriptor>;

bitflags! {
    /// How a tag takes part in tree construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TagFlags: u32 {
        /// No closing tag and no content. `[tag/]` is only accepted for these.
        const STANDALONE = 1 << 0;
        /// Inline rather than block level.
        const INLINE = 1 << 1;
        /// Content is tokenized. Without it the content between the open and the matching close
        /// tag is kept verbatim as the node's `content`.
        const PARSE_EMBEDDED = 1 << 2;
        /// Opening this tag closes every open inline ancestor up to the nearest block.
        const CLOSE_INLINES = 1 << 3;
        /// Opening this tag directly inside a node of the same name closes that node first.
        const SAME_TAG_CLOSES = 1 << 4;
        /// A line break closes this node.
        const NEWLINE_CLOSES = 1 << 5;
        /// A single line break right after the open tag is dropped.
        const SWALLOW_TRAILING_NEWLINE = 1 << 6;
        /// The closing tag of the parent closes this node as well.
        const WEAK_PARENT_CLOSE = 1 << 7;
    }
}

impl Default for TagFlags {
    fn default() -> Self {
        Self::PARSE_EMBEDDED | Self::INLINE
    }
}

/// The behavior of one tag (and its aliases).
///
/// Every method besides [TagDescriptor::name] has a default, so a plain inline container only
/// needs a name and an HTML renderer.
pub trait TagDescriptor: Send + Sync {
    /// Canonical name, lower case.
    fn name(&self) -> &str;

    fn aliases(&self) -> &[&str] {
        &[]
    }

    fn flags(&self) -> TagFlags {
        TagFlags::default()
    }

    /// Attributes written back out as a bare `key` when their value is empty.
    fn bare_attributes(&self) -> &[&str] {
        &[]
    }

    /// Attributes written back out as `key=""` when their value is empty. Other empty
    /// attributes are omitted.
    fn keep_empty_attributes(&self) -> &[&str] {
        &[]
    }

    /// Checks the node against its ancestors once its own children have been sanitized.
    ///
    /// `breadcrumb` runs from the root down to the parent of `node`. An invalid node is handed to
    /// [Document::reject] together with `erroneous` and `drop_erroneous`.
    fn sanitize(
        &self,
        _doc: &mut Document,
        _node: NodeId,
        _breadcrumb: &[NodeId],
        _erroneous: &TagRef,
        _drop_erroneous: bool,
    ) {
    }

    /// Runs top-down after sanitizing. Returning `true` continues into the node's children.
    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        false
    }

    fn render_html(&self, node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        let mut out = escape_html(node.content()).into_owned();
        out.push_str(children);
        out
    }

    fn render_text(&self, node: NodeRef<'_>, children: &str) -> String {
        let mut out = node.content().to_owned();
        out.push_str(children);
        out
    }

    fn render_markup(&self, node: NodeRef<'_>, children: &str, ctx: &MarkupContext) -> String {
        markup::write_node(
            node,
            self.flags(),
            self.bare_attributes(),
            self.keep_empty_attributes(),
            children,
            ctx,
        )
    }
}

assert_obj_safe!(TagDescriptor);

impl fmt::Debug for dyn TagDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagDescriptor")
            .field("name", &self.name())
            .field("flags", &self.flags())
            .finish()
    }
}

/// The document root.
#[derive(Debug, Default)]
pub struct RootTag;

impl TagDescriptor for RootTag {
    fn name(&self) -> &str {
        ROOT_NAME
    }

    fn flags(&self) -> TagFlags {
        TagFlags::PARSE_EMBEDDED
    }

    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        true
    }

    fn render_markup(&self, _node: NodeRef<'_>, children: &str, _ctx: &MarkupContext) -> String {
        children.to_owned()
    }
}

/// A run of literal text.
#[derive(Debug, Default)]
pub struct TextTag;

impl TagDescriptor for TextTag {
    fn name(&self) -> &str {
        TEXT_NAME
    }

    fn render_markup(&self, node: NodeRef<'_>, _children: &str, _ctx: &MarkupContext) -> String {
        node.content().to_owned()
    }
}

/// A line break. `content` keeps the original `\n`, `\r\n` or `\r`.
#[derive(Debug, Default)]
pub struct NewlineTag;

impl TagDescriptor for NewlineTag {
    fn name(&self) -> &str {
        NEWLINE_NAME
    }

    fn render_html(&self, _node: NodeRef<'_>, _children: &str, _ctx: &HtmlContext) -> String {
        "<br/>\n".to_owned()
    }

    fn render_text(&self, _node: NodeRef<'_>, _children: &str) -> String {
        "\n".to_owned()
    }

    fn render_markup(&self, node: NodeRef<'_>, _children: &str, _ctx: &MarkupContext) -> String {
        node.content().to_owned()
    }
}

/// Source text of a construct that failed to parse or was rejected.
///
/// With a `css_class` the HTML output is wrapped in a `<span>` so it can be flagged visually.
#[derive(Debug, Default)]
pub struct ErroneousTextTag {
    pub css_class: Option<String>,
}

impl ErroneousTextTag {
    pub fn flagged(css_class: impl Into<String>) -> Self {
        Self {
            css_class: Some(css_class.into()),
        }
    }
}

impl TagDescriptor for ErroneousTextTag {
    fn name(&self) -> &str {
        ERRONEOUS_NAME
    }

    fn render_html(&self, node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        let text = escape_html(node.content());
        match &self.css_class {
            Some(class) => format!(
                "<span class=\"{}\">{text}</span>{children}",
                html_escape::encode_double_quoted_attribute(class)
            ),
            None => format!("{text}{children}"),
        }
    }

    fn render_markup(&self, node: NodeRef<'_>, children: &str, _ctx: &MarkupContext) -> String {
        format!("{}{children}", node.content())
    }
}
