//! Built-in implementations of common BBCode tags.
//!
//! Between them they use every [TagFlags] capability. Anything more exotic is expected to be
//! supplied by the embedding application through its own [TagDescriptor]s.
use std::sync::Arc;

use log::debug;

use crate::{
    escape::{escape_html, escape_html_attr, sanitize_url},
    render::HtmlContext,
    tree::{Document, NodeId, NodeRef},
};

use super::{TagDescriptor, TagFlags, TagRef, NEWLINE_NAME, TEXT_NAME};

const BLOCK: TagFlags = TagFlags::PARSE_EMBEDDED.union(TagFlags::CLOSE_INLINES);
const BLOCK_CONTAINER: TagFlags = BLOCK.union(TagFlags::SWALLOW_TRAILING_NEWLINE);

macro_rules! simple_tag {
    ($doc:expr, $name:ident, $tag:literal, [$($alias:literal),*], $flags:expr, $open:literal, $close:literal) => {
        #[derive(Copy, Clone, Debug, Default)]
        #[doc = $doc]
        #[doc = ""]
        #[doc = concat!("Renders as `", $open, "contents", $close, "`.")]
        pub struct $name;

        impl TagDescriptor for $name {
            fn name(&self) -> &str {
                $tag
            }

            fn aliases(&self) -> &[&str] {
                &[$($alias),*]
            }

            fn flags(&self) -> TagFlags {
                $flags
            }

            fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
                true
            }

            fn render_html(&self, _node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
                format!(concat!($open, "{}", $close), children)
            }
        }
    };
}

simple_tag! {
    "Bold text.",
    BoldTag, "b", ["bold"], TagFlags::default(), "<strong>", "</strong>"
}
simple_tag! {
    "Italic text.",
    ItalicTag, "i", ["italic"], TagFlags::default(), "<em>", "</em>"
}
simple_tag! {
    "Underlined text.",
    UnderlineTag, "u", ["underline"], TagFlags::default(), "<u>", "</u>"
}
simple_tag! {
    "Struck-through text.",
    StrikeTag, "s", ["strike"], TagFlags::default(), "<del>", "</del>"
}
simple_tag! {
    "Subscript.",
    SubscriptTag, "sub", [], TagFlags::default(), "<sub>", "</sub>"
}
simple_tag! {
    "Superscript.",
    SuperscriptTag, "sup", [], TagFlags::default(), "<sup>", "</sup>"
}
simple_tag! {
    "Top level heading, ended by a line break if not closed explicitly.",
    Header1Tag, "h1", [], BLOCK.union(TagFlags::NEWLINE_CLOSES), "<h1>", "</h1>"
}
simple_tag! {
    "Second level heading, ended by a line break if not closed explicitly.",
    Header2Tag, "h2", [], BLOCK.union(TagFlags::NEWLINE_CLOSES), "<h2>", "</h2>"
}
simple_tag! {
    "Third level heading, ended by a line break if not closed explicitly.",
    Header3Tag, "h3", [], BLOCK.union(TagFlags::NEWLINE_CLOSES), "<h3>", "</h3>"
}

/// Whether the parent of the node being sanitized is one of `names` (canonical names).
fn parent_is(doc: &Document, breadcrumb: &[NodeId], names: &[&str]) -> bool {
    breadcrumb
        .last()
        .is_some_and(|&parent| names.contains(&doc.node(parent).tag.name()))
}

fn is_blank(doc: &Document, id: NodeId) -> bool {
    let node = doc.node(id);
    node.name == NEWLINE_NAME || (node.name == TEXT_NAME && node.content.trim().is_empty())
}

/// Drops line breaks and whitespace-only text sitting directly inside a structural container.
fn strip_blank_children(doc: &mut Document, id: NodeId) {
    let blank: Vec<NodeId> = {
        let doc: &Document = doc;
        doc.children(id)
            .iter()
            .copied()
            .filter(|&child| is_blank(doc, child))
            .collect()
    };
    for child in blank {
        doc.remove_node(child);
    }
}

/// Drops line breaks trailing the last real content of an item.
fn strip_trailing_newlines(doc: &mut Document, id: NodeId) {
    while let Some(&last) = doc.children(id).last() {
        if doc.node(last).name != NEWLINE_NAME {
            break;
        }
        doc.remove_node(last);
    }
}

fn reject(
    doc: &mut Document,
    node: NodeId,
    expected_parent: &str,
    erroneous: &TagRef,
    drop_erroneous: bool,
) {
    debug!(
        "`{}` outside of `{expected_parent}`, rejecting",
        doc.node(node).name
    );
    doc.reject(node, erroneous, drop_erroneous);
}

/// Verbatim code block: `[code]`, `[code=rust]` or `[code lang=rust]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct CodeTag;

impl TagDescriptor for CodeTag {
    fn name(&self) -> &str {
        "code"
    }

    fn flags(&self) -> TagFlags {
        TagFlags::CLOSE_INLINES | TagFlags::SWALLOW_TRAILING_NEWLINE
    }

    fn render_html(&self, node: NodeRef<'_>, _children: &str, _ctx: &HtmlContext) -> String {
        let code = escape_html(node.content());
        match node.primary_value("lang").filter(|lang| !lang.is_empty()) {
            Some(lang) => format!(
                "<pre><code class=\"language-{}\">{code}</code></pre>",
                escape_html_attr(lang)
            ),
            None => format!("<pre><code>{code}</code></pre>"),
        }
    }
}

/// Inline text that is not parsed for tags.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParseTag;

impl TagDescriptor for NoParseTag {
    fn name(&self) -> &str {
        "noparse"
    }

    fn flags(&self) -> TagFlags {
        TagFlags::INLINE
    }
}

/// Block quote with an optional author: `[quote=Someone]` or `[quote author=Someone]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct QuoteTag;

impl TagDescriptor for QuoteTag {
    fn name(&self) -> &str {
        "quote"
    }

    fn flags(&self) -> TagFlags {
        BLOCK_CONTAINER
    }

    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        true
    }

    fn render_html(&self, node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        match node.primary_value("author").filter(|author| !author.is_empty()) {
            Some(author) => format!(
                "<blockquote><cite>{}</cite>{children}</blockquote>",
                escape_html(author)
            ),
            None => format!("<blockquote>{children}</blockquote>"),
        }
    }
}

/// Hyperlink: `[url]https://…[/url]` or `[url=https://…]text[/url]`.
///
/// Links whose target fails [sanitize_url] render as their bare text.
#[derive(Copy, Clone, Debug, Default)]
pub struct UrlTag;

impl TagDescriptor for UrlTag {
    fn name(&self) -> &str {
        "url"
    }

    fn aliases(&self) -> &[&str] {
        &["link"]
    }

    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        true
    }

    fn render_html(&self, node: NodeRef<'_>, children: &str, ctx: &HtmlContext) -> String {
        let target = match node.primary_value("href") {
            Some(href) => sanitize_url(href),
            None => sanitize_url(&node.raw_content()),
        };

        let Some(target) = target else {
            return children.to_owned();
        };

        let rel = if ctx.force_rel_nofollow {
            " rel=\"nofollow\""
        } else {
            ""
        };
        format!("<a href=\"{}\"{rel}>{children}</a>", escape_html_attr(&target))
    }
}

/// Inline image, the source being the verbatim content: `[img alt="…"]https://…[/img]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageTag;

impl TagDescriptor for ImageTag {
    fn name(&self) -> &str {
        "img"
    }

    fn flags(&self) -> TagFlags {
        TagFlags::INLINE
    }

    fn keep_empty_attributes(&self) -> &[&str] {
        &["alt"]
    }

    fn render_html(&self, node: NodeRef<'_>, _children: &str, _ctx: &HtmlContext) -> String {
        match sanitize_url(node.content()) {
            Some(src) => format!(
                "<img src=\"{}\" alt=\"{}\"/>",
                escape_html_attr(&src),
                escape_html_attr(node.attr("alt").unwrap_or_default())
            ),
            None => escape_html(node.content()).into_owned(),
        }
    }

    fn render_text(&self, node: NodeRef<'_>, _children: &str) -> String {
        node.attr("alt").unwrap_or_default().to_owned()
    }
}

/// Horizontal rule.
#[derive(Copy, Clone, Debug, Default)]
pub struct HorizontalRuleTag;

impl TagDescriptor for HorizontalRuleTag {
    fn name(&self) -> &str {
        "hr"
    }

    fn flags(&self) -> TagFlags {
        TagFlags::STANDALONE | TagFlags::CLOSE_INLINES | TagFlags::SWALLOW_TRAILING_NEWLINE
    }

    fn render_html(&self, _node: NodeRef<'_>, _children: &str, _ctx: &HtmlContext) -> String {
        "<hr/>".to_owned()
    }

    fn render_text(&self, _node: NodeRef<'_>, _children: &str) -> String {
        "\n".to_owned()
    }
}

/// Explicit line break.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinebreakTag;

impl TagDescriptor for LinebreakTag {
    fn name(&self) -> &str {
        "br"
    }

    fn flags(&self) -> TagFlags {
        TagFlags::STANDALONE | TagFlags::INLINE
    }

    fn render_html(&self, _node: NodeRef<'_>, _children: &str, _ctx: &HtmlContext) -> String {
        "<br/>".to_owned()
    }

    fn render_text(&self, _node: NodeRef<'_>, _children: &str) -> String {
        "\n".to_owned()
    }
}

/// Bulleted list, or numbered with `[list=1]`, `[list=a]`, `[list=i]` and upper-case variants.
#[derive(Copy, Clone, Debug, Default)]
pub struct ListTag;

impl TagDescriptor for ListTag {
    fn name(&self) -> &str {
        "list"
    }

    fn flags(&self) -> TagFlags {
        BLOCK_CONTAINER
    }

    fn sanitize(
        &self,
        doc: &mut Document,
        node: NodeId,
        _breadcrumb: &[NodeId],
        _erroneous: &TagRef,
        _drop_erroneous: bool,
    ) {
        strip_blank_children(doc, node);
    }

    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        true
    }

    fn render_html(&self, node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        match node.primary_value("type") {
            Some(kind @ ("1" | "a" | "A" | "i" | "I")) => {
                format!("<ol type=\"{kind}\">{children}</ol>")
            }
            _ => format!("<ul>{children}</ul>"),
        }
    }
}

/// List item, implicitly closed by the next `[*]` or by the closing `[/list]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ListItemTag;

impl TagDescriptor for ListItemTag {
    fn name(&self) -> &str {
        "*"
    }

    fn aliases(&self) -> &[&str] {
        &["li"]
    }

    fn flags(&self) -> TagFlags {
        BLOCK | TagFlags::SAME_TAG_CLOSES | TagFlags::WEAK_PARENT_CLOSE
    }

    fn sanitize(
        &self,
        doc: &mut Document,
        node: NodeId,
        breadcrumb: &[NodeId],
        erroneous: &TagRef,
        drop_erroneous: bool,
    ) {
        if !parent_is(doc, breadcrumb, &["list"]) {
            reject(doc, node, "list", erroneous, drop_erroneous);
            return;
        }
        strip_trailing_newlines(doc, node);
    }

    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        true
    }

    fn render_html(&self, _node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        format!("<li>{children}</li>")
    }

    fn render_text(&self, _node: NodeRef<'_>, children: &str) -> String {
        format!("* {children}\n")
    }
}

/// Task list container.
#[derive(Copy, Clone, Debug, Default)]
pub struct TaskListTag;

impl TagDescriptor for TaskListTag {
    fn name(&self) -> &str {
        "tasks"
    }

    fn flags(&self) -> TagFlags {
        BLOCK_CONTAINER
    }

    fn sanitize(
        &self,
        doc: &mut Document,
        node: NodeId,
        _breadcrumb: &[NodeId],
        _erroneous: &TagRef,
        _drop_erroneous: bool,
    ) {
        strip_blank_children(doc, node);
    }

    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        true
    }

    fn render_html(&self, _node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        format!("<ul class=\"tasks\">{children}</ul>")
    }
}

/// Task item, `[task done]` when ticked. Usually left unclosed: the next `[task]` or the closing
/// `[/tasks]` ends it.
#[derive(Copy, Clone, Debug, Default)]
pub struct TaskTag;

impl TagDescriptor for TaskTag {
    fn name(&self) -> &str {
        "task"
    }

    fn flags(&self) -> TagFlags {
        BLOCK | TagFlags::SAME_TAG_CLOSES | TagFlags::WEAK_PARENT_CLOSE
    }

    fn bare_attributes(&self) -> &[&str] {
        &["done"]
    }

    fn sanitize(
        &self,
        doc: &mut Document,
        node: NodeId,
        breadcrumb: &[NodeId],
        erroneous: &TagRef,
        drop_erroneous: bool,
    ) {
        if !parent_is(doc, breadcrumb, &["tasks"]) {
            reject(doc, node, "tasks", erroneous, drop_erroneous);
            return;
        }
        strip_trailing_newlines(doc, node);
    }

    fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
        true
    }

    fn render_html(&self, node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        let checked = if node.attr("done").is_some() {
            " checked"
        } else {
            ""
        };
        format!("<li class=\"task\"><input type=\"checkbox\" disabled{checked}/>{children}</li>")
    }

    fn render_text(&self, node: NodeRef<'_>, children: &str) -> String {
        let mark = if node.attr("done").is_some() { 'x' } else { ' ' };
        format!("[{mark}] {children}\n")
    }
}

macro_rules! table_tag {
    ($doc:expr, $name:ident, $tag:literal, $flags:expr, $parent:expr, $html:literal, $text_sep:literal) => {
        #[derive(Copy, Clone, Debug, Default)]
        #[doc = $doc]
        pub struct $name;

        impl TagDescriptor for $name {
            fn name(&self) -> &str {
                $tag
            }

            fn flags(&self) -> TagFlags {
                $flags
            }

            fn sanitize(
                &self,
                doc: &mut Document,
                node: NodeId,
                breadcrumb: &[NodeId],
                erroneous: &TagRef,
                drop_erroneous: bool,
            ) {
                let parents: &[&str] = $parent;
                if !parents.is_empty() && !parent_is(doc, breadcrumb, parents) {
                    reject(doc, node, parents[0], erroneous, drop_erroneous);
                    return;
                }
                if $tag == "table" || $tag == "tr" {
                    strip_blank_children(doc, node);
                }
            }

            fn post_process(&self, _doc: &mut Document, _node: NodeId) -> bool {
                true
            }

            fn render_html(&self, _node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
                format!(concat!("<", $html, ">{}</", $html, ">"), children)
            }

            fn render_text(&self, _node: NodeRef<'_>, children: &str) -> String {
                format!(concat!("{}", $text_sep), children)
            }
        }
    };
}

table_tag! { "Table.", TableTag, "table", BLOCK_CONTAINER, &[], "table", "" }
table_tag! {
    "Table row, only valid directly inside `[table]`.",
    TableRowTag, "tr", BLOCK_CONTAINER, &["table"], "tr", "\n"
}
table_tag! {
    "Table cell, only valid directly inside `[tr]`.",
    TableCellTag, "td", BLOCK, &["tr"], "td", "\t"
}
table_tag! {
    "Table header cell, only valid directly inside `[tr]`.",
    TableHeaderTag, "th", BLOCK, &["tr"], "th", "\t"
}

/// Inline footnote, numbered in document order.
#[derive(Copy, Clone, Debug, Default)]
pub struct FootnoteTag;

impl TagDescriptor for FootnoteTag {
    fn name(&self) -> &str {
        "footnote"
    }

    fn aliases(&self) -> &[&str] {
        &["fn"]
    }

    fn post_process(&self, doc: &mut Document, node: NodeId) -> bool {
        if doc.node(node).ordinal.is_none() {
            let number = doc.next_footnote_number();
            doc.node_mut(node).ordinal = Some(number);
        }
        true
    }

    fn render_html(&self, node: NodeRef<'_>, children: &str, _ctx: &HtmlContext) -> String {
        let number = node.ordinal().unwrap_or_default();
        format!(
            "<span class=\"footnote\" id=\"fn-{number}\"><sup>{number}</sup> {children}</span>"
        )
    }

    fn render_text(&self, node: NodeRef<'_>, children: &str) -> String {
        format!("[{}] {children}", node.ordinal().unwrap_or_default())
    }
}

macro_rules! tag_list {
    ($($tag:ident),* $(,)?) => {
        {
            let v: Vec<TagRef> = vec![
                $(
                    Arc::new($tag),
                )*
            ];

            v
        }
    };
}

/// Every built-in tag.
pub fn default_tags() -> Vec<TagRef> {
    tag_list! {
        BoldTag,
        ItalicTag,
        UnderlineTag,
        StrikeTag,
        SubscriptTag,
        SuperscriptTag,
        Header1Tag,
        Header2Tag,
        Header3Tag,
        CodeTag,
        NoParseTag,
        QuoteTag,
        UrlTag,
        ImageTag,
        HorizontalRuleTag,
        LinebreakTag,
        ListTag,
        ListItemTag,
        TaskListTag,
        TaskTag,
        TableTag,
        TableRowTag,
        TableCellTag,
        TableHeaderTag,
        FootnoteTag,
    }
}
