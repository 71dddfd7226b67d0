//! Writing nodes back out as tag markup.
use crate::{
    escape::escape_attrvalue,
    tags::TagFlags,
    tree::NodeRef,
};

use super::MarkupContext;

/// Writes the open tag of `node`.
///
/// The attribute named after the tag comes first, as `[tag=value]` when the context allows it.
/// Empty values are dropped unless the attribute is listed in `bare` (written as a bare key) or
/// `keep_empty` (written as `key=""`).
pub fn open_tag(node: NodeRef<'_>, bare: &[&str], keep_empty: &[&str], ctx: &MarkupContext) -> String {
    let name = node.name();
    let mut out = String::new();
    out.push(ctx.open);
    out.push_str(name);

    let attributes = node.attributes();
    if let Some(value) = attributes.get(name) {
        if ctx.allow_tagvalue_shortcut {
            out.push('=');
            out.push_str(&escape_attrvalue(value));
        } else {
            write_attribute(&mut out, name, value, bare, keep_empty);
        }
    }

    for (key, value) in attributes.iter().filter(|(key, _)| key.as_str() != name) {
        write_attribute(&mut out, key, value, bare, keep_empty);
    }

    out.push(ctx.close);
    out
}

fn write_attribute(out: &mut String, key: &str, value: &str, bare: &[&str], keep_empty: &[&str]) {
    if value.is_empty() {
        if bare.contains(&key) {
            out.push(' ');
            out.push_str(key);
        } else if keep_empty.contains(&key) {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"\"");
        }
        return;
    }

    out.push(' ');
    out.push_str(key);
    out.push('=');
    out.push_str(&escape_attrvalue(value));
}

pub fn close_tag(name: &str, ctx: &MarkupContext) -> String {
    format!("{}/{name}{}", ctx.open, ctx.close)
}

/// The default markup for a node: open tag, verbatim content, children, and the closing tag if
/// the source had one.
pub fn write_node(
    node: NodeRef<'_>,
    flags: TagFlags,
    bare: &[&str],
    keep_empty: &[&str],
    children: &str,
    ctx: &MarkupContext,
) -> String {
    let mut out = open_tag(node, bare, keep_empty, ctx);
    // The parser drops one line break after these, so write one back to keep line breaks stable.
    if flags.contains(TagFlags::SWALLOW_TRAILING_NEWLINE) {
        out.push('\n');
    }
    out.push_str(node.content());
    out.push_str(children);
    if node.has_close_tag() && !flags.contains(TagFlags::STANDALONE) {
        out.push_str(&close_tag(node.name(), ctx));
    }
    out
}
