#![cfg(feature = "builtin_tags")]

use std::sync::Arc;

use rstest::rstest;

use crate::{
    parse,
    tags::{ErroneousTextTag, TagRegistry},
    ParserConfig,
};

use super::{render_html, render_markup, render_text, HtmlContext, MarkupContext};

fn html(input: &str) -> String {
    let doc = parse(input, &TagRegistry::with_builtins(), &ParserConfig::default());
    render_html(&doc, &HtmlContext::default())
}

fn text(input: &str) -> String {
    let doc = parse(input, &TagRegistry::with_builtins(), &ParserConfig::default());
    render_text(&doc)
}

fn markup(input: &str) -> String {
    let doc = parse(input, &TagRegistry::with_builtins(), &ParserConfig::default());
    render_markup(&doc, &MarkupContext::default())
}

#[rstest]
#[case::hello("Hello [b]world[/b]!", "Hello <strong>world</strong>!")]
#[case::alias("[italic]x[/italic]", "<em>x</em>")]
#[case::escaped("a < b & c", "a &lt; b &amp; c")]
#[case::newline("a\nb", "a<br/>\nb")]
#[case::unknown_tag("[foo]<x>", "[foo]&lt;x&gt;")]
#[case::quote("[quote=Bob]hi[/quote]", "<blockquote><cite>Bob</cite>hi</blockquote>")]
#[case::quote_no_author("[quote]\nhi[/quote]", "<blockquote>hi</blockquote>")]
#[case::code(
    "[code=rust]\nfn main() {}\n[/code]",
    "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
)]
#[case::code_no_lang("[code][b]x[/code]", "<pre><code>[b]x</code></pre>")]
#[case::noparse("[noparse][i]x[/noparse]", "[i]x")]
#[case::list(
    "[list=1]\n[*]one\n[*]two\n[/list]",
    "<ol type=\"1\"><li>one</li><li>two</li></ol>"
)]
#[case::bullets("[list]\n[*]one\n[/list]", "<ul><li>one</li></ul>")]
#[case::tasks(
    "[tasks]\n[task done]a\n[task]b\n[/tasks]",
    "<ul class=\"tasks\"><li class=\"task\"><input type=\"checkbox\" disabled checked/>a</li>\
     <li class=\"task\"><input type=\"checkbox\" disabled/>b</li></ul>"
)]
#[case::table(
    "[table]\n[tr][th]a[/th][/tr]\n[tr][td]b[/td][/tr]\n[/table]",
    "<table><tr><th>a</th></tr><tr><td>b</td></tr></table>"
)]
#[case::rule("a\n[hr]\nb", "a<br/>\n<hr/>b")]
#[case::break_tag("a[br]b", "a<br/>b")]
#[case::footnote(
    "x[fn]note[/fn]",
    "x<span class=\"footnote\" id=\"fn-1\"><sup>1</sup> note</span>"
)]
#[case::image(
    "[img alt=cat]https://example.com/cat.png[/img]",
    "<img src=\"https://example.com/cat.png\" alt=\"cat\"/>"
)]
#[case::unsafe_image("[img]javascript:alert(1)[/img]", "javascript:alert(1)")]
#[case::unsafe_link("[url=javascript:alert(1)]x[/url]", "x")]
#[case::stray_item("[*]x", "[*]x")]
fn renders_html(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(html(input), expected);
}

#[test]
fn links_follow_context() {
    let registry = TagRegistry::with_builtins();
    let doc = parse(
        "[url=https://example.com]site[/url]",
        &registry,
        &ParserConfig::default(),
    );

    assert_eq!(
        render_html(&doc, &HtmlContext::default()),
        "<a href=\"https://example.com\" rel=\"nofollow\">site</a>"
    );
    assert_eq!(
        render_html(
            &doc,
            &HtmlContext {
                force_rel_nofollow: false
            }
        ),
        "<a href=\"https://example.com\">site</a>"
    );
}

#[test]
fn link_target_from_content() {
    let out = html("[url]https://example.com[/url]");
    assert!(
        out.starts_with("<a href=\"https://example.com\" rel=\"nofollow\">"),
        "{out}"
    );
}

#[test]
fn flagged_erroneous_text() {
    let registry =
        TagRegistry::with_builtins().with_erroneous(Arc::new(ErroneousTextTag::flagged("bb-error")));
    let doc = parse("[foo]x", &registry, &ParserConfig::default());
    assert_eq!(
        render_html(&doc, &HtmlContext::default()),
        "<span class=\"bb-error\">[foo]</span>x"
    );
}

#[rstest]
#[case::plain("just text", "just text")]
#[case::styles("[b]Hello[/b] [i]there[/i]", "Hello there")]
#[case::list("[b]Hi[/b]\n[list]\n[*]one\n[*]two\n[/list]", "Hi\n* one\n* two\n")]
#[case::tasks("[tasks]\n[task done]a\n[task]b\n[/tasks]", "[x] a\n[ ] b\n")]
#[case::footnote("a[fn]b[/fn]", "a[1] b")]
#[case::link("[url=https://a.example]site[/url]", "site")]
#[case::image("[img alt=cat]cat.png[/img]", "cat")]
#[case::table("[table][tr][td]a[/td][td]b[/td][/tr][/table]", "a\tb\t\n")]
#[case::erroneous("[/b] x", "[/b] x")]
fn renders_text(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(text(input), expected);
}

#[rstest]
#[case::simple("[b]x[/b]", "[b]x[/b]")]
#[case::lowercased("[B]x[/B]", "[b]x[/b]")]
#[case::unclosed("[b]x", "[b]x")]
#[case::erroneous("[/b] x [foo]", "[/b] x [foo]")]
#[case::newlines("a\r\nb\rc", "a\r\nb\rc")]
#[case::shortcut("[quote=Bob]x[/quote]", "[quote=\"Bob\"]\nx[/quote]")]
#[case::attribute_order("[quote z=1 author=Bob]x[/quote]", "[quote author=\"Bob\" z=\"1\"]\nx[/quote]")]
#[case::empty_dropped("[quote author=\"\"]x[/quote]", "[quote]\nx[/quote]")]
#[case::keep_empty("[img alt=\"\"]x.png[/img]", "[img alt=\"\"]x.png[/img]")]
#[case::bare("[tasks][task done]a[/tasks]", "[tasks]\n[task done]a[/tasks]")]
#[case::implicit_items("[list]\n[*]a\n[*]b\n[/list]", "[list]\n[*]a[*]b[/list]")]
#[case::standalone("a[hr]b[br/]c", "a[hr]\nb[br]c")]
#[case::data_block("[code]\n[b]x\n[/code]", "[code]\n[b]x\n[/code]")]
#[case::quoting("[url='say \"hi\"']x[/url]", "[url='say \"hi\"']x[/url]")]
fn writes_markup(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(markup(input), expected);
}

#[test]
fn markup_without_shortcut() {
    let doc = parse(
        "[quote=Bob]x[/quote]",
        &TagRegistry::with_builtins(),
        &ParserConfig::default(),
    );
    let ctx = MarkupContext {
        allow_tagvalue_shortcut: false,
        ..MarkupContext::default()
    };
    assert_eq!(render_markup(&doc, &ctx), "[quote quote=\"Bob\"]\nx[/quote]");
}

#[test]
fn custom_delimiters() {
    let config = ParserConfig {
        open: '<',
        close: '>',
        ..ParserConfig::default()
    };
    let ctx = MarkupContext {
        open: '<',
        close: '>',
        ..MarkupContext::default()
    };
    let registry = TagRegistry::with_builtins();

    let doc = parse("<b>x</b> [i]y <url=a.html>z</url>", &registry, &config);
    assert_eq!(
        render_markup(&doc, &ctx),
        "<b>x</b> [i]y <url=\"a.html\">z</url>"
    );
    assert_eq!(
        render_html(&doc, &HtmlContext::default()),
        "<strong>x</strong> [i]y <a href=\"a.html\" rel=\"nofollow\">z</a>"
    );
}
