//! Fault-tolerant BBCode parser.
//!
//! Markup is tokenized, built into a [Document] tree, sanitized and post-processed, and can then
//! be rendered as HTML, plain text, or back into markup. Input is never rejected: malformed tags,
//! unknown tags and mismatched closing tags all degrade into text.
//!
//! ```
//! # #[cfg(feature = "builtin_tags")] {
//! use bbtree::{parse, render_html, HtmlContext, ParserConfig, TagRegistry};
//!
//! let registry = TagRegistry::with_builtins();
//! let doc = parse("Hello [b]world[/b]!", &registry, &ParserConfig::default());
//! assert_eq!(render_html(&doc, &HtmlContext::default()), "Hello <strong>world</strong>!");
//! # }
//! ```
//!
//! Tag behavior is pluggable through [TagDescriptor]. The `builtin_tags` feature, on by default,
//! adds a default set in `tags::builtins`.

pub mod error;
pub mod escape;
mod parser;
pub mod render;
pub mod tags;
mod tree;

pub use error::{RegistryError, TagParseError};
pub use escape::{escape_attrvalue, sanitize_url};
pub use parser::{
    parse_tag, Attributes, BBTag, TagDecl, Token, TokenKind, Tokenizer, TokenizerConfig,
    TokenizerFeature,
};
pub use render::{render_html, render_markup, render_text, HtmlContext, MarkupContext};
pub use tags::{ErroneousTextTag, TagDescriptor, TagFlags, TagRef, TagRegistry};
pub use tree::{parse, post_process, sanitize, Descendants, Document, Node, NodeId, NodeRef, ParserConfig};
