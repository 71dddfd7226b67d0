use std::sync::Arc;

use log::{debug, trace};

use crate::{
    parser::{BBTag, Token, TokenKind, Tokenizer, TokenizerConfig, TokenizerFeature},
    tags::{TagFlags, TagRegistry},
};

use super::{passes, Document, Node, NodeId};

/// Settings for [parse].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub open: char,
    pub close: char,
    pub allow_tagvalue_shortcut: bool,
    pub allow_self_closing: bool,
    /// Discard unknown tags instead of keeping them as erroneous text.
    pub drop_unrecognized: bool,
    /// Turn tags still open at the end of the input back into erroneous text.
    pub texturize_unclosed: bool,
    /// Let sanitizers remove invalid nodes instead of unwrapping them.
    pub drop_erroneous_on_sanitize: bool,
    /// `0` disables the limit. Without it, deeply nested input can exhaust the stack in the
    /// recursive passes.
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            open: '[',
            close: ']',
            allow_tagvalue_shortcut: true,
            allow_self_closing: true,
            drop_unrecognized: false,
            texturize_unclosed: false,
            drop_erroneous_on_sanitize: false,
            max_nesting_depth: 16,
        }
    }
}

impl ParserConfig {
    pub fn tokenizer_config(&self) -> TokenizerConfig {
        let mut features = TokenizerFeature::empty();
        features.set(
            TokenizerFeature::TAG_VALUE_SHORTCUT,
            self.allow_tagvalue_shortcut,
        );
        features.set(TokenizerFeature::SELF_CLOSING, self.allow_self_closing);
        TokenizerConfig {
            open: self.open,
            close: self.close,
            features,
        }
    }
}

/// Parses `text` into a sanitized, post-processed [Document].
///
/// Never fails: anything that cannot be understood ends up as text.
pub fn parse(text: &str, registry: &TagRegistry, config: &ParserConfig) -> Document {
    let mut builder = TreeBuilder::new(registry, config);
    let text = text.trim();
    if text.is_empty() {
        return builder.doc;
    }

    for token in Tokenizer::with_config(text, config.tokenizer_config()) {
        builder.feed(token);
    }
    builder.finish()
}

struct TreeBuilder<'r> {
    registry: &'r TagRegistry,
    config: &'r ParserConfig,
    doc: Document,
    cursor: NodeId,
    depth: usize,
    swallow_newline: bool,
}

impl<'r> TreeBuilder<'r> {
    fn new(registry: &'r TagRegistry, config: &'r ParserConfig) -> Self {
        let doc = Document::new(Arc::clone(registry.root()));
        Self {
            registry,
            config,
            cursor: doc.root(),
            doc,
            depth: 0,
            swallow_newline: false,
        }
    }

    fn cursor_flags(&self) -> TagFlags {
        self.doc.node(self.cursor).tag.flags()
    }

    fn at_root(&self) -> bool {
        self.doc.is_root(self.cursor)
    }

    /// Moves the cursor to its parent. The depth counter only drops on closing tags.
    fn close_cursor(&mut self) {
        if let Some(parent) = self.doc.parent(self.cursor) {
            self.cursor = parent;
        }
    }

    fn push_erroneous(&mut self, raw: &str) {
        let erroneous = Arc::clone(self.registry.erroneous());
        self.doc.append_text(self.cursor, &erroneous, raw);
    }

    fn feed(&mut self, token: Token<'_>) {
        trace!("token {:?} at {}: {:?}", token.kind, token.start, token.span);

        if !self.cursor_flags().contains(TagFlags::PARSE_EMBEDDED) {
            self.feed_data_block(token);
            return;
        }

        if let Some(tag) = token.tag() {
            if !self.registry.contains(&tag.name) {
                if self.config.drop_unrecognized {
                    debug!("dropping unrecognized tag {:?}", token.span);
                } else {
                    debug!("unrecognized tag {:?}", token.span);
                    self.push_erroneous(token.span);
                }
                return;
            }
        }

        match token.kind {
            TokenKind::Text => {
                self.swallow_newline = false;
                let text = Arc::clone(self.registry.text());
                self.doc.append_text(self.cursor, &text, token.span);
            }
            TokenKind::Newline => {
                if self.swallow_newline {
                    self.swallow_newline = false;
                } else {
                    let newline = Arc::clone(self.registry.newline());
                    self.doc.append_text(self.cursor, &newline, token.span);
                }
                self.close_on_newline();
            }
            TokenKind::OpenTag(tag) => self.open_tag(tag, token.span),
            TokenKind::CloseTag(tag) => self.close_tag(&tag, token.span),
            TokenKind::SelfCloseTag(tag) => self.self_close_tag(tag, token.span),
        }
    }

    /// Inside a tag that does not parse its content everything but its own closing tag is
    /// collected verbatim.
    fn feed_data_block(&mut self, token: Token<'_>) {
        match &token.kind {
            TokenKind::CloseTag(tag) if tag.name == self.doc.node(self.cursor).name => {
                self.swallow_newline = false;
                self.doc.node_mut(self.cursor).source_close_tag = Some(token.span.to_owned());
                self.close_cursor();
                self.depth = self.depth.saturating_sub(1);
            }
            TokenKind::Newline => {
                if self.swallow_newline {
                    self.swallow_newline = false;
                } else {
                    self.doc.node_mut(self.cursor).content.push_str(token.span);
                }
                self.close_on_newline();
            }
            _ => {
                self.swallow_newline = false;
                self.doc.node_mut(self.cursor).content.push_str(token.span);
            }
        }
    }

    fn close_on_newline(&mut self) {
        while !self.at_root() && self.cursor_flags().contains(TagFlags::NEWLINE_CLOSES) {
            self.close_cursor();
        }
    }

    fn open_tag(&mut self, tag: BBTag, raw: &str) {
        let Some(descriptor) = self.registry.get(&tag.name).cloned() else {
            return;
        };
        let flags = descriptor.flags();
        let limit = self.config.max_nesting_depth;

        if !flags.contains(TagFlags::STANDALONE) && limit > 0 && self.depth >= limit {
            debug!("nesting limit {limit} reached, keeping {raw:?} as text");
            self.push_erroneous(raw);
            return;
        }

        if !self.at_root()
            && self.cursor_flags().contains(TagFlags::SAME_TAG_CLOSES)
            && self.doc.node(self.cursor).name == tag.name
        {
            self.close_cursor();
        }

        self.swallow_newline = flags.contains(TagFlags::SWALLOW_TRAILING_NEWLINE);

        if flags.contains(TagFlags::CLOSE_INLINES) {
            while !self.at_root() && self.cursor_flags().contains(TagFlags::INLINE) {
                self.close_cursor();
            }
        }

        let mut node = Node::new(tag.name, descriptor).with_attributes(tag.attributes);
        node.source_open_tag = Some(raw.to_owned());
        let id = self.doc.append_child(self.cursor, node);

        if !flags.contains(TagFlags::STANDALONE) {
            self.cursor = id;
            self.depth += 1;
        }
    }

    fn close_tag(&mut self, tag: &BBTag, raw: &str) {
        self.swallow_newline = false;

        if !self.at_root() && self.doc.node(self.cursor).name == tag.name {
            self.doc.node_mut(self.cursor).source_close_tag = Some(raw.to_owned());
            self.close_cursor();
            self.depth = self.depth.saturating_sub(1);
            return;
        }

        if self.weak_parent_closes(&tag.name) {
            debug!("{raw:?} closes a weakly closed tag and its parent");
            self.doc.node_mut(self.cursor).source_close_tag = Some(String::new());
            self.close_cursor();
            if self.at_root() {
                self.push_erroneous(raw);
            } else {
                self.doc.node_mut(self.cursor).source_close_tag = Some(raw.to_owned());
                self.close_cursor();
            }
            self.depth = self.depth.saturating_sub(2);
            return;
        }

        debug!("mismatched closing tag {raw:?}");
        self.push_erroneous(raw);
    }

    fn weak_parent_closes(&self, name: &str) -> bool {
        let Some(parent) = self.doc.parent(self.cursor) else {
            return false;
        };

        (self.doc.is_root(parent) || self.doc.node(parent).name == name)
            && self.cursor_flags().contains(TagFlags::WEAK_PARENT_CLOSE)
    }

    fn self_close_tag(&mut self, tag: BBTag, raw: &str) {
        let Some(descriptor) = self.registry.get(&tag.name).cloned() else {
            return;
        };
        let flags = descriptor.flags();
        self.swallow_newline = flags.contains(TagFlags::SWALLOW_TRAILING_NEWLINE);

        if !flags.contains(TagFlags::STANDALONE) {
            debug!("{raw:?} cannot be self-closing");
            self.push_erroneous(raw);
            self.swallow_newline = false;
            return;
        }

        let mut node = Node::new(tag.name, descriptor).with_attributes(tag.attributes);
        node.source_open_tag = Some(raw.to_owned());
        self.doc.append_child(self.cursor, node);
    }

    fn finish(mut self) -> Document {
        while !self.at_root() && self.cursor_flags().contains(TagFlags::WEAK_PARENT_CLOSE) {
            self.close_cursor();
        }

        if self.config.texturize_unclosed {
            let erroneous = Arc::clone(self.registry.erroneous());
            while !self.at_root() {
                let unclosed = self.cursor;
                self.close_cursor();
                debug!("unclosed tag `{}`", self.doc.node(unclosed).name);
                self.doc.unwrap_node(unclosed, &erroneous);
            }
        }

        let mut doc = self.doc;
        passes::sanitize(
            &mut doc,
            self.registry.erroneous(),
            self.config.drop_erroneous_on_sanitize,
        );
        passes::post_process(&mut doc);
        doc
    }
}
