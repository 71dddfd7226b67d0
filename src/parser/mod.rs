use std::collections::BTreeMap;

use bitflags::bitflags;
use log::trace;

pub mod grammar;

pub use grammar::{parse_tag, TagDecl};

/// Tag attributes. Keys are unique and lower-cased; the last write wins while parsing.
pub type Attributes = BTreeMap<String, String>;

/// Lexical settings shared by the tokenizer and anything that has to write tags back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub open: char,
    pub close: char,
    pub features: TokenizerFeature,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            open: '[',
            close: ']',
            features: TokenizerFeature::default(),
        }
    }
}

bitflags! {
    /// Optional pieces of tag syntax.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TokenizerFeature: u32 {
        /// Accept `[tag=value]`, storing `value` under the tag's own name.
        const TAG_VALUE_SHORTCUT = 1 << 0;
        /// Accept `[tag/]`.
        const SELF_CLOSING = 1 << 1;
    }
}

impl Default for TokenizerFeature {
    fn default() -> Self {
        Self::all()
    }
}

/// Splits markup into a flat stream of [Token]s.
///
/// A tag that fails to parse is never an error: the opening delimiter and everything after it up
/// to the next delimiter or line break come out as plain [TokenKind::Text].
#[doc(alias = "lexer")]
pub struct Tokenizer<'a> {
    input: &'a str,
    config: TokenizerConfig,
    loc: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Tokenizer<'a> {
        Self::with_config(input, TokenizerConfig::default())
    }

    pub fn with_config(input: &'a str, config: TokenizerConfig) -> Tokenizer<'a> {
        Self {
            input,
            config,
            loc: 0,
        }
    }

    /// Returns all input text left to tokenize.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.loc..]
    }

    fn text_run(&mut self, start: usize, scan_from: usize) -> Token<'a> {
        let open = self.config.open;
        let end = self.input[scan_from..]
            .find(|c: char| c == open || c == '\n' || c == '\r')
            .map_or(self.input.len(), |idx| scan_from + idx);

        self.loc = end;
        Token {
            span: &self.input[start..end],
            start,
            kind: TokenKind::Text,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.loc;
        let first = self.remaining().chars().next()?;

        if first == '\r' || first == '\n' {
            let len = if self.remaining().starts_with("\r\n") { 2 } else { 1 };
            self.loc += len;
            return Some(Token {
                span: &self.input[start..self.loc],
                start,
                kind: TokenKind::Newline,
            });
        }

        if first != self.config.open {
            return Some(self.text_run(start, start));
        }

        match parse_tag(self.input, start, &self.config) {
            Ok(decl) => {
                self.loc = decl.end;
                let tag = BBTag {
                    name: decl.name,
                    attributes: decl.attributes,
                };
                let kind = if decl.closing {
                    TokenKind::CloseTag(tag)
                } else if decl.self_closing {
                    TokenKind::SelfCloseTag(tag)
                } else {
                    TokenKind::OpenTag(tag)
                };

                Some(Token {
                    span: &self.input[start..decl.end],
                    start,
                    kind,
                })
            }
            Err(err) => {
                trace!("{err}, folding into text");
                Some(self.text_run(start, start + first.len_utf8()))
            }
        }
    }
}

/// One lexical unit, borrowing its raw source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub span: &'a str,
    pub start: usize,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, TokenKind::Text)
    }

    pub fn is_newline(&self) -> bool {
        matches!(self.kind, TokenKind::Newline)
    }

    pub fn is_open(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::OpenTag(tag) if tag.name == name)
    }

    pub fn is_close(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::CloseTag(tag) if tag.name == name)
    }

    pub fn is_self_close(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::SelfCloseTag(tag) if tag.name == name)
    }

    pub fn tag(&self) -> Option<&BBTag> {
        match &self.kind {
            TokenKind::OpenTag(tag) | TokenKind::CloseTag(tag) | TokenKind::SelfCloseTag(tag) => {
                Some(tag)
            }
            TokenKind::Text | TokenKind::Newline => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BBTag {
    pub name: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of characters with no tag delimiter and no line break.
    Text,
    /// `\n`, `\r\n` or `\r`; the span keeps the original form.
    Newline,
    OpenTag(BBTag),
    /// Closing tags never carry attributes.
    CloseTag(BBTag),
    SelfCloseTag(BBTag),
}

#[cfg(test)]
mod tests;
