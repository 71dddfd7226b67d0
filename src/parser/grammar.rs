//! Grammar for a single tag declaration.
//!
//! ```text
//! tag       := OPEN ws* ('/' ws*)? ident ws* tagvalue? attr* close
//! tagvalue  := '=' ws* value ws*
//! attr      := ident ws* ('=' ws* value)? ws*
//! value     := quoted | unquoted
//! close     := ('/' ws*)? CLOSE
//! ```
//!
//! `ws` is only space and tab. A line break anywhere inside a declaration makes it malformed.

use crate::error::TagParseError;

use super::{Attributes, TokenizerConfig, TokenizerFeature};

/// A successfully parsed tag declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDecl {
    /// Lower-cased tag name.
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    pub attributes: Attributes,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '*'
}

fn is_ws(c: char) -> bool {
    c == ' ' || c == '\t'
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn require(&self) -> Result<char, TagParseError> {
        self.peek().ok_or(TagParseError::OutOfInput)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(is_ws) {
            self.pos += 1;
        }
    }

    fn malformed(&self) -> TagParseError {
        TagParseError::Malformed { offset: self.pos }
    }

    fn ident(&mut self) -> Result<String, TagParseError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }

        if self.pos == start {
            self.require()?;
            return Err(self.malformed());
        }

        Ok(self.text[start..self.pos].to_ascii_lowercase())
    }

    fn value(&mut self, config: &TokenizerConfig) -> Result<String, TagParseError> {
        let value = match self.require()? {
            quote @ ('"' | '\'') => {
                self.bump();
                let mut out = String::new();
                loop {
                    match self.bump().ok_or(TagParseError::OutOfInput)? {
                        '\\' => match self.require()? {
                            c if c == quote || c == '\\' => {
                                self.bump();
                                out.push(c);
                            }
                            _ => out.push('\\'),
                        },
                        c if c == quote => break,
                        '\n' | '\r' => return Err(self.malformed()),
                        c => out.push(c),
                    }
                }
                out
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == config.open || c == config.close || is_ws(c) || c == '\n' || c == '\r' {
                        break;
                    }
                    self.pos += c.len_utf8();
                }
                self.text[start..self.pos].to_owned()
            }
        };

        // `key="val"x` is ambiguous, so a value must be followed by the delimiter or whitespace.
        match self.require()? {
            c if c == config.close || is_ws(c) => Ok(value),
            _ => Err(self.malformed()),
        }
    }
}

/// Parses one tag declaration starting exactly at the opening delimiter at `start`.
pub fn parse_tag(
    text: &str,
    start: usize,
    config: &TokenizerConfig,
) -> Result<TagDecl, TagParseError> {
    let mut s = Scanner { text, pos: start };

    match s.bump() {
        Some(c) if c == config.open => {}
        Some(_) => return Err(TagParseError::Malformed { offset: start }),
        None => return Err(TagParseError::OutOfInput),
    }

    s.skip_ws();
    let closing = s.peek() == Some('/');
    if closing {
        s.bump();
        s.skip_ws();
    }

    let name = s.ident()?;
    s.skip_ws();

    let mut attributes = Attributes::new();
    if s.peek() == Some('=') {
        if closing || !config.features.contains(TokenizerFeature::TAG_VALUE_SHORTCUT) {
            return Err(s.malformed());
        }
        s.bump();
        s.skip_ws();
        let value = s.value(config)?;
        s.skip_ws();
        attributes.insert(name.clone(), value);
    }

    loop {
        let c = s.require()?;

        if c == config.close {
            s.bump();
            return Ok(TagDecl {
                name,
                closing,
                self_closing: false,
                attributes,
                end: s.pos,
            });
        }

        if c == '/' {
            if closing || !config.features.contains(TokenizerFeature::SELF_CLOSING) {
                return Err(s.malformed());
            }
            s.bump();
            s.skip_ws();
            return match s.require()? {
                c if c == config.close => {
                    s.bump();
                    Ok(TagDecl {
                        name,
                        closing,
                        self_closing: true,
                        attributes,
                        end: s.pos,
                    })
                }
                _ => Err(s.malformed()),
            };
        }

        if !is_ident_char(c) || closing {
            return Err(s.malformed());
        }

        let key = s.ident()?;
        s.skip_ws();
        let value = if s.peek() == Some('=') {
            s.bump();
            s.skip_ws();
            let value = s.value(config)?;
            s.skip_ws();
            value
        } else {
            String::new()
        };
        attributes.insert(key, value);
    }
}
