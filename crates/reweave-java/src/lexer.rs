// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for the Java subset.
//!
//! Every token carries the whitespace and comments before it as a [`Space`],
//! so the parser never sees trivia and printing the tokens' prefixes and
//! texts in order reproduces the input. The last token is always
//! [`TokenKind::Eof`], holding the trailing trivia.
//!
//! `>>` and `>>>` are never produced: nested type arguments close one `>` at
//! a time, and shift operators are not part of the subset.

use reweave_core::tree::{Comment, CommentStyle, Space};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Identifiers and keywords.
    Word,
    String,
    Char,
    Number,
    Symbol,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub prefix: Space,
    /// Byte offset of the token text.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub(crate) struct LexError {
    pub offset: usize,
    pub message: String,
}

const SYMBOLS: &[&str] = &[
    "...", "->", "::", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "(", ")", "{", "}", "[", "]", ";", ",", ".", "@", "=", "<", ">", "!", "~", "?", ":", "+", "-", "*", "/",
    "%", "&", "|", "^",
];

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer { source, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let prefix = lexer.trivia()?;
        let offset = lexer.pos;
        let Some(c) = lexer.peek() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                prefix,
                offset,
            });
            return Ok(tokens);
        };
        let kind = if is_identifier_start(c) {
            lexer.eat_while(is_identifier_part);
            TokenKind::Word
        } else if c.is_ascii_digit() || (c == '.' && lexer.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) {
            lexer.number();
            TokenKind::Number
        } else if c == '"' {
            lexer.string()?;
            TokenKind::String
        } else if c == '\'' {
            lexer.quoted('\'')?;
            TokenKind::Char
        } else {
            let symbol = SYMBOLS
                .iter()
                .find(|s| lexer.rest().starts_with(**s))
                .ok_or_else(|| LexError {
                    offset,
                    message: format!("unexpected character '{}'", c),
                })?;
            lexer.pos += symbol.len();
            TokenKind::Symbol
        };
        tokens.push(Token {
            kind,
            text: source[offset..lexer.pos].to_string(),
            prefix,
            offset,
        });
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

struct Lexer<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'s str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.source[start..self.pos]
    }

    fn trivia(&mut self) -> Result<Space, LexError> {
        let whitespace = self.eat_while(is_whitespace).to_string();
        let mut comments = Vec::new();
        loop {
            let rest = self.rest();
            if let Some(body) = rest.strip_prefix("//") {
                let len = body.find('\n').unwrap_or(body.len());
                let text = body[..len].to_string();
                self.pos += 2 + len;
                let suffix = self.eat_while(is_whitespace).to_string();
                comments.push(Comment {
                    style: CommentStyle::Line,
                    text,
                    suffix,
                });
            } else if let Some(body) = rest.strip_prefix("/*") {
                let len = body.find("*/").ok_or_else(|| LexError {
                    offset: self.pos,
                    message: "unterminated comment".to_string(),
                })?;
                let text = body[..len].to_string();
                self.pos += 2 + len + 2;
                let suffix = self.eat_while(is_whitespace).to_string();
                comments.push(Comment {
                    style: CommentStyle::Block,
                    text,
                    suffix,
                });
            } else {
                return Ok(Space { whitespace, comments });
            }
        }
    }

    /// Digits, letters (hex digits, suffixes, exponents), `_` and `.`, plus
    /// the sign of a decimal exponent.
    fn number(&mut self) {
        let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        loop {
            let part = self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            let exponent = !hex && (part.ends_with('e') || part.ends_with('E'));
            match self.peek() {
                Some('+') | Some('-') if exponent => self.pos += 1,
                _ => break,
            }
        }
    }

    /// A string literal or a `"""` text block.
    fn string(&mut self) -> Result<(), LexError> {
        if self.rest().starts_with("\"\"\"") {
            let start = self.pos;
            let body = &self.rest()[3..];
            let len = body.find("\"\"\"").ok_or_else(|| LexError {
                offset: start,
                message: "unterminated text block".to_string(),
            })?;
            self.pos += 3 + len + 3;
            return Ok(());
        }
        self.quoted('"')
    }

    fn quoted(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1;
        let mut escaped = false;
        while let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            match c {
                '\n' => break,
                '\\' if !escaped => {
                    escaped = true;
                    continue;
                }
                c if c == quote && !escaped => return Ok(()),
                _ => {}
            }
            escaped = false;
        }
        Err(LexError {
            offset: start,
            message: "unterminated literal".to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
