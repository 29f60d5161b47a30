// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lossless `.properties` parser.
//!
//! Follows the line format of `java.util.Properties`:
//!
//! - `#` and `!` start a comment line
//! - the key runs to the first unescaped blank, `=` or `:`
//! - a value ends at the first line break not preceded by an odd number of
//!   backslashes, so continuation lines stay part of the value text
//!
//! Keys and values keep their escapes; nothing is unescaped.

use std::path::PathBuf;
use std::sync::Arc;

use reweave_core::marker::{Checksum, Markers};
use reweave_core::text::LineIndex;
use reweave_core::tree::{NodeId, Space};
use reweave_core::ParseError;
use tracing::debug;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, opt, repeat};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};
use winnow::ModalResult;

use crate::tree::{Comment, CommentDelimiter, Content, Delimiter, Entry, File, Value};

/// Parse a properties file.
pub fn parse(path: impl Into<PathBuf>, source: &str) -> Result<Arc<File>, ParseError> {
    let path = path.into();
    let raw = lines.parse(source).map_err(|e| {
        let (line, column) = LineIndex::new(source).position(e.offset());
        ParseError {
            path: path.display().to_string(),
            line,
            column,
            message: e.inner().to_string(),
        }
    })?;

    let builder = Builder {
        source_len: source.len(),
        index: Some(LineIndex::new(source)),
    };
    let content = builder.content(raw.lines);
    debug!(path = %path.display(), lines = content.len(), "parsed properties file");

    Ok(Arc::new(File {
        id: NodeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::of(Checksum::of(source)),
        source_path: path,
        content,
        eof: Space::format(raw.eof),
    }))
}

/// Parse lines of a snippet, detached from any file.
///
/// Nodes get fresh ids and no position markers. Trailing whitespace is
/// dropped.
pub fn parse_fragment(snippet: &str) -> Result<Vec<Content>, String> {
    let raw = lines.parse(snippet).map_err(|e| e.to_string())?;
    let builder = Builder {
        source_len: snippet.len(),
        index: None,
    };
    Ok(builder.content(raw.lines))
}

// ============================================================================
// Building nodes
// ============================================================================

struct Builder {
    source_len: usize,
    index: Option<LineIndex>,
}

impl Builder {
    fn markers(&self, remaining: usize) -> Markers {
        match &self.index {
            Some(index) => Markers::of(index.source_position(self.source_len - remaining)),
            None => Markers::new(),
        }
    }

    fn content(&self, lines: Vec<Line<'_>>) -> Vec<Content> {
        lines.into_iter().map(|line| self.line(line)).collect()
    }

    fn line(&self, line: Line<'_>) -> Content {
        let prefix = Space::format(line.prefix);
        let markers = self.markers(line.remaining);
        match line.body {
            Body::Comment { delimiter, message } => Content::Comment(Arc::new(Comment {
                id: NodeId::random(),
                prefix,
                markers,
                delimiter,
                message: message.to_string(),
            })),
            Body::Entry {
                key,
                before_equals,
                delimiter,
                value_prefix,
                value_remaining,
                value,
            } => Content::Entry(Arc::new(Entry {
                id: NodeId::random(),
                prefix,
                markers,
                key: key.to_string(),
                before_equals: Space::format(before_equals),
                delimiter,
                value: Arc::new(Value {
                    id: NodeId::random(),
                    prefix: Space::format(value_prefix),
                    markers: self.markers(value_remaining),
                    text: value.to_string(),
                }),
            })),
        }
    }
}

// ============================================================================
// Grammar
// ============================================================================

struct RawFile<'s> {
    lines: Vec<Line<'s>>,
    eof: &'s str,
}

struct Line<'s> {
    prefix: &'s str,
    /// Input length left where the line's first token starts.
    remaining: usize,
    body: Body<'s>,
}

enum Body<'s> {
    Comment {
        delimiter: CommentDelimiter,
        message: &'s str,
    },
    Entry {
        key: &'s str,
        before_equals: &'s str,
        delimiter: Delimiter,
        value_prefix: &'s str,
        value_remaining: usize,
        value: &'s str,
    },
}

fn lines<'s>(input: &mut &'s str) -> ModalResult<RawFile<'s>> {
    let lines: Vec<Line<'s>> = repeat(0.., line).parse_next(input)?;
    let eof = multispace0.parse_next(input)?;
    Ok(RawFile { lines, eof })
}

fn line<'s>(input: &mut &'s str) -> ModalResult<Line<'s>> {
    let prefix = multispace0.parse_next(input)?;
    let remaining = input.len();
    let body = alt((comment, entry)).parse_next(input)?;
    Ok(Line {
        prefix,
        remaining,
        body,
    })
}

fn comment<'s>(input: &mut &'s str) -> ModalResult<Body<'s>> {
    let delimiter = one_of(['#', '!'])
        .map(|c| {
            if c == '#' {
                CommentDelimiter::Hash
            } else {
                CommentDelimiter::Exclamation
            }
        })
        .parse_next(input)?;
    let message = take_till(0.., is_line_break).parse_next(input)?;
    Ok(Body::Comment { delimiter, message })
}

fn entry<'s>(input: &mut &'s str) -> ModalResult<Body<'s>> {
    if input.is_empty() {
        return Err(ErrMode::from_input(input));
    }
    let key = key(input)?;
    let blank = take_while(0.., is_blank).parse_next(input)?;
    let delimiter = opt(one_of(['=', ':'])).parse_next(input)?;
    let (before_equals, delimiter, value_prefix) = match delimiter {
        Some(c) => {
            let value_prefix = take_while(0.., is_blank).parse_next(input)?;
            let delimiter = if c == '=' {
                Delimiter::Equals
            } else {
                Delimiter::Colon
            };
            (blank, delimiter, value_prefix)
        }
        None => ("", Delimiter::None, blank),
    };
    let value_remaining = input.len();
    let value = value(input)?;
    Ok(Body::Entry {
        key,
        before_equals,
        delimiter,
        value_prefix,
        value_remaining,
        value,
    })
}

fn key<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let mut escaped = false;
    let end = input
        .char_indices()
        .find(|&(_, c)| {
            if escaped {
                escaped = false;
                return false;
            }
            if c == '\\' {
                escaped = true;
                return false;
            }
            is_blank(c) || c == '=' || c == ':' || is_line_break(c)
        })
        .map_or(input.len(), |(i, _)| i);
    Ok(split_off(input, end))
}

fn value<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let bytes = input.as_bytes();
    let mut end = 0;
    let mut backslashes = 0usize;
    while end < bytes.len() {
        match bytes[end] {
            b'\\' => backslashes += 1,
            b'\n' | b'\r' if backslashes % 2 == 1 => {
                backslashes = 0;
                if bytes[end] == b'\r' && bytes.get(end + 1) == Some(&b'\n') {
                    end += 1;
                }
            }
            b'\n' | b'\r' => break,
            _ => backslashes = 0,
        }
        end += 1;
    }
    Ok(split_off(input, end))
}

/// Consume the first `at` bytes. `at` must be a char boundary.
fn split_off<'s>(input: &mut &'s str, at: usize) -> &'s str {
    let (taken, rest) = input.split_at(at);
    *input = rest;
    taken
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\x0c'
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reweave_core::marker::SourcePosition;
    use reweave_core::print::Codegen;

    fn round_trip(source: &str) {
        let file = parse("test.properties", source).unwrap();
        assert_eq!(Codegen::print(file.as_ref()), source);
    }

    #[test]
    fn round_trips() {
        round_trip("");
        round_trip("a=b");
        round_trip("a.b.c = 1\n");
        round_trip("  key : value  \n\n# comment\n! other\nx y\n\n");
        round_trip("multi = one \\\n    two \\\r\n  three\nnext=1");
        round_trip("empty=\nbare\n=novalue\n");
        round_trip("path\\ with\\ spaces = c:\\\\dir\n");
    }

    #[test]
    fn entries_and_comments() {
        let file = parse("a.properties", "# header\na.b.c=x\n  x.y : z\nflag\n").unwrap();
        assert_eq!(file.content.len(), 4);
        assert!(matches!(file.content[0], Content::Comment(_)));

        let entry = file.entry("a.b.c").unwrap();
        assert_eq!(entry.value.text, "x");
        assert_eq!(entry.delimiter, Delimiter::Equals);

        let entry = file.entry("x.y").unwrap();
        assert_eq!(entry.before_equals.whitespace, " ");
        assert_eq!(entry.delimiter, Delimiter::Colon);
        assert_eq!(entry.value.prefix.whitespace, " ");
        assert_eq!(entry.prefix.whitespace, "\n  ");

        let flag = file.entry("flag").unwrap();
        assert_eq!(flag.value.text, "");
        assert_eq!(flag.delimiter, Delimiter::None);
    }

    #[test]
    fn whitespace_separator_goes_to_value() {
        let file = parse("a.properties", "key   value").unwrap();
        let entry = file.entry("key").unwrap();
        assert_eq!(entry.delimiter, Delimiter::None);
        assert_eq!(entry.value.prefix.whitespace, "   ");
        assert_eq!(entry.value.text, "value");
    }

    #[test]
    fn continuation_lines_stay_in_value() {
        let file = parse("a.properties", "k=a\\\n  b\nnext=1\n").unwrap();
        assert_eq!(file.entry("k").unwrap().value.text, "a\\\n  b");
        assert_eq!(file.entry("next").unwrap().value.text, "1");
    }

    #[test]
    fn escaped_separators_stay_in_key() {
        let file = parse("a.properties", "a\\=b=c").unwrap();
        assert_eq!(file.entry("a\\=b").unwrap().value.text, "c");
    }

    #[test]
    fn positions_and_checksum() {
        let file = parse("a.properties", "a=1\n  b=2\n").unwrap();
        let b = file.entry("b").unwrap();
        assert_eq!(
            b.markers.find_first::<SourcePosition>(),
            Some(&SourcePosition {
                offset: 6,
                line: 2,
                column: 3
            })
        );
        assert_eq!(
            b.value.markers.find_first::<SourcePosition>().map(|p| p.column),
            Some(5)
        );
        assert_eq!(
            file.markers.find_first::<Checksum>(),
            Some(&Checksum::of("a=1\n  b=2\n"))
        );
    }

    #[test]
    fn fragments_have_no_positions() {
        let content = parse_fragment("new.key=value").unwrap();
        assert_eq!(content.len(), 1);
        let entry = content[0].as_entry().unwrap();
        assert_eq!(entry.key, "new.key");
        assert!(entry.markers.is_empty());
    }
}
