// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lossless XML parser.
//!
//! Covers what build descriptors and configuration files use: an optional
//! XML declaration, comments, processing instructions and a DOCTYPE before
//! the root, then nested tags with attributes, text and CDATA. Entities are
//! not expanded and DTD internal subsets are kept as raw text.

use std::path::PathBuf;
use std::sync::Arc;

use reweave_core::marker::{Checksum, Markers};
use reweave_core::text::LineIndex;
use reweave_core::tree::{NodeId, Space};
use reweave_core::ParseError;
use tracing::debug;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, opt, repeat};
use winnow::error::{ContextError, ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_until, take_while};
use winnow::ModalResult;

use crate::tree::{
    Attribute, CharData, Closing, Comment, Content, DocTypeDecl, Document, Misc, ProcessingInstruction, Prolog, Quote,
    Tag, XmlDecl,
};

/// Parse an XML document.
pub fn parse(path: impl Into<PathBuf>, source: &str) -> Result<Arc<Document>, ParseError> {
    let path = path.into();
    let parser = XmlParser {
        source_len: source.len(),
        index: LineIndex::new(source),
    };
    let (prolog, root, eof) = (|i: &mut &str| parser.document(i))
        .parse(source)
        .map_err(|e| {
            let (line, column) = parser.index.position(e.offset());
            ParseError {
                path: path.display().to_string(),
                line,
                column,
                message: format!("invalid XML: {}", e.inner()),
            }
        })?;
    debug!(path = %path.display(), root = %root.name, "parsed XML document");

    Ok(Arc::new(Document {
        id: NodeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::of(Checksum::of(source)),
        source_path: path,
        prolog,
        root,
        eof,
    }))
}

struct XmlParser {
    source_len: usize,
    index: LineIndex,
}

impl XmlParser {
    fn markers(&self, input: &str) -> Markers {
        Markers::of(self.index.source_position(self.source_len - input.len()))
    }

    fn document(&self, input: &mut &str) -> ModalResult<(Arc<Prolog>, Arc<Tag>, Space)> {
        let prolog = self.prolog(input)?;
        let root = self.tag(input)?;
        let eof = multispace0.parse_next(input)?;
        Ok((prolog, root, Space::format(eof)))
    }

    fn prolog<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<Prolog>> {
        let markers = self.markers(input);
        let xml_decl = opt(|i: &mut &'s str| self.xml_decl(i)).parse_next(input)?;
        let misc: Vec<Misc> = repeat(
            0..,
            alt((
                |i: &mut &'s str| self.comment(i).map(Misc::Comment),
                |i: &mut &'s str| self.processing_instruction(i).map(Misc::ProcessingInstruction),
                |i: &mut &'s str| self.doctype(i).map(Misc::DocTypeDecl),
            )),
        )
        .parse_next(input)?;
        Ok(Arc::new(Prolog {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers,
            xml_decl,
            misc,
        }))
    }

    fn xml_decl<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<XmlDecl>> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        "<?xml".parse_next(input)?;
        if !input.starts_with(char::is_whitespace) && !input.starts_with("?>") {
            return Err(ErrMode::from_input(input));
        }
        let attributes: Vec<Arc<Attribute>> = repeat(0.., |i: &mut &'s str| self.attribute(i)).parse_next(input)?;
        let before_close = multispace0.parse_next(input)?;
        "?>".parse_next(input)?;
        Ok(Arc::new(XmlDecl {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            attributes,
            before_close: Space::format(before_close),
        }))
    }

    fn processing_instruction<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<ProcessingInstruction>> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        "<?".parse_next(input)?;
        let target = name(input)?;
        let data = take_until(0.., "?>").parse_next(input)?;
        "?>".parse_next(input)?;
        Ok(Arc::new(ProcessingInstruction {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            target: target.to_string(),
            data: data.to_string(),
        }))
    }

    fn doctype<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<DocTypeDecl>> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        "<!DOCTYPE".parse_next(input)?;
        let text = doctype_body(input)?;
        ">".parse_next(input)?;
        Ok(Arc::new(DocTypeDecl {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            text: text.to_string(),
        }))
    }

    fn comment<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<Comment>> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        "<!--".parse_next(input)?;
        let text = take_until(0.., "-->").parse_next(input)?;
        "-->".parse_next(input)?;
        Ok(Arc::new(Comment {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            text: text.to_string(),
        }))
    }

    fn cdata<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<CharData>> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        "<![CDATA[".parse_next(input)?;
        let text = take_until(0.., "]]>").parse_next(input)?;
        "]]>".parse_next(input)?;
        Ok(Arc::new(CharData {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            cdata: true,
            text: text.to_string(),
        }))
    }

    fn char_data<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<CharData>> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        let text = take_till(1.., '<').parse_next(input)?;
        Ok(Arc::new(CharData {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            cdata: false,
            text: text.to_string(),
        }))
    }

    fn attribute<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<Attribute>> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        let key = name(input)?;
        let before_equals = multispace0.parse_next(input)?;
        '='.parse_next(input)?;
        let after_equals = multispace0.parse_next(input)?;
        let mut quote = one_of(['"', '\'']).parse_next(input)?;
        let value = take_till(0.., quote).parse_next(input)?;
        quote.parse_next(input)?;
        Ok(Arc::new(Attribute {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            key: key.to_string(),
            before_equals: Space::format(before_equals),
            after_equals: Space::format(after_equals),
            quote: if quote == '"' { Quote::Double } else { Quote::Single },
            value: value.to_string(),
        }))
    }

    /// An element and everything nested in it. Open elements are kept on an
    /// explicit stack so nesting depth does not grow the call stack.
    fn tag<'s>(&self, input: &mut &'s str) -> ModalResult<Arc<Tag>> {
        let (root, self_closing) = self.open_tag(input)?;
        if self_closing {
            return Ok(Arc::new(root));
        }
        let mut open: Vec<(Tag, Vec<Content>)> = vec![(root, Vec::new())];
        loop {
            let checkpoint = *input;
            let whitespace = multispace0.parse_next(input)?;
            if input.starts_with("</") {
                let Some((mut tag, content)) = open.pop() else {
                    return Err(ErrMode::Cut(ContextError::new()));
                };
                tag.closing = Some(self.closing(&tag.name, whitespace, input)?);
                tag.content = Some(content);
                let tag = Arc::new(tag);
                match open.last_mut() {
                    Some((_, siblings)) => siblings.push(Content::Tag(tag)),
                    None => return Ok(tag),
                }
                continue;
            }
            *input = checkpoint;
            let item = alt((
                |i: &mut &'s str| self.comment(i).map(|n| Item::Content(Content::Comment(n))),
                |i: &mut &'s str| self.cdata(i).map(|n| Item::Content(Content::CharData(n))),
                |i: &mut &'s str| {
                    self.processing_instruction(i)
                        .map(|n| Item::Content(Content::ProcessingInstruction(n)))
                },
                |i: &mut &'s str| {
                    self.open_tag(i).map(|(tag, self_closing)| {
                        if self_closing {
                            Item::Content(Content::Tag(Arc::new(tag)))
                        } else {
                            Item::Open(Box::new(tag))
                        }
                    })
                },
                |i: &mut &'s str| self.char_data(i).map(|n| Item::Content(Content::CharData(n))),
            ))
            .parse_next(input)?;
            match item {
                Item::Open(tag) => open.push((*tag, Vec::new())),
                Item::Content(child) => {
                    if let Some((_, content)) = open.last_mut() {
                        content.push(child);
                    }
                }
            }
        }
    }

    /// `<name attr="v"` followed by `>` or `/>`; true when self-closing.
    fn open_tag<'s>(&self, input: &mut &'s str) -> ModalResult<(Tag, bool)> {
        let prefix = multispace0.parse_next(input)?;
        let markers = self.markers(input);
        '<'.parse_next(input)?;
        let tag_name = name(input)?;
        let attributes: Vec<Arc<Attribute>> = repeat(0.., |i: &mut &'s str| self.attribute(i)).parse_next(input)?;
        let before_close = multispace0.parse_next(input)?;
        let tag = Tag {
            id: NodeId::random(),
            prefix: Space::format(prefix),
            markers,
            name: tag_name.to_string(),
            attributes,
            before_close: Space::format(before_close),
            content: None,
            closing: None,
        };
        if opt("/>").parse_next(input)?.is_some() {
            return Ok((tag, true));
        }
        '>'.parse_next(input)?;
        Ok((tag, false))
    }

    fn closing(&self, expected: &str, prefix: &str, input: &mut &str) -> ModalResult<Closing> {
        "</".parse_next(input)?;
        let closing_name = name(input)?;
        if closing_name != expected {
            return Err(ErrMode::Cut(ContextError::new()));
        }
        let before_close = multispace0.parse_next(input)?;
        '>'.parse_next(input)?;
        Ok(Closing {
            prefix: Space::format(prefix),
            name: closing_name.to_string(),
            before_close: Space::format(before_close),
        })
    }
}

enum Item {
    Content(Content),
    Open(Box<Tag>),
}

fn name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')).parse_next(input)
}

/// Up to the `>` that closes a DOCTYPE, skipping over an internal subset
/// and quoted literals.
fn doctype_body<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => {
                let (body, rest) = input.split_at(i);
                *input = rest;
                return Ok(body);
            }
            _ => {}
        }
    }
    Err(ErrMode::from_input(input))
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
        let doc = parse("test.xml", source).unwrap();
        assert_eq!(Codegen::print(doc.as_ref()), source);
    }

    #[test]
    fn round_trips() {
        round_trip("<a/>");
        round_trip("<a></a>");
        round_trip("<?xml version=\"1.0\" encoding='UTF-8' ?>\n<root>\n  <child attr = \"1\"/>\n</root>\n");
        round_trip("<!-- head -->\n<!DOCTYPE note [\n  <!ENTITY x \"y>\">\n]>\n<note>text &amp; more</note>");
        round_trip("<a>\n  <![CDATA[ <raw> ]]>\n  <?pi some data?>\n  <!-- c --> tail\n</a >\n\n");
        round_trip("<?xml-stylesheet href=\"s.xsl\"?><a  b='c' ></a>");
    }

    #[test]
    fn structure() {
        let doc = parse("pom.xml", "<project>\n  <parent>\n    <version>1.0</version>\n  </parent>\n</project>").unwrap();
        assert_eq!(doc.root.name, "project");
        let parent = doc.root.child("parent").unwrap();
        assert_eq!(parent.child_value("version"), Some("1.0"));
        assert_eq!(parent.prefix.whitespace, "\n  ");
        assert_eq!(parent.closing.as_ref().unwrap().prefix.whitespace, "\n  ");
        assert!(doc.prolog.xml_decl.is_none());
    }

    #[test]
    fn positions() {
        let doc = parse("a.xml", "<a>\n  <b/>\n</a>").unwrap();
        let b = doc.root.child("b").unwrap();
        assert_eq!(
            b.markers.find_first::<SourcePosition>(),
            Some(&SourcePosition {
                offset: 6,
                line: 2,
                column: 3
            })
        );
        assert!(doc.markers.find_first::<Checksum>().is_some());
    }

    #[test]
    fn mismatched_closing_tag_is_an_error() {
        let err = parse("bad.xml", "<a>\n  <b></c>\n</a>").unwrap_err();
        assert_eq!(err.path, "bad.xml");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn unclosed_tag_is_an_error() {
        assert!(parse("bad.xml", "<a><b>").is_err());
        assert!(parse("bad.xml", "<a><b></b>").is_err());
    }

    #[test]
    fn deep_nesting_parses() {
        let depth = 1_000;
        let source = format!("{}x{}", "<a>".repeat(depth), "</a>".repeat(depth));
        let doc = parse("deep.xml", &source).unwrap();
        let mut levels = 1;
        let mut tag = &doc.root;
        while let Some(child) = tag.child("a") {
            levels += 1;
            tag = child;
        }
        assert_eq!(levels, depth);
        assert_eq!(tag.content.as_ref().map(Vec::len), Some(1));
    }
}
