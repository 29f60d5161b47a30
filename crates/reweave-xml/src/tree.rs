// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node types for XML documents.
//!
//! Whitespace before a node is its prefix. Whitespace before a closing tag
//! belongs to the [`Closing`] part of its [`Tag`], and whitespace before
//! `>` or `/>` is a tag's `before_close`. Text keeps its entities as written.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reweave_core::print::Codegen;
use reweave_core::tree::{NodeId, SourceFile, Space, TreeNode, Unchanged};
use reweave_core::{impl_tree, unchanged_enum, with_methods, Markers};

/// Any XML node, as seen by cursors and accumulating visitors.
#[derive(Debug, Clone)]
pub enum Xml {
    Document(Arc<Document>),
    Prolog(Arc<Prolog>),
    XmlDecl(Arc<XmlDecl>),
    ProcessingInstruction(Arc<ProcessingInstruction>),
    DocTypeDecl(Arc<DocTypeDecl>),
    Tag(Arc<Tag>),
    Attribute(Arc<Attribute>),
    CharData(Arc<CharData>),
    Comment(Arc<Comment>),
}

impl Xml {
    pub fn as_tag(&self) -> Option<&Arc<Tag>> {
        match self {
            Xml::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

/// Something inside a tag.
#[derive(Debug, Clone)]
pub enum Content {
    Tag(Arc<Tag>),
    CharData(Arc<CharData>),
    Comment(Arc<Comment>),
    ProcessingInstruction(Arc<ProcessingInstruction>),
}

unchanged_enum!(Content { Tag, CharData, Comment, ProcessingInstruction });

impl Content {
    pub fn id(&self) -> NodeId {
        match self {
            Content::Tag(n) => n.id,
            Content::CharData(n) => n.id,
            Content::Comment(n) => n.id,
            Content::ProcessingInstruction(n) => n.id,
        }
    }
}

impl From<Content> for Xml {
    fn from(content: Content) -> Self {
        match content {
            Content::Tag(n) => Xml::Tag(n),
            Content::CharData(n) => Xml::CharData(n),
            Content::Comment(n) => Xml::Comment(n),
            Content::ProcessingInstruction(n) => Xml::ProcessingInstruction(n),
        }
    }
}

/// Something between the XML declaration and the root tag.
#[derive(Debug, Clone)]
pub enum Misc {
    Comment(Arc<Comment>),
    ProcessingInstruction(Arc<ProcessingInstruction>),
    DocTypeDecl(Arc<DocTypeDecl>),
}

unchanged_enum!(Misc { Comment, ProcessingInstruction, DocTypeDecl });

impl From<Misc> for Xml {
    fn from(misc: Misc) -> Self {
        match misc {
            Misc::Comment(n) => Xml::Comment(n),
            Misc::ProcessingInstruction(n) => Xml::ProcessingInstruction(n),
            Misc::DocTypeDecl(n) => Xml::DocTypeDecl(n),
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone)]
pub struct Document {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: PathBuf,
    pub prolog: Arc<Prolog>,
    pub root: Arc<Tag>,
    pub eof: Space,
}

with_methods!(Document {
    prefix: Space,
    markers: Markers,
    source_path: PathBuf,
    prolog: Arc<Prolog>,
    root: Arc<Tag>,
    eof: Space,
});

#[derive(Debug, Clone)]
pub struct Prolog {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub xml_decl: Option<Arc<XmlDecl>>,
    pub misc: Vec<Misc>,
}

with_methods!(Prolog {
    xml_decl: Option<Arc<XmlDecl>>,
    misc: Vec<Misc>,
});

/// `<?xml version="1.0"?>`
#[derive(Debug, Clone)]
pub struct XmlDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub attributes: Vec<Arc<Attribute>>,
    pub before_close: Space,
}

with_methods!(XmlDecl {
    attributes: Vec<Arc<Attribute>>,
    before_close: Space,
});

/// `<?target data?>`
#[derive(Debug, Clone)]
pub struct ProcessingInstruction {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub target: String,
    /// Everything between the target and `?>`, leading whitespace included.
    pub data: String,
}

with_methods!(ProcessingInstruction {
    prefix: Space,
    data: String,
});

/// `<!DOCTYPE ...>`, kept as written.
#[derive(Debug, Clone)]
pub struct DocTypeDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Everything between `<!DOCTYPE` and the final `>`.
    pub text: String,
}

with_methods!(DocTypeDecl {
    prefix: Space,
    text: String,
});

/// The end of a tag with content: `</name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closing {
    pub prefix: Space,
    pub name: String,
    pub before_close: Space,
}

impl Unchanged for Closing {
    fn unchanged(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: String,
    pub attributes: Vec<Arc<Attribute>>,
    pub before_close: Space,
    /// `None` for a self-closing tag.
    pub content: Option<Vec<Content>>,
    /// Present exactly when `content` is.
    pub closing: Option<Closing>,
}

with_methods!(Tag {
    prefix: Space,
    markers: Markers,
    name: String,
    attributes: Vec<Arc<Attribute>>,
    before_close: Space,
    content: Option<Vec<Content>>,
    closing: Option<Closing>,
});

impl Tag {
    /// Child tags, in order.
    pub fn children(&self) -> impl Iterator<Item = &Arc<Tag>> {
        self.content.iter().flatten().filter_map(|c| match c {
            Content::Tag(tag) => Some(tag),
            _ => None,
        })
    }

    /// First child tag with this name.
    pub fn child(&self, name: &str) -> Option<&Arc<Tag>> {
        self.children().find(|tag| tag.name == name)
    }

    /// Trimmed text of a tag whose only content is character data.
    pub fn value(&self) -> Option<&str> {
        match self.content.as_deref() {
            Some([Content::CharData(text)]) => Some(text.text.trim()),
            _ => None,
        }
    }

    /// Text of the named child, see [`value`](Self::value).
    pub fn child_value(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|tag| tag.value())
    }

    pub fn attribute(&self, key: &str) -> Option<&Arc<Attribute>> {
        self.attributes.iter().find(|a| a.key == key)
    }

    /// This tag with its content replaced by `value` as character data.
    ///
    /// Existing single text content is updated in place, so setting the
    /// current value returns the same node. A self-closing tag gains a
    /// closing tag.
    pub fn with_value(self: Arc<Self>, value: &str) -> Arc<Self> {
        let closing = self.closing.clone().unwrap_or_else(|| Closing {
            prefix: Space::EMPTY,
            name: self.name.clone(),
            before_close: Space::EMPTY,
        });
        let text = match self.content.as_deref() {
            Some([Content::CharData(text)]) => Arc::clone(text).with_text(value.to_string()),
            _ => Arc::new(CharData::build(value)),
        };
        let before_close = if self.content.is_none() {
            Space::EMPTY
        } else {
            self.before_close.clone()
        };
        self.with_before_close(before_close)
            .with_content(Some(vec![Content::CharData(text)]))
            .with_closing(Some(closing))
    }
}

/// `key="value"`
#[derive(Debug, Clone)]
pub struct Attribute {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub key: String,
    pub before_equals: Space,
    pub after_equals: Space,
    pub quote: Quote,
    pub value: String,
}

with_methods!(Attribute {
    prefix: Space,
    key: String,
    value: String,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_str(self) -> &'static str {
        match self {
            Quote::Double => "\"",
            Quote::Single => "'",
        }
    }
}

/// Text or a CDATA section. Text runs to the next `<`.
#[derive(Debug, Clone)]
pub struct CharData {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub cdata: bool,
    pub text: String,
}

with_methods!(CharData {
    prefix: Space,
    text: String,
});

impl CharData {
    /// Plain text with a fresh id.
    pub fn build(text: &str) -> Self {
        CharData {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::new(),
            cdata: false,
            text: text.to_string(),
        }
    }
}

/// `<!-- text -->`
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub text: String,
}

with_methods!(Comment {
    prefix: Space,
    text: String,
});

impl_tree!(
    Document,
    Prolog,
    XmlDecl,
    ProcessingInstruction,
    DocTypeDecl,
    Tag,
    Attribute,
    CharData,
    Comment,
);

// ============================================================================
// Node sum
// ============================================================================

impl TreeNode for Xml {
    fn id(&self) -> NodeId {
        match self {
            Xml::Document(n) => n.id,
            Xml::Prolog(n) => n.id,
            Xml::XmlDecl(n) => n.id,
            Xml::ProcessingInstruction(n) => n.id,
            Xml::DocTypeDecl(n) => n.id,
            Xml::Tag(n) => n.id,
            Xml::Attribute(n) => n.id,
            Xml::CharData(n) => n.id,
            Xml::Comment(n) => n.id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Xml::Document(_) => "Document",
            Xml::Prolog(_) => "Prolog",
            Xml::XmlDecl(_) => "XmlDecl",
            Xml::ProcessingInstruction(_) => "ProcessingInstruction",
            Xml::DocTypeDecl(_) => "DocTypeDecl",
            Xml::Tag(_) => "Tag",
            Xml::Attribute(_) => "Attribute",
            Xml::CharData(_) => "CharData",
            Xml::Comment(_) => "Comment",
        }
    }

    fn children(&self) -> Vec<Self> {
        match self {
            Xml::Document(doc) => vec![
                Xml::Prolog(Arc::clone(&doc.prolog)),
                Xml::Tag(Arc::clone(&doc.root)),
            ],
            Xml::Prolog(prolog) => prolog
                .xml_decl
                .iter()
                .cloned()
                .map(Xml::XmlDecl)
                .chain(prolog.misc.iter().cloned().map(Xml::from))
                .collect(),
            Xml::XmlDecl(decl) => decl.attributes.iter().cloned().map(Xml::Attribute).collect(),
            Xml::Tag(tag) => tag
                .attributes
                .iter()
                .cloned()
                .map(Xml::Attribute)
                .chain(tag.content.iter().flatten().cloned().map(Xml::from))
                .collect(),
            Xml::ProcessingInstruction(_)
            | Xml::DocTypeDecl(_)
            | Xml::Attribute(_)
            | Xml::CharData(_)
            | Xml::Comment(_) => Vec::new(),
        }
    }
}

impl SourceFile for Document {
    fn id(&self) -> NodeId {
        self.id
    }

    fn source_path(&self) -> &Path {
        &self.source_path
    }

    fn markers(&self) -> &Markers {
        &self.markers
    }

    fn language(&self) -> &'static str {
        "xml"
    }

    fn print(&self) -> String {
        Codegen::print(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
