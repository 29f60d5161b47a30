// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node types for `.properties` files.
//!
//! A [`File`] is a list of [`Content`] lines (entries and comments) followed
//! by trailing whitespace. Each line owns the whitespace before it in its
//! prefix, newlines included, so printing the nodes in order reproduces the
//! input exactly.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reweave_core::print::Codegen;
use reweave_core::tree::{NodeId, SourceFile, Space, TreeNode, Unchanged};
use reweave_core::{impl_tree, unchanged_enum, with_methods, Markers};

/// Any properties node, as seen by cursors and accumulating visitors.
#[derive(Debug, Clone)]
pub enum Properties {
    File(Arc<File>),
    Entry(Arc<Entry>),
    Value(Arc<Value>),
    Comment(Arc<Comment>),
}

/// A line of a properties file.
#[derive(Debug, Clone)]
pub enum Content {
    Entry(Arc<Entry>),
    Comment(Arc<Comment>),
}

unchanged_enum!(Content { Entry, Comment });

impl Content {
    pub fn id(&self) -> NodeId {
        match self {
            Content::Entry(entry) => entry.id,
            Content::Comment(comment) => comment.id,
        }
    }

    pub fn prefix(&self) -> &Space {
        match self {
            Content::Entry(entry) => &entry.prefix,
            Content::Comment(comment) => &comment.prefix,
        }
    }

    /// The same line with a different prefix.
    pub fn with_prefix(self, prefix: Space) -> Content {
        match self {
            Content::Entry(entry) => Content::Entry(entry.with_prefix(prefix)),
            Content::Comment(comment) => Content::Comment(comment.with_prefix(prefix)),
        }
    }

    pub fn as_entry(&self) -> Option<&Arc<Entry>> {
        match self {
            Content::Entry(entry) => Some(entry),
            Content::Comment(_) => None,
        }
    }
}

impl From<Content> for Properties {
    fn from(content: Content) -> Self {
        match content {
            Content::Entry(entry) => Properties::Entry(entry),
            Content::Comment(comment) => Properties::Comment(comment),
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// A parsed `.properties` file.
#[derive(Debug, Clone)]
pub struct File {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: PathBuf,
    pub content: Vec<Content>,
    /// Whitespace after the last line.
    pub eof: Space,
}

with_methods!(File {
    prefix: Space,
    markers: Markers,
    source_path: PathBuf,
    content: Vec<Content>,
    eof: Space,
});

impl File {
    pub fn entries(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.content.iter().filter_map(Content::as_entry)
    }

    /// First entry with exactly this key.
    pub fn entry(&self, key: &str) -> Option<&Arc<Entry>> {
        self.entries().find(|entry| entry.key == key)
    }
}

/// How a key is separated from its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Equals,
    Colon,
    /// Whitespace only; it lives in the value's prefix.
    None,
}

impl Delimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Equals => "=",
            Delimiter::Colon => ":",
            Delimiter::None => "",
        }
    }
}

impl Unchanged for Delimiter {
    fn unchanged(&self, other: &Self) -> bool {
        self == other
    }
}

/// `key = value`
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The key as written, escapes included.
    pub key: String,
    pub before_equals: Space,
    pub delimiter: Delimiter,
    pub value: Arc<Value>,
}

with_methods!(Entry {
    prefix: Space,
    markers: Markers,
    key: String,
    before_equals: Space,
    delimiter: Delimiter,
    value: Arc<Value>,
});

/// The text after the delimiter, continuation lines included.
#[derive(Debug, Clone)]
pub struct Value {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub text: String,
}

with_methods!(Value {
    prefix: Space,
    markers: Markers,
    text: String,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentDelimiter {
    Hash,
    Exclamation,
}

impl CommentDelimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentDelimiter::Hash => "#",
            CommentDelimiter::Exclamation => "!",
        }
    }
}

/// `# message` or `! message`
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub delimiter: CommentDelimiter,
    pub message: String,
}

with_methods!(Comment {
    prefix: Space,
    markers: Markers,
    message: String,
});

impl_tree!(File, Entry, Value, Comment);

// ============================================================================
// Node sum
// ============================================================================

impl TreeNode for Properties {
    fn id(&self) -> NodeId {
        match self {
            Properties::File(n) => n.id,
            Properties::Entry(n) => n.id,
            Properties::Value(n) => n.id,
            Properties::Comment(n) => n.id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Properties::File(_) => "File",
            Properties::Entry(_) => "Entry",
            Properties::Value(_) => "Value",
            Properties::Comment(_) => "Comment",
        }
    }

    fn children(&self) -> Vec<Self> {
        match self {
            Properties::File(file) => file.content.iter().cloned().map(Properties::from).collect(),
            Properties::Entry(entry) => vec![Properties::Value(Arc::clone(&entry.value))],
            Properties::Value(_) | Properties::Comment(_) => Vec::new(),
        }
    }
}

impl SourceFile for File {
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
        "properties"
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
