// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar-independent building blocks of the immutable node model.
//!
//! Every grammar crate defines its own closed set of node structs and a sum
//! type over them. What they share lives here:
//!
//! - [`NodeId`]: identity that survives rewrites of a node
//! - [`Space`] and [`Comment`]: leading whitespace and comments ("prefix")
//! - [`Padded`], [`LeftPadded`] and [`Container`]: elements carrying the
//!   whitespace that surrounds a delimiter
//! - [`Unchanged`]: the identity test behind every `with_*` update
//! - [`SourceFile`]: the erased view of a parsed file the pipeline works on
//!
//! ## Persistence
//!
//! Nodes are shared behind `Arc`. The `with_*` methods generated by
//! [`with_methods!`](crate::with_methods) consume an `Arc<Self>` and return the
//! same `Arc` when the replacement is [`Unchanged`], so a traversal that
//! changes nothing hands back the exact input allocation.

use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::marker::Markers;

// ============================================================================
// Node identity
// ============================================================================

/// Identity of a node, stable across `with_*` rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Allocate a fresh, process-unique id.
    pub fn random() -> Self {
        NodeId(rand_u64())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Generate a unique u64.
///
/// Mixes the current time, the process id, the thread id and an atomic
/// counter through SHA-256.
fn rand_u64() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let thread_id = format!("{:?}", std::thread::current().id());
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(thread_id.as_bytes());
    hasher.update(counter.to_le_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

// ============================================================================
// Whitespace and comments
// ============================================================================

/// Comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentStyle {
    /// `// text` up to the end of the line.
    Line,
    /// `/* text */`.
    Block,
}

/// A comment inside a [`Space`], followed by the whitespace after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comment {
    pub style: CommentStyle,
    /// Comment body without its delimiters.
    pub text: String,
    pub suffix: String,
}

/// Whitespace and comments preceding a syntax element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Space {
    /// Whitespace before the first comment.
    pub whitespace: String,
    pub comments: Vec<Comment>,
}

impl Space {
    pub const EMPTY: Space = Space {
        whitespace: String::new(),
        comments: Vec::new(),
    };

    /// Space made only of whitespace.
    pub fn format(whitespace: impl Into<String>) -> Self {
        Space {
            whitespace: whitespace.into(),
            comments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty() && self.comments.is_empty()
    }

    /// Whitespace directly preceding the element: the suffix of the last
    /// comment, or the plain whitespace when there are no comments.
    pub fn last_whitespace(&self) -> &str {
        match self.comments.last() {
            Some(comment) => &comment.suffix,
            None => &self.whitespace,
        }
    }

    /// Indentation of the element: the text after the last newline of
    /// [`last_whitespace`](Self::last_whitespace), or empty when the element
    /// does not start a line.
    pub fn indent(&self) -> &str {
        let ws = self.last_whitespace();
        match ws.rfind('\n') {
            Some(pos) => &ws[pos + 1..],
            None => "",
        }
    }

    /// Number of line breaks directly preceding the element.
    pub fn newlines(&self) -> usize {
        self.last_whitespace().matches('\n').count()
    }

    /// Replace the whitespace directly preceding the element, keeping any
    /// comments.
    pub fn with_last_whitespace(&self, whitespace: impl Into<String>) -> Space {
        let mut space = self.clone();
        match space.comments.last_mut() {
            Some(comment) => comment.suffix = whitespace.into(),
            None => space.whitespace = whitespace.into(),
        }
        space
    }
}

// ============================================================================
// Identity test
// ============================================================================

/// Identity test used by `with_*` updates.
///
/// Child subtrees compare by pointer; leaf values compare by value.
pub trait Unchanged {
    fn unchanged(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Unchanged for Arc<T> {
    fn unchanged(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Unchanged> Unchanged for Option<T> {
    fn unchanged(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.unchanged(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Unchanged> Unchanged for Vec<T> {
    fn unchanged(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.unchanged(b))
    }
}

macro_rules! unchanged_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Unchanged for $ty {
                fn unchanged(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

unchanged_by_value!(String, bool, u32, usize, NodeId, Space, Markers, std::path::PathBuf);

/// Implement [`Unchanged`] for a grammar sum type whose variants each wrap a
/// single `Arc` node.
#[macro_export]
macro_rules! unchanged_enum {
    ($name:ident { $($variant:ident),* $(,)? }) => {
        impl $crate::tree::Unchanged for $name {
            fn unchanged(&self, other: &Self) -> bool {
                match (self, other) {
                    $(
                        ($name::$variant(a), $name::$variant(b)) => ::std::sync::Arc::ptr_eq(a, b),
                    )*
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

/// Generate persistent `with_*` setters for a node struct.
///
/// Each `with_field(self: Arc<Self>, value)` returns `self` when `value` is
/// [`Unchanged`] from the current field, otherwise a rebuilt node keeping the
/// same id.
#[macro_export]
macro_rules! with_methods {
    ($node:ty { $($field:ident : $ty:ty),* $(,)? }) => {
        $crate::paste::paste! {
            impl $node {
                $(
                    #[doc = concat!("Return this node with `", stringify!($field), "` replaced.")]
                    pub fn [<with_ $field>](
                        self: ::std::sync::Arc<Self>,
                        $field: $ty,
                    ) -> ::std::sync::Arc<Self> {
                        if $crate::tree::Unchanged::unchanged(&self.$field, &$field) {
                            return self;
                        }
                        let mut node = ::std::sync::Arc::unwrap_or_clone(self);
                        node.$field = $field;
                        ::std::sync::Arc::new(node)
                    }
                )*
            }
        }
    };
}

// ============================================================================
// Padding
// ============================================================================

/// An element followed by the space before its trailing delimiter.
#[derive(Debug, Clone, PartialEq)]
pub struct Padded<T> {
    pub element: T,
    pub after: Space,
}

impl<T> Padded<T> {
    pub fn new(element: T, after: Space) -> Self {
        Padded { element, after }
    }

    pub fn build(element: T) -> Self {
        Padded {
            element,
            after: Space::EMPTY,
        }
    }

    pub fn with_element(self, element: T) -> Self {
        Padded {
            element,
            after: self.after,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Padded<U> {
        Padded {
            element: f(self.element),
            after: self.after,
        }
    }
}

impl<T: Unchanged> Unchanged for Padded<T> {
    fn unchanged(&self, other: &Self) -> bool {
        self.element.unchanged(&other.element) && self.after == other.after
    }
}

/// An element preceded by the space before its leading delimiter.
#[derive(Debug, Clone, PartialEq)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub element: T,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Space, element: T) -> Self {
        LeftPadded { before, element }
    }

    pub fn build(element: T) -> Self {
        LeftPadded {
            before: Space::EMPTY,
            element,
        }
    }

    pub fn with_element(self, element: T) -> Self {
        LeftPadded {
            before: self.before,
            element,
        }
    }
}

impl<T: Unchanged> Unchanged for LeftPadded<T> {
    fn unchanged(&self, other: &Self) -> bool {
        self.before == other.before && self.element.unchanged(&other.element)
    }
}

/// A delimited list, such as call arguments: `before(a, b)`.
///
/// `before` is the space preceding the opening delimiter; each element's
/// `after` is the space preceding the following separator or the closing
/// delimiter. An empty list keeps its inner whitespace in `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Container<T> {
    pub before: Space,
    pub elements: Vec<Padded<T>>,
    pub end: Space,
}

impl<T> Container<T> {
    pub fn empty() -> Self {
        Container {
            before: Space::EMPTY,
            elements: Vec::new(),
            end: Space::EMPTY,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().map(|p| &p.element)
    }

    pub fn with_elements(self, elements: Vec<Padded<T>>) -> Self {
        Container {
            before: self.before,
            elements,
            end: self.end,
        }
    }
}

impl<T: Unchanged> Unchanged for Container<T> {
    fn unchanged(&self, other: &Self) -> bool {
        self.before == other.before && self.end == other.end && self.elements.unchanged(&other.elements)
    }
}

// ============================================================================
// Node capabilities
// ============================================================================

/// Fields every concrete node struct carries.
pub trait Tree {
    fn id(&self) -> NodeId;
    fn prefix(&self) -> &Space;
    fn markers(&self) -> &Markers;
}

/// Implement [`Tree`] for node structs with `id`, `prefix` and `markers`
/// fields.
#[macro_export]
macro_rules! impl_tree {
    ($($node:ty),* $(,)?) => {
        $(
            impl $crate::tree::Tree for $node {
                fn id(&self) -> $crate::tree::NodeId {
                    self.id
                }
                fn prefix(&self) -> &$crate::tree::Space {
                    &self.prefix
                }
                fn markers(&self) -> &$crate::marker::Markers {
                    &self.markers
                }
            }
        )*
    };
}

/// A grammar's sum type over its node structs, as seen by the cursor and the
/// accumulating visitors.
pub trait TreeNode: Clone {
    fn id(&self) -> NodeId;

    /// Name of the node variant, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Direct children in declared (source) order.
    fn children(&self) -> Vec<Self>;
}

/// A parsed source file, erased so pipelines can hold files of every grammar.
pub trait SourceFile: fmt::Debug + Send + Sync + 'static {
    fn id(&self) -> NodeId;
    fn source_path(&self) -> &Path;
    fn markers(&self) -> &Markers;

    /// Short grammar name, e.g. `java`.
    fn language(&self) -> &'static str;

    /// Print the file back to text.
    fn print(&self) -> String;

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Shared handle to a parsed source file.
pub type SourceRef = Arc<dyn SourceFile>;

/// True if both handles point at the same file allocation.
pub fn same_source(a: &SourceRef, b: &SourceRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Downcast an erased source to a concrete grammar root, returning the
/// original handle when it belongs to another grammar.
pub fn downcast_source<T: SourceFile>(source: SourceRef) -> Result<Arc<T>, SourceRef> {
    Arc::clone(&source)
        .into_any()
        .downcast::<T>()
        .map_err(|_| source)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Leaf {
        id: NodeId,
        prefix: Space,
        markers: Markers,
        name: String,
        child: Option<Arc<Leaf>>,
    }

    crate::with_methods!(Leaf {
        name: String,
        child: Option<Arc<Leaf>>,
        prefix: Space,
    });

    fn leaf(name: &str) -> Arc<Leaf> {
        Arc::new(Leaf {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::new(),
            name: name.to_string(),
            child: None,
        })
    }

    #[test]
    fn with_unchanged_value_returns_same_node() {
        let node = leaf("a");
        let same = Arc::clone(&node).with_name("a".to_string());
        assert!(Arc::ptr_eq(&node, &same));
    }

    #[test]
    fn with_changed_value_keeps_id() {
        let node = leaf("a");
        let keep = Arc::clone(&node);
        let renamed = node.with_name("b".to_string());
        assert!(!Arc::ptr_eq(&keep, &renamed));
        assert_eq!(renamed.id, keep.id);
        assert_eq!(keep.name, "a");
    }

    #[test]
    fn child_identity_is_by_pointer() {
        let child = leaf("c");
        let parent = leaf("p").with_child(Some(Arc::clone(&child)));
        let same = Arc::clone(&parent).with_child(Some(Arc::clone(&child)));
        assert!(Arc::ptr_eq(&parent, &same));

        let lookalike = leaf("c");
        let changed = Arc::clone(&parent).with_child(Some(lookalike));
        assert!(!Arc::ptr_eq(&parent, &changed));
    }

    #[test]
    fn node_ids_are_unique() {
        let mut ids = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(ids.insert(NodeId::random()));
        }
    }

    #[test]
    fn space_indent() {
        assert_eq!(Space::format("\n\n    ").indent(), "    ");
        assert_eq!(Space::format(" ").indent(), "");
        assert_eq!(Space::format("\n\n  ").newlines(), 2);

        let commented = Space {
            whitespace: "\n".to_string(),
            comments: vec![Comment {
                style: CommentStyle::Line,
                text: " note".to_string(),
                suffix: "\n        ".to_string(),
            }],
        };
        assert_eq!(commented.indent(), "        ");
        assert_eq!(commented.with_last_whitespace("\n  ").indent(), "  ");
    }

    #[test]
    fn padded_unchanged_compares_space() {
        let node = leaf("x");
        let a = Padded::new(Arc::clone(&node), Space::EMPTY);
        let b = Padded::new(Arc::clone(&node), Space::format(" "));
        assert!(a.unchanged(&a.clone()));
        assert!(!a.unchanged(&b));
    }
}
