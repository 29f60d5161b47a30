// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Upward-navigable traversal position.
//!
//! A [`Cursor`] is a linked stack living on the call stack of a traversal:
//! each frame borrows its parent, so walking up never allocates and a cursor
//! can never outlive the traversal that built it.
//!
//! Each frame also carries a small message map. Messages are scoped: a value
//! put on a frame is visible to that frame and, through
//! [`Cursor::get_nearest_message`], to every descendant frame.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::error::AncestorNotFound;

/// Position of a visit within a tree.
pub struct Cursor<'p, N> {
    parent: Option<&'p Cursor<'p, N>>,
    value: N,
    messages: RefCell<HashMap<String, Box<dyn Any>>>,
}

impl<N> Cursor<'static, N> {
    /// Cursor for the root of a traversal.
    pub fn root(value: N) -> Self {
        Cursor {
            parent: None,
            value,
            messages: RefCell::new(HashMap::new()),
        }
    }
}

impl<'p, N> Cursor<'p, N> {
    /// Child frame positioned at `value`.
    pub fn push(&self, value: N) -> Cursor<'_, N> {
        Cursor {
            parent: Some(self),
            value,
            messages: RefCell::new(HashMap::new()),
        }
    }

    /// The node at this position.
    pub fn value(&self) -> &N {
        &self.value
    }

    pub fn parent(&self) -> Option<&'p Cursor<'p, N>> {
        self.parent
    }

    pub fn parent_or_err(&self) -> Result<&'p Cursor<'p, N>, AncestorNotFound> {
        self.parent.ok_or(AncestorNotFound { kind: "parent" })
    }

    /// Frames from this one up to the root.
    pub fn path(&self) -> Path<'_, N> {
        Path { next: Some(self) }
    }

    /// Number of ancestors above this frame.
    pub fn depth(&self) -> usize {
        self.path().count() - 1
    }

    /// First value on the path (starting at this frame) selected by `select`.
    pub fn first_enclosing<T>(&self, select: impl Fn(&N) -> Option<T>) -> Option<T> {
        self.path().find_map(|frame| select(frame.value()))
    }

    /// Like [`first_enclosing`](Self::first_enclosing) but reports the
    /// missing ancestor kind as an error.
    pub fn first_enclosing_or_err<T>(
        &self,
        select: impl Fn(&N) -> Option<T>,
        kind: &'static str,
    ) -> Result<T, AncestorNotFound> {
        self.first_enclosing(select).ok_or(AncestorNotFound { kind })
    }

    /// Store a message on this frame.
    pub fn put_message<T: Any>(&self, key: impl Into<String>, value: T) {
        self.messages.borrow_mut().insert(key.into(), Box::new(value));
    }

    /// Message stored on this frame.
    pub fn get_message<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.messages
            .borrow()
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Message stored on this frame or the nearest ancestor carrying `key`.
    pub fn get_nearest_message<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.path().find_map(|frame| frame.get_message(key))
    }

    /// Remove and return a message stored on this frame.
    pub fn poll_message<T: Any>(&self, key: &str) -> Option<T> {
        let value = self.messages.borrow_mut().remove(key)?;
        value.downcast::<T>().ok().map(|v| *v)
    }
}

impl<N: fmt::Debug> fmt::Debug for Cursor<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("value", &self.value)
            .field("depth", &self.depth())
            .finish()
    }
}

/// Iterator over a cursor and its ancestors, nearest first.
pub struct Path<'c, N> {
    next: Option<&'c Cursor<'c, N>>,
}

impl<'c, N> Iterator for Path<'c, N> {
    type Item = &'c Cursor<'c, N>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Node {
        Class(&'static str),
        Method(&'static str),
        Block,
    }

    fn class_name(node: &Node) -> Option<&'static str> {
        match node {
            Node::Class(name) => Some(*name),
            _ => None,
        }
    }

    #[test]
    fn first_enclosing_walks_up() {
        let root = Cursor::root(Node::Class("A"));
        let method = root.push(Node::Method("setFoo"));
        let block = method.push(Node::Block);

        assert_eq!(block.first_enclosing(class_name), Some("A"));
        assert_eq!(block.depth(), 2);
        assert_eq!(block.parent().map(|p| p.value().clone()), Some(Node::Method("setFoo")));
        assert_eq!(block.path().count(), 3);
    }

    #[test]
    fn first_enclosing_includes_self() {
        let root = Cursor::root(Node::Class("A"));
        assert_eq!(root.first_enclosing(class_name), Some("A"));
    }

    #[test]
    fn missing_ancestor_is_an_error() {
        let root = Cursor::root(Node::Method("m"));
        let block = root.push(Node::Block);
        let err = block.first_enclosing_or_err(class_name, "ClassDeclaration").unwrap_err();
        assert_eq!(err.kind, "ClassDeclaration");
        assert!(root.parent_or_err().is_err());
    }

    #[test]
    fn messages_are_scoped() {
        let root = Cursor::root(Node::Class("A"));
        root.put_message("seen", 1usize);
        let child = root.push(Node::Block);
        child.put_message("local", "x".to_string());

        assert_eq!(child.get_message::<usize>("seen"), None);
        assert_eq!(child.get_nearest_message::<usize>("seen"), Some(1));
        assert_eq!(root.get_nearest_message::<String>("local"), None);
        assert_eq!(child.poll_message::<String>("local"), Some("x".to_string()));
        assert_eq!(child.get_message::<String>("local"), None);
    }
}
