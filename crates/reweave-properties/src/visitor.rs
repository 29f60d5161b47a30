// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitors over properties trees.
//!
//! - [`PropertiesVisitor`]: rewriting; each `visit_*` defaults to the
//!   matching `walk_*`, which visits children and rebuilds with `with_*`
//! - [`PropertiesSourceVisitor`]: accumulating, on top of [`Fold`]
//!
//! The cursor handed to `visit_x` has `x` as its value.

use std::sync::Arc;

use reweave_core::context::ExecutionContext;
use reweave_core::cursor::Cursor;
use reweave_core::tree::{downcast_source, SourceRef};
use reweave_core::visitor::{fold_children, Fold, TreeVisitor};

use crate::tree::{Comment, Content, Entry, File, Properties, Value};

// ============================================================================
// Rewriting visitor
// ============================================================================

pub trait PropertiesVisitor<P> {
    /// Visit a whole file from a fresh root cursor.
    fn visit_root(&mut self, file: Arc<File>, p: &mut P) -> Arc<File> {
        let cursor = Cursor::root(Properties::File(Arc::clone(&file)));
        self.visit_file(file, &cursor, p)
    }

    fn visit_file(&mut self, file: Arc<File>, cursor: &Cursor<'_, Properties>, p: &mut P) -> Arc<File> {
        walk_file(self, file, cursor, p)
    }

    /// Dispatch on the line kind.
    fn visit_content(&mut self, content: Content, cursor: &Cursor<'_, Properties>, p: &mut P) -> Content {
        match content {
            Content::Entry(entry) => Content::Entry(self.visit_entry(entry, cursor, p)),
            Content::Comment(comment) => Content::Comment(self.visit_comment(comment, cursor, p)),
        }
    }

    fn visit_entry(&mut self, entry: Arc<Entry>, cursor: &Cursor<'_, Properties>, p: &mut P) -> Arc<Entry> {
        walk_entry(self, entry, cursor, p)
    }

    fn visit_value(&mut self, value: Arc<Value>, _cursor: &Cursor<'_, Properties>, _p: &mut P) -> Arc<Value> {
        value
    }

    fn visit_comment(
        &mut self,
        comment: Arc<Comment>,
        _cursor: &Cursor<'_, Properties>,
        _p: &mut P,
    ) -> Arc<Comment> {
        comment
    }

    /// Erase this visitor for the pipeline.
    fn into_tree_visitor(self) -> Box<dyn TreeVisitor>
    where
        Self: PropertiesVisitor<ExecutionContext> + Sized + 'static,
    {
        Box::new(PropertiesTreeVisitor(self))
    }
}

pub fn walk_file<V, P>(visitor: &mut V, file: Arc<File>, cursor: &Cursor<'_, Properties>, p: &mut P) -> Arc<File>
where
    V: PropertiesVisitor<P> + ?Sized,
{
    let content = file
        .content
        .iter()
        .map(|content| {
            let child = cursor.push(Properties::from(content.clone()));
            visitor.visit_content(content.clone(), &child, p)
        })
        .collect();
    file.with_content(content)
}

pub fn walk_entry<V, P>(visitor: &mut V, entry: Arc<Entry>, cursor: &Cursor<'_, Properties>, p: &mut P) -> Arc<Entry>
where
    V: PropertiesVisitor<P> + ?Sized,
{
    let child = cursor.push(Properties::Value(Arc::clone(&entry.value)));
    let value = visitor.visit_value(Arc::clone(&entry.value), &child, p);
    entry.with_value(value)
}

/// Adapts a [`PropertiesVisitor`] to the pipeline. Sources of other grammars
/// pass through untouched.
pub struct PropertiesTreeVisitor<V>(pub V);

impl<V: PropertiesVisitor<ExecutionContext>> TreeVisitor for PropertiesTreeVisitor<V> {
    fn visit_source(&mut self, source: SourceRef, ctx: &mut ExecutionContext) -> SourceRef {
        match downcast_source::<File>(source) {
            Ok(file) => self.0.visit_root(file, ctx),
            Err(other) => other,
        }
    }
}

// ============================================================================
// Accumulating visitor
// ============================================================================

/// Per-variant hooks over [`Fold`]. Each defaults to folding the node's own
/// value with its children's.
pub trait PropertiesSourceVisitor: Fold<Properties> + Sized {
    fn visit_file(&mut self, cursor: &Cursor<'_, Properties>) -> Self::Output {
        fold_children(self, cursor, fold_properties::<Self>)
    }

    fn visit_entry(&mut self, cursor: &Cursor<'_, Properties>) -> Self::Output {
        fold_children(self, cursor, fold_properties::<Self>)
    }

    fn visit_value(&mut self, cursor: &Cursor<'_, Properties>) -> Self::Output {
        fold_children(self, cursor, fold_properties::<Self>)
    }

    fn visit_comment(&mut self, cursor: &Cursor<'_, Properties>) -> Self::Output {
        fold_children(self, cursor, fold_properties::<Self>)
    }

    /// Fold a whole file.
    fn fold_file(&mut self, file: &Arc<File>) -> Self::Output {
        let cursor = Cursor::root(Properties::File(Arc::clone(file)));
        fold_properties(self, &cursor)
    }
}

/// Dispatch to the hook for the node at `cursor`.
pub fn fold_properties<V: PropertiesSourceVisitor>(visitor: &mut V, cursor: &Cursor<'_, Properties>) -> V::Output {
    match cursor.value() {
        Properties::File(_) => visitor.visit_file(cursor),
        Properties::Entry(_) => visitor.visit_entry(cursor),
        Properties::Value(_) => visitor.visit_value(cursor),
        Properties::Comment(_) => visitor.visit_comment(cursor),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    struct Nothing;

    impl PropertiesVisitor<()> for Nothing {}

    #[test]
    fn visitor_matching_nothing_keeps_every_node() {
        let file = parse("a.properties", "# c\na=1\nb=2\n").unwrap();
        let out = Nothing.visit_root(Arc::clone(&file), &mut ());
        assert!(Arc::ptr_eq(&file, &out));
    }

    struct Upper;

    impl PropertiesVisitor<()> for Upper {
        fn visit_value(&mut self, value: Arc<Value>, _: &Cursor<'_, Properties>, _: &mut ()) -> Arc<Value> {
            let text = value.text.to_uppercase();
            value.with_text(text)
        }
    }

    #[test]
    fn only_changed_paths_are_rebuilt() {
        let file = parse("a.properties", "a=x\nb=1\n").unwrap();
        let out = Upper.visit_root(Arc::clone(&file), &mut ());
        assert!(!Arc::ptr_eq(&file, &out));
        assert_eq!(out.id, file.id);
        assert!(!Arc::ptr_eq(file.entry("a").unwrap(), out.entry("a").unwrap()));
        assert!(Arc::ptr_eq(file.entry("b").unwrap(), out.entry("b").unwrap()));
    }

    struct Keys(Vec<String>);

    impl Fold<Properties> for Keys {
        type Output = usize;

        fn default_to(&mut self, cursor: &Cursor<'_, Properties>) -> usize {
            if let Properties::Entry(entry) = cursor.value() {
                self.0.push(entry.key.clone());
                1
            } else {
                0
            }
        }

        fn reduce(&mut self, left: usize, right: usize) -> usize {
            left + right
        }
    }

    impl PropertiesSourceVisitor for Keys {
        fn visit_comment(&mut self, _cursor: &Cursor<'_, Properties>) -> usize {
            0
        }
    }

    #[test]
    fn fold_visits_in_order() {
        let file = parse("a.properties", "z=1\n# c\na=2\n").unwrap();
        let mut keys = Keys(Vec::new());
        assert_eq!(keys.fold_file(&file), 2);
        assert_eq!(keys.0, vec!["z", "a"]);
    }
}
