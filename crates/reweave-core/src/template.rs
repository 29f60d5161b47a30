// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Template engine: synthesize tree fragments from text and splice them in.
//!
//! A [`Template`] is a code snippet with positional `#{}` placeholders. The
//! [`TemplateEngine`] applies it at a [`Coordinate`] in five steps:
//!
//! 1. render the snippet, substituting arguments for placeholders
//! 2. check that the coordinate's target exists in the tree
//! 3. derive the minimal parse scope from the cursor (enclosing package,
//!    imports, type, statement-or-expression position)
//! 4. parse the snippet in that scope
//! 5. splice the fragment at the insertion point and normalize formatting
//!    of the changed region
//!
//! Grammar crates plug in through [`TemplateLanguage`]. Failures are
//! [`TemplateError`]s; [`TemplateEngine::apply_or_keep`] contains them by
//! recording a diagnostic and returning the tree unchanged.

use std::fmt;

use tracing::debug;

use crate::context::ExecutionContext;
use crate::cursor::Cursor;
use crate::error::TemplateError;
use crate::style::Styles;
use crate::tree::NodeId;

// ============================================================================
// Coordinates
// ============================================================================

/// Where a fragment goes relative to the target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertionPoint {
    /// Before the target, in the target's parent list.
    Before,
    /// After the target, in the target's parent list.
    After,
    /// In place of the target.
    Replace,
    /// As the first statement of the target block.
    InsertFirstStatement,
    /// As the last statement of the target block.
    InsertLastStatement,
}

impl fmt::Display for InsertionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InsertionPoint::Before => "before",
            InsertionPoint::After => "after",
            InsertionPoint::Replace => "replace",
            InsertionPoint::InsertFirstStatement => "first statement",
            InsertionPoint::InsertLastStatement => "last statement",
        };
        f.write_str(name)
    }
}

/// A target node and an insertion point.
///
/// Only meaningful against the tree it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub target: NodeId,
    pub point: InsertionPoint,
}

impl Coordinate {
    pub fn new(target: NodeId, point: InsertionPoint) -> Self {
        Coordinate { target, point }
    }

    pub fn before(target: NodeId) -> Self {
        Coordinate::new(target, InsertionPoint::Before)
    }

    pub fn after(target: NodeId) -> Self {
        Coordinate::new(target, InsertionPoint::After)
    }

    pub fn replace(target: NodeId) -> Self {
        Coordinate::new(target, InsertionPoint::Replace)
    }

    pub fn first_statement(block: NodeId) -> Self {
        Coordinate::new(block, InsertionPoint::InsertFirstStatement)
    }

    pub fn last_statement(block: NodeId) -> Self {
        Coordinate::new(block, InsertionPoint::InsertLastStatement)
    }
}

// ============================================================================
// Template
// ============================================================================

/// Placeholder for a positional template argument.
pub const PLACEHOLDER: &str = "#{}";

/// A code snippet with positional `#{}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    code: String,
}

impl Template {
    pub fn new(code: impl Into<String>) -> Self {
        Template { code: code.into() }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Number of `#{}` placeholders.
    pub fn parameter_count(&self) -> usize {
        self.code.matches(PLACEHOLDER).count()
    }

    /// Substitute `args` for the placeholders, in order.
    pub fn render(&self, args: &[&str]) -> Result<String, TemplateError> {
        let expected = self.parameter_count();
        if expected != args.len() {
            return Err(TemplateError::ParameterMismatch {
                expected,
                actual: args.len(),
            });
        }
        let mut rendered = String::with_capacity(self.code.len());
        let mut rest = self.code.as_str();
        for arg in args {
            if let Some(pos) = rest.find(PLACEHOLDER) {
                rendered.push_str(&rest[..pos]);
                rendered.push_str(arg);
                rest = &rest[pos + PLACEHOLDER.len()..];
            }
        }
        rendered.push_str(rest);
        Ok(rendered)
    }
}

// ============================================================================
// Language plug-in
// ============================================================================

/// Result of splicing a fragment into a tree.
#[derive(Debug, Clone)]
pub struct Spliced<N> {
    pub tree: N,
    /// Smallest node whose children changed.
    pub changed: NodeId,
    /// Roots of the inserted fragment.
    pub inserted: Vec<NodeId>,
}

/// The grammar-specific half of template application.
pub trait TemplateLanguage {
    /// The grammar's node sum type.
    type Node: Clone;
    /// Parsed snippet, detached from any tree.
    type Fragment;
    /// What the parser needs to know about the surrounding code.
    type Scope;

    /// True if `target` is `tree` or one of its descendants.
    fn contains(&self, tree: &Self::Node, target: NodeId) -> bool;

    /// Minimal scope for parsing a snippet placed at `coordinate`.
    fn scope(
        &self,
        cursor: &Cursor<'_, Self::Node>,
        tree: &Self::Node,
        coordinate: &Coordinate,
    ) -> Result<Self::Scope, TemplateError>;

    /// Parse a rendered snippet. The error is a parser diagnostic.
    fn parse(&self, snippet: &str, scope: &Self::Scope) -> Result<Self::Fragment, String>;

    /// Insert the fragment at the coordinate.
    fn splice(
        &self,
        tree: Self::Node,
        coordinate: &Coordinate,
        fragment: Self::Fragment,
    ) -> Result<Spliced<Self::Node>, TemplateError>;

    /// Normalize formatting of the changed region.
    fn normalize(
        &self,
        cursor: &Cursor<'_, Self::Node>,
        spliced: Spliced<Self::Node>,
        styles: &Styles,
    ) -> Self::Node;
}

/// Applies templates through a [`TemplateLanguage`].
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine<L> {
    language: L,
}

impl<L: TemplateLanguage> TemplateEngine<L> {
    pub fn new(language: L) -> Self {
        TemplateEngine { language }
    }

    pub fn language(&self) -> &L {
        &self.language
    }

    /// Apply `template` to `tree` at `coordinate`.
    ///
    /// `cursor` is the position of `tree` (or of its nearest visited
    /// ancestor) in the traversal; it supplies the parse scope.
    pub fn apply(
        &self,
        cursor: &Cursor<'_, L::Node>,
        tree: L::Node,
        coordinate: Coordinate,
        template: &Template,
        args: &[&str],
        ctx: &ExecutionContext,
    ) -> Result<L::Node, TemplateError> {
        debug!(
            target_node = %coordinate.target,
            point = %coordinate.point,
            "applying template"
        );
        let snippet = template.render(args)?;
        if !self.language.contains(&tree, coordinate.target) {
            return Err(TemplateError::CoordinateNotFound {
                target: coordinate.target,
            });
        }
        let scope = self.language.scope(cursor, &tree, &coordinate)?;
        let fragment = self
            .language
            .parse(&snippet, &scope)
            .map_err(|diagnostic| TemplateError::Parse {
                snippet: snippet.clone(),
                diagnostic,
            })?;
        let spliced = self.language.splice(tree, &coordinate, fragment)?;
        Ok(self.language.normalize(cursor, spliced, ctx.styles()))
    }

    /// Like [`apply`](Self::apply), but a failure is recorded in `ctx` and
    /// the original tree is returned.
    pub fn apply_or_keep(
        &self,
        cursor: &Cursor<'_, L::Node>,
        tree: L::Node,
        coordinate: Coordinate,
        template: &Template,
        args: &[&str],
        ctx: &mut ExecutionContext,
    ) -> L::Node {
        match self.apply(cursor, tree.clone(), coordinate, template, args, ctx) {
            Ok(applied) => applied,
            Err(err) => {
                ctx.record_template_error(coordinate.target, &err);
                tree
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DiagnosticKind;

    #[test]
    fn render_substitutes_in_order() {
        let template = Template::new("#{}.set#{}(value)");
        assert_eq!(template.parameter_count(), 2);
        assert_eq!(template.render(&["this", "Foo"]).unwrap(), "this.setFoo(value)");
    }

    #[test]
    fn render_checks_arity() {
        let template = Template::new("return #{};");
        assert_eq!(
            template.render(&[]).unwrap_err(),
            TemplateError::ParameterMismatch {
                expected: 1,
                actual: 0
            }
        );
    }

    /// A toy grammar: a list of words, each with an id.
    #[derive(Debug, Clone, PartialEq)]
    struct Words(Vec<(NodeId, String)>);

    struct WordLanguage;

    impl TemplateLanguage for WordLanguage {
        type Node = Words;
        type Fragment = String;
        type Scope = ();

        fn contains(&self, tree: &Words, target: NodeId) -> bool {
            tree.0.iter().any(|(id, _)| *id == target)
        }

        fn scope(&self, _: &Cursor<'_, Words>, _: &Words, _: &Coordinate) -> Result<(), TemplateError> {
            Ok(())
        }

        fn parse(&self, snippet: &str, _: &()) -> Result<String, String> {
            if snippet.contains(' ') {
                Err("a word cannot contain spaces".to_string())
            } else {
                Ok(snippet.to_string())
            }
        }

        fn splice(
            &self,
            tree: Words,
            coordinate: &Coordinate,
            fragment: String,
        ) -> Result<Spliced<Words>, TemplateError> {
            let mut words = tree.0;
            let pos = words
                .iter()
                .position(|(id, _)| *id == coordinate.target)
                .ok_or(TemplateError::CoordinateNotFound {
                    target: coordinate.target,
                })?;
            let id = NodeId::random();
            match coordinate.point {
                InsertionPoint::Before => words.insert(pos, (id, fragment)),
                InsertionPoint::After => words.insert(pos + 1, (id, fragment)),
                InsertionPoint::Replace => words[pos] = (id, fragment),
                other => {
                    return Err(TemplateError::InvalidInsertionPoint {
                        point: other.to_string(),
                        kind: "word",
                    })
                }
            }
            Ok(Spliced {
                tree: Words(words),
                changed: coordinate.target,
                inserted: vec![id],
            })
        }

        fn normalize(&self, _: &Cursor<'_, Words>, spliced: Spliced<Words>, _: &Styles) -> Words {
            Words(
                spliced
                    .tree
                    .0
                    .into_iter()
                    .map(|(id, w)| (id, w.to_lowercase()))
                    .collect(),
            )
        }
    }

    fn words(list: &[&str]) -> Words {
        Words(list.iter().map(|w| (NodeId::random(), w.to_string())).collect())
    }

    fn text(words: &Words) -> Vec<&str> {
        words.0.iter().map(|(_, w)| w.as_str()).collect()
    }

    #[test]
    fn apply_splices_and_normalizes() {
        let engine = TemplateEngine::new(WordLanguage);
        let tree = words(&["a", "c"]);
        let target = tree.0[1].0;
        let cursor = Cursor::root(tree.clone());
        let ctx = ExecutionContext::new();

        let out = engine
            .apply(&cursor, tree, Coordinate::before(target), &Template::new("#{}"), &["B"], &ctx)
            .unwrap();
        assert_eq!(text(&out), vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_target_is_contained() {
        let engine = TemplateEngine::new(WordLanguage);
        let tree = words(&["a", "b"]);
        let cursor = Cursor::root(tree.clone());
        let mut ctx = ExecutionContext::new();

        let gone = NodeId::random();
        let out = engine.apply_or_keep(
            &cursor,
            tree.clone(),
            Coordinate::replace(gone),
            &Template::new("x"),
            &[],
            &mut ctx,
        );
        assert_eq!(out, tree);
        assert_eq!(ctx.diagnostics()[0].kind, DiagnosticKind::CoordinateNotFound);
    }

    #[test]
    fn parse_failure_carries_snippet_and_diagnostic() {
        let engine = TemplateEngine::new(WordLanguage);
        let tree = words(&["a"]);
        let target = tree.0[0].0;
        let cursor = Cursor::root(tree.clone());
        let ctx = ExecutionContext::new();

        let err = engine
            .apply(&cursor, tree, Coordinate::replace(target), &Template::new("two words"), &[], &ctx)
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::Parse {
                snippet: "two words".to_string(),
                diagnostic: "a word cannot contain spaces".to_string(),
            }
        );
    }

    #[test]
    fn unsupported_point_is_rejected() {
        let engine = TemplateEngine::new(WordLanguage);
        let tree = words(&["a"]);
        let target = tree.0[0].0;
        let cursor = Cursor::root(tree.clone());
        let ctx = ExecutionContext::new();

        let err = engine
            .apply(&cursor, tree, Coordinate::last_statement(target), &Template::new("b"), &[], &ctx)
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidInsertionPoint { .. }));
    }
}
