// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Template support: new lines of a properties file from text.
//!
//! Snippets parse as whole lines. They can go before, after or in place of
//! an existing line, or first or last in the file.

use std::sync::Arc;

use reweave_core::context::ExecutionContext;
use reweave_core::cursor::Cursor;
use reweave_core::error::TemplateError;
use reweave_core::style::Styles;
use reweave_core::template::{Coordinate, InsertionPoint, Spliced, Template, TemplateEngine, TemplateLanguage};
use reweave_core::tree::{NodeId, Space, TreeNode};

use crate::parser::parse_fragment;
use crate::tree::{Content, File, Properties};

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesTemplateLanguage;

impl PropertiesTemplateLanguage {
    /// An engine for this language.
    pub fn engine() -> TemplateEngine<Self> {
        TemplateEngine::new(PropertiesTemplateLanguage)
    }
}

impl TemplateLanguage for PropertiesTemplateLanguage {
    type Node = Properties;
    type Fragment = Vec<Content>;
    type Scope = ();

    fn contains(&self, tree: &Properties, target: NodeId) -> bool {
        tree.id() == target || tree.children().iter().any(|child| self.contains(child, target))
    }

    fn scope(&self, _cursor: &Cursor<'_, Properties>, _tree: &Properties, _coordinate: &Coordinate) -> Result<(), TemplateError> {
        Ok(())
    }

    fn parse(&self, snippet: &str, _scope: &()) -> Result<Vec<Content>, String> {
        let content = parse_fragment(snippet)?;
        if content.is_empty() {
            return Err("snippet contains no properties".to_string());
        }
        Ok(content)
    }

    fn splice(
        &self,
        tree: Properties,
        coordinate: &Coordinate,
        fragment: Vec<Content>,
    ) -> Result<Spliced<Properties>, TemplateError> {
        let file = match tree {
            Properties::File(file) => file,
            other => {
                return Err(TemplateError::InvalidInsertionPoint {
                    point: coordinate.point.to_string(),
                    kind: other.kind(),
                })
            }
        };
        let inserted: Vec<NodeId> = fragment.iter().map(Content::id).collect();
        let mut content = file.content.clone();

        if coordinate.target == file.id {
            match coordinate.point {
                InsertionPoint::InsertFirstStatement => {
                    content.splice(0..0, fragment);
                }
                InsertionPoint::InsertLastStatement => content.extend(fragment),
                point => {
                    return Err(TemplateError::InvalidInsertionPoint {
                        point: point.to_string(),
                        kind: "File",
                    })
                }
            }
        } else {
            let Some(pos) = content.iter().position(|c| c.id() == coordinate.target) else {
                // The target is a value, which is not a line.
                return Err(TemplateError::InvalidInsertionPoint {
                    point: coordinate.point.to_string(),
                    kind: "Value",
                });
            };
            match coordinate.point {
                InsertionPoint::Before => {
                    content.splice(pos..pos, fragment);
                }
                InsertionPoint::After => {
                    content.splice(pos + 1..pos + 1, fragment);
                }
                InsertionPoint::Replace => {
                    let prefix = content[pos].prefix().clone();
                    let mut fragment = fragment;
                    if let Some(first) = fragment.first_mut() {
                        *first = first.clone().with_prefix(prefix);
                    }
                    content.splice(pos..=pos, fragment);
                }
                point => {
                    return Err(TemplateError::InvalidInsertionPoint {
                        point: point.to_string(),
                        kind: if content[pos].as_entry().is_some() { "Entry" } else { "Comment" },
                    })
                }
            }
        }

        Ok(Spliced {
            changed: file.id,
            tree: Properties::File(file.with_content(content)),
            inserted,
        })
    }

    /// Every line but the first starts on a new line.
    fn normalize(&self, _cursor: &Cursor<'_, Properties>, spliced: Spliced<Properties>, _styles: &Styles) -> Properties {
        let Properties::File(file) = spliced.tree else {
            return spliced.tree;
        };
        let content = file
            .content
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if i > 0 && !line.prefix().whitespace.contains('\n') {
                    let whitespace = format!("\n{}", line.prefix().whitespace);
                    line.clone().with_prefix(Space::format(whitespace))
                } else {
                    line.clone()
                }
            })
            .collect();
        Properties::File(file.with_content(content))
    }
}

/// Apply a template to a file, keeping the file and recording a diagnostic
/// if it fails.
pub fn apply_to_file(
    cursor: &Cursor<'_, Properties>,
    file: Arc<File>,
    coordinate: Coordinate,
    template: &Template,
    args: &[&str],
    ctx: &mut ExecutionContext,
) -> Arc<File> {
    let engine = PropertiesTemplateLanguage::engine();
    match engine.apply_or_keep(cursor, Properties::File(Arc::clone(&file)), coordinate, template, args, ctx) {
        Properties::File(applied) => applied,
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use reweave_core::print::Codegen;
    use reweave_core::DiagnosticKind;

    fn apply(source: &str, coordinate: impl Fn(&File) -> Coordinate, code: &str) -> Result<String, TemplateError> {
        let file = parse("a.properties", source).unwrap();
        let cursor = Cursor::root(Properties::File(Arc::clone(&file)));
        let engine = PropertiesTemplateLanguage::engine();
        let out = engine.apply(
            &cursor,
            Properties::File(Arc::clone(&file)),
            coordinate(&file),
            &Template::new(code),
            &[],
            &ExecutionContext::new(),
        )?;
        Ok(out.print())
    }

    #[test]
    fn insert_last_adds_a_line() {
        let out = apply("a=1\n", |f| Coordinate::last_statement(f.id), "b=2").unwrap();
        assert_eq!(out, "a=1\nb=2\n");
    }

    #[test]
    fn insert_first_pushes_the_old_first_line_down() {
        let out = apply("a=1", |f| Coordinate::first_statement(f.id), "# top").unwrap();
        assert_eq!(out, "# top\na=1");
    }

    #[test]
    fn replace_keeps_the_prefix() {
        let out = apply(
            "a=1\n\n  b=2\nc=3",
            |f| Coordinate::replace(f.entry("b").unwrap().id),
            "b=two",
        )
        .unwrap();
        assert_eq!(out, "a=1\n\n  b=two\nc=3");
    }

    #[test]
    fn before_and_after() {
        let before = apply("a=1\nc=3", |f| Coordinate::before(f.entry("c").unwrap().id), "b=2").unwrap();
        assert_eq!(before, "a=1\nb=2\nc=3");
        let after = apply("a=1\nc=3", |f| Coordinate::after(f.entry("c").unwrap().id), "d=4").unwrap();
        assert_eq!(after, "a=1\nc=3\nd=4");
    }

    #[test]
    fn values_are_not_insertion_targets() {
        let err = apply("a=1", |f| Coordinate::before(f.entry("a").unwrap().value.id), "b=2").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidInsertionPoint { kind: "Value", .. }));
    }

    #[test]
    fn target_removed_earlier_is_contained() {
        let file = parse("a.properties", "a=1\nb=2\nc=3").unwrap();
        let removed = file.entry("b").unwrap().id;
        let remaining: Vec<Content> = file
            .content
            .iter()
            .filter(|c| !matches!(c, Content::Entry(entry) if entry.id == removed))
            .cloned()
            .collect();
        let pruned = Arc::clone(&file).with_content(remaining);

        let cursor = Cursor::root(Properties::File(Arc::clone(&pruned)));
        let mut ctx = ExecutionContext::new();
        let out = apply_to_file(
            &cursor,
            Arc::clone(&pruned),
            Coordinate::replace(removed),
            &Template::new("b=two"),
            &[],
            &mut ctx,
        );
        assert!(Arc::ptr_eq(&pruned, &out));
        assert!(Arc::ptr_eq(file.entry("a").unwrap(), out.entry("a").unwrap()));
        assert!(Arc::ptr_eq(file.entry("c").unwrap(), out.entry("c").unwrap()));
        assert!(out.entry("b").is_none());
        assert_eq!(ctx.diagnostics()[0].kind, DiagnosticKind::CoordinateNotFound);
    }
}
