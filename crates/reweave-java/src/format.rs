// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Formatting of spliced regions.
//!
//! Only nodes a template inserted are touched. An inserted statement starts
//! on its own line, indented like its non-inserted siblings (or one step in
//! from the owning line when it has none). Lines inside it keep their
//! relative structure: nested block contents step in by the indent unit,
//! and a call chain broken across lines continues at the continuation
//! indent.

use std::collections::HashSet;
use std::sync::Arc;

use reweave_core::cursor::Cursor;
use reweave_core::style::{Styles, TabsAndIndentsStyle};
use reweave_core::template::Spliced;
use reweave_core::tree::{Comment, NodeId, Padded, Space, TreeNode};

use crate::tree::{Block, Expression, MethodInvocation, Statement, J};
use crate::visitor::{visit_j, walk_block, walk_expression, walk_method_invocation, walk_statement, JavaVisitor};

/// Normalize the region of `spliced` a template changed.
///
/// `cursor` is positioned at the spliced tree's root (or its nearest visited
/// ancestor) in the original traversal.
pub fn auto_format(cursor: &Cursor<'_, J>, spliced: Spliced<J>, styles: &Styles) -> J {
    let base = owning_indent(cursor, &spliced.tree, spliced.changed);
    let mut format = AutoFormat {
        style: &styles.tabs_and_indents,
        changed: spliced.changed,
        inserted: spliced.inserted.into_iter().collect(),
        base,
    };
    let root = Cursor::root(spliced.tree.clone());
    visit_j(&mut format, spliced.tree, &root, &mut ())
}

/// Indentation of the line the `changed` node starts on: the indent of the
/// nearest node at or above it whose prefix holds a line break.
fn owning_indent(cursor: &Cursor<'_, J>, tree: &J, changed: NodeId) -> String {
    let inner = path_to(tree, changed).unwrap_or_else(|| vec![tree.clone()]);
    let outer = cursor.path().map(|frame| frame.value()).filter(|node| node.id() != tree.id());
    inner
        .iter()
        .rev()
        .chain(outer)
        .map(J::prefix)
        .find(|prefix| prefix.newlines() > 0)
        .map(|prefix| prefix.indent().to_string())
        .unwrap_or_default()
}

/// Nodes from `node` down to `target`, both included.
pub(crate) fn path_to(node: &J, target: NodeId) -> Option<Vec<J>> {
    if node.id() == target {
        return Some(vec![node.clone()]);
    }
    node.children().iter().find_map(|child| {
        path_to(child, target).map(|mut path| {
            path.insert(0, node.clone());
            path
        })
    })
}

/// `space` with its line breaks kept and each run of whitespace that holds
/// one (before a comment, after a comment) ending in `indent` instead.
/// Whitespace without a line break comes back unchanged.
fn relined(space: &Space, indent: &str) -> Space {
    let reline = |whitespace: &str| match whitespace.matches('\n').count() {
        0 => whitespace.to_string(),
        n => format!("{}{}", "\n".repeat(n), indent),
    };
    Space {
        whitespace: reline(&space.whitespace),
        comments: space
            .comments
            .iter()
            .map(|comment| Comment {
                suffix: reline(&comment.suffix),
                ..comment.clone()
            })
            .collect(),
    }
}

struct AutoFormat<'s> {
    style: &'s TabsAndIndentsStyle,
    changed: NodeId,
    inserted: HashSet<NodeId>,
    base: String,
}

impl AutoFormat<'_> {
    /// Indent for statements of `block`.
    fn statement_indent(&self, block: &Block) -> String {
        let sibling = block
            .statements()
            .filter(|s| !self.inserted.contains(&s.id()))
            .map(Statement::prefix)
            .find(|prefix| prefix.newlines() > 0);
        match sibling {
            Some(prefix) => prefix.indent().to_string(),
            None if block.end.newlines() > 0 => format!("{}{}", block.end.indent(), self.style.indent_unit()),
            None => format!("{}{}", self.base, self.style.indent_unit()),
        }
    }
}

impl JavaVisitor<()> for AutoFormat<'_> {
    fn visit_block(&mut self, block: Arc<Block>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<Block> {
        if block.id != self.changed {
            return walk_block(self, block, cursor, p);
        }
        let indent = self.statement_indent(&block);
        // A block written on one line is broken up: every statement gets a line.
        let one_line = block.end.newlines() == 0;
        let statements: Vec<Padded<Statement>> = block
            .statements
            .iter()
            .map(|statement| {
                if !self.inserted.contains(&statement.element.id()) {
                    if one_line && statement.element.prefix().newlines() == 0 {
                        let prefix = statement.element.prefix().with_last_whitespace(format!("\n{}", indent));
                        return Padded::new(statement.element.clone().with_prefix(prefix), statement.after.clone());
                    }
                    return statement.clone();
                }
                let prefix = statement.element.prefix();
                let newlines = prefix.newlines().max(1);
                let element = statement
                    .element
                    .clone()
                    .with_prefix(prefix.with_last_whitespace("\n".repeat(newlines)));
                let mut reindent = Reindent {
                    style: self.style,
                    indent: indent.clone(),
                };
                let child = cursor.push(J::from(element.clone()));
                Padded::new(reindent.visit_statement(element, &child, p), statement.after.clone())
            })
            .collect();
        let end = if block.end.newlines() == 0 && !statements.is_empty() {
            block.end.with_last_whitespace(format!("\n{}", self.base))
        } else {
            block.end.clone()
        };
        block.with_statements(statements).with_end(end)
    }

    fn visit_expression(&mut self, expression: Expression, cursor: &Cursor<'_, J>, p: &mut ()) -> Expression {
        if self.inserted.contains(&expression.id()) {
            let mut reindent = Reindent {
                style: self.style,
                indent: self.base.clone(),
            };
            return reindent.visit_expression(expression, cursor, p);
        }
        walk_expression(self, expression, cursor, p)
    }
}

/// Re-indents a detached fragment so its first line sits at `indent`.
struct Reindent<'s> {
    style: &'s TabsAndIndentsStyle,
    indent: String,
}

impl JavaVisitor<()> for Reindent<'_> {
    fn visit_statement(&mut self, statement: Statement, cursor: &Cursor<'_, J>, p: &mut ()) -> Statement {
        let prefix = relined(statement.prefix(), &self.indent);
        let statement = statement.with_prefix(prefix);
        walk_statement(self, statement, cursor, p)
    }

    fn visit_block(&mut self, block: Arc<Block>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<Block> {
        let outer = self.indent.clone();
        self.indent.push_str(&self.style.indent_unit());
        let block = walk_block(self, block, cursor, p);
        self.indent = outer;
        let end = relined(&block.end, &self.indent);
        block.with_end(end)
    }

    fn visit_method_invocation(
        &mut self,
        call: Arc<MethodInvocation>,
        cursor: &Cursor<'_, J>,
        p: &mut (),
    ) -> Arc<MethodInvocation> {
        let call = walk_method_invocation(self, call, cursor, p);
        let continuation = format!("{}{}", self.indent, self.style.continuation_unit());
        let select = call
            .select
            .as_ref()
            .map(|select| Padded::new(select.element.clone(), relined(&select.after, &continuation)));
        call.with_select(select)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_statements, parse_syntax};
    use reweave_core::print::Codegen;

    const SOURCE: &str = "class A {\n    void m() {\n        int x = 1;\n    }\n\n    void n() { }\n}\n";

    fn splice_last(source: &str, method: usize, snippet: &str) -> String {
        let unit = parse_syntax("A.java", source).unwrap();
        let method = unit.classes[0].methods().nth(method).unwrap();
        let body = Arc::clone(method.body.as_ref().unwrap());
        let fragment = parse_statements(snippet).unwrap();
        let inserted = fragment.iter().map(|s| s.element.id()).collect();
        let mut statements = body.statements.clone();
        statements.extend(fragment);
        let tree = J::Block(Arc::clone(&body).with_statements(statements));

        let unit_cursor = Cursor::root(J::CompilationUnit(Arc::clone(&unit)));
        let class_cursor = unit_cursor.push(J::ClassDeclaration(Arc::clone(&unit.classes[0])));
        let method_cursor = class_cursor.push(J::MethodDeclaration(Arc::clone(method)));
        let cursor = method_cursor.push(J::Block(Arc::clone(&body)));
        let spliced = Spliced {
            tree,
            changed: body.id,
            inserted,
        };
        auto_format(&cursor, spliced, &Styles::default()).print()
    }

    #[test]
    fn inserted_statement_follows_its_siblings() {
        let out = splice_last(SOURCE, 0, "return;");
        assert_eq!(out, " {\n        int x = 1;\n        return;\n    }");
    }

    #[test]
    fn empty_block_gets_indent_from_the_owning_line() {
        let out = splice_last(SOURCE, 1, "x = 2;");
        assert_eq!(out, " {\n        x = 2;\n    }");
    }

    #[test]
    fn broken_chains_continue_at_the_continuation_indent() {
        let out = splice_last(SOURCE, 0, "a.b()\n.c()\n  .d();");
        assert_eq!(out, " {\n        int x = 1;\n        a.b()\n                .c()\n                .d();\n    }");
    }

    #[test]
    fn one_line_blocks_are_broken_up() {
        let source = "class A {\n    void m(String n) { this.name = n; }\n}\n";
        let out = splice_last(source, 0, "return this;");
        assert_eq!(out, " {\n        this.name = n;\n        return this;\n    }");
    }

    #[test]
    fn comments_in_a_chain_follow_the_continuation() {
        let out = splice_last(SOURCE, 0, "a.b()\n// keep\n.c();");
        assert_eq!(
            out,
            " {\n        int x = 1;\n        a.b()\n                // keep\n                .c();\n    }"
        );
    }

    #[test]
    fn nested_blocks_step_in() {
        let out = splice_last(SOURCE, 0, "while (x) {\nx = 1;\n}");
        assert_eq!(out, " {\n        int x = 1;\n        while (x) {\n            x = 1;\n        }\n    }");
    }
}
