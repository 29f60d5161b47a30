// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Template support: Java statements and expressions from text.
//!
//! A snippet is parsed as statements when it lands in a block (before, after
//! or in place of a block statement, or first or last in a block or method
//! body) and as an expression when it replaces an expression anywhere else.
//! It is type-attributed against what is visible at the insertion point:
//! package, imports, enclosing classes and their type parameters, and the
//! locals declared before it.

use std::sync::Arc;

use reweave_core::context::ExecutionContext;
use reweave_core::cursor::Cursor;
use reweave_core::error::TemplateError;
use reweave_core::style::Styles;
use reweave_core::template::{Coordinate, InsertionPoint, Spliced, Template, TemplateEngine, TemplateLanguage};
use reweave_core::tree::{NodeId, Padded, TreeNode};
use reweave_core::typing::VarType;
use tracing::trace;

use crate::attribution::{imported_type_names, JavaSourceSet, SnippetScope, TypeTable};
use crate::format::{auto_format, path_to};
use crate::parser::{parse_expression, parse_statements};
use crate::tree::{Block, Expression, MethodDeclaration, Statement, J};
use crate::visitor::{visit_j, walk_block, walk_expression, walk_method_declaration, JavaVisitor};

/// A parsed snippet.
#[derive(Debug, Clone)]
pub enum JavaFragment {
    Statements(Vec<Padded<Statement>>),
    Expression(Expression),
}

/// How a snippet is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Statements,
    Expression,
}

/// Parse scope of a Java snippet.
#[derive(Debug, Clone)]
pub struct JavaScope {
    pub snippet: SnippetScope,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaTemplateLanguage;

impl JavaTemplateLanguage {
    /// An engine for this language.
    pub fn engine() -> TemplateEngine<Self> {
        TemplateEngine::new(JavaTemplateLanguage)
    }
}

impl TemplateLanguage for JavaTemplateLanguage {
    type Node = J;
    type Fragment = JavaFragment;
    type Scope = JavaScope;

    fn contains(&self, tree: &J, target: NodeId) -> bool {
        tree.id() == target || tree.children().iter().any(|child| self.contains(child, target))
    }

    fn scope(&self, cursor: &Cursor<'_, J>, tree: &J, coordinate: &Coordinate) -> Result<JavaScope, TemplateError> {
        let inner = path_to(tree, coordinate.target).ok_or(TemplateError::CoordinateNotFound {
            target: coordinate.target,
        })?;
        let position = match coordinate.point {
            InsertionPoint::InsertFirstStatement | InsertionPoint::InsertLastStatement => Position::Statements,
            point => {
                let in_block = inner.len() >= 2 && matches!(inner[inner.len() - 2], J::Block(_));
                let target = &inner[inner.len() - 1];
                if point == InsertionPoint::Replace && !in_block && is_expression(target) {
                    Position::Expression
                } else {
                    Position::Statements
                }
            }
        };

        let mut path: Vec<J> = cursor.path().map(|frame| frame.value().clone()).collect();
        path.reverse();
        if path.last().is_some_and(|last| last.id() == tree.id()) {
            path.pop();
        }
        path.extend(inner);

        let snippet = snippet_scope(&path, coordinate);
        trace!(
            classes = ?snippet.classes,
            locals = snippet.locals.len(),
            ?position,
            "template scope"
        );
        Ok(JavaScope { snippet, position })
    }

    fn parse(&self, snippet: &str, scope: &JavaScope) -> Result<JavaFragment, String> {
        match scope.position {
            Position::Statements => {
                let statements = parse_statements(snippet)?;
                if statements.is_empty() {
                    return Err("snippet contains no statements".to_string());
                }
                Ok(JavaFragment::Statements(scope.snippet.attribute_statements(statements)))
            }
            Position::Expression => {
                let expression = parse_expression(snippet)?;
                Ok(JavaFragment::Expression(scope.snippet.attribute_expression(expression)))
            }
        }
    }

    fn splice(&self, tree: J, coordinate: &Coordinate, fragment: JavaFragment) -> Result<Spliced<J>, TemplateError> {
        let mut splicer = Splicer {
            coordinate: *coordinate,
            fragment: Some(fragment),
            changed: None,
            inserted: Vec::new(),
            error: None,
        };
        let cursor = Cursor::root(tree.clone());
        let spliced = visit_j(&mut splicer, tree.clone(), &cursor, &mut ());
        if let Some(err) = splicer.error {
            return Err(err);
        }
        match splicer.changed {
            Some(changed) => Ok(Spliced {
                tree: spliced,
                changed,
                inserted: splicer.inserted,
            }),
            None => {
                let kind = path_to(&tree, coordinate.target)
                    .and_then(|path| path.last().map(TreeNode::kind))
                    .unwrap_or("unknown");
                Err(invalid(coordinate.point, kind))
            }
        }
    }

    fn normalize(&self, cursor: &Cursor<'_, J>, spliced: Spliced<J>, styles: &Styles) -> J {
        auto_format(cursor, spliced, styles)
    }
}

fn invalid(point: InsertionPoint, kind: &'static str) -> TemplateError {
    TemplateError::InvalidInsertionPoint {
        point: point.to_string(),
        kind,
    }
}

fn is_expression(node: &J) -> bool {
    matches!(
        node,
        J::Identifier(_)
            | J::FieldAccess(_)
            | J::Literal(_)
            | J::MethodInvocation(_)
            | J::Assignment(_)
            | J::NewClass(_)
            | J::NewArray(_)
            | J::Binary(_)
            | J::Unary(_)
            | J::Parentheses(_)
    )
}

/// What a snippet at the end of `path` can see.
fn snippet_scope(path: &[J], coordinate: &Coordinate) -> SnippetScope {
    let unit = path.iter().find_map(J::as_compilation_unit);
    let package = unit.and_then(|unit| unit.package_name());
    let table = match unit {
        Some(unit) => JavaSourceSet::of(unit).unwrap_or_else(|| Arc::new(TypeTable::build([unit]))),
        None => Arc::new(TypeTable::default()),
    };

    let mut scope = SnippetScope {
        imports: unit.map(|unit| imported_type_names(unit)).unwrap_or_default(),
        package,
        table,
        ..SnippetScope::default()
    };
    for (i, node) in path.iter().enumerate() {
        let next = path.get(i + 1).map(TreeNode::id);
        match node {
            J::ClassDeclaration(class) => {
                let fqn = match class.ty.as_ref().and_then(|ty| ty.fully_qualified_name()) {
                    Some(fqn) => fqn.to_string(),
                    None => match (scope.classes.last(), &scope.package) {
                        (Some(outer), _) => format!("{}.{}", outer, class.name.name),
                        (None, Some(package)) => format!("{}.{}", package, class.name.name),
                        (None, None) => class.name.name.clone(),
                    },
                };
                scope.classes.push(fqn);
                if let Some(parameters) = &class.type_parameters {
                    scope.type_parameters.extend(parameters.iter().map(|tp| tp.name.name.clone()));
                }
            }
            J::MethodDeclaration(method) => {
                if let Some(parameters) = &method.type_parameters {
                    scope.type_parameters.extend(parameters.iter().map(|tp| tp.name.name.clone()));
                }
                for parameter in method.parameters() {
                    scope.locals.extend(declared_types(&Statement::VariableDeclarations(Arc::clone(parameter))));
                }
                // Inserting last into the body of the target method sees all of its locals.
                if next.is_none() && coordinate.point == InsertionPoint::InsertLastStatement {
                    for statement in method.body.iter().flat_map(|body| body.statements()) {
                        scope.locals.extend(declared_types(statement));
                    }
                }
            }
            J::Block(block) => {
                let visible = match next {
                    Some(next) => {
                        let pos = block.statements().position(|s| s.id() == next).unwrap_or(0);
                        let after = next == coordinate.target && coordinate.point == InsertionPoint::After;
                        pos + usize::from(after)
                    }
                    None if coordinate.point == InsertionPoint::InsertLastStatement => block.statements.len(),
                    None => 0,
                };
                for statement in block.statements().take(visible) {
                    scope.locals.extend(declared_types(statement));
                }
            }
            _ => {}
        }
    }
    scope
}

fn declared_types(statement: &Statement) -> Vec<Arc<VarType>> {
    match statement {
        Statement::VariableDeclarations(declarations) => declarations
            .variables()
            .filter_map(|variable| variable.variable_type.clone())
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Splicing
// ============================================================================

struct Splicer {
    coordinate: Coordinate,
    fragment: Option<JavaFragment>,
    changed: Option<NodeId>,
    inserted: Vec<NodeId>,
    error: Option<TemplateError>,
}

impl Splicer {
    fn done(&self) -> bool {
        self.changed.is_some() || self.error.is_some()
    }

    fn take_statements(&mut self, kind: &'static str) -> Option<Vec<Padded<Statement>>> {
        match self.fragment.take() {
            Some(JavaFragment::Statements(statements)) => {
                self.inserted.extend(statements.iter().map(|s| s.element.id()));
                Some(statements)
            }
            _ => {
                self.error = Some(invalid(self.coordinate.point, kind));
                None
            }
        }
    }

    /// First or last statement of `block`.
    fn insert_into(&mut self, block: Arc<Block>) -> Arc<Block> {
        let Some(fragment) = self.take_statements("Block") else {
            return block;
        };
        let mut statements = block.statements.clone();
        if self.coordinate.point == InsertionPoint::InsertFirstStatement {
            statements.splice(0..0, fragment);
        } else {
            statements.extend(fragment);
        }
        self.changed = Some(block.id);
        block.with_statements(statements)
    }

    /// Before, after or in place of the statement at `pos`.
    fn insert_around(&mut self, block: Arc<Block>, pos: usize) -> Arc<Block> {
        let target = &block.statements[pos].element;
        let kind = target.kind();
        let prefix = target.prefix().clone();
        let Some(mut fragment) = self.take_statements(kind) else {
            return block;
        };
        let mut statements = block.statements.clone();
        match self.coordinate.point {
            InsertionPoint::Before => {
                statements.splice(pos..pos, fragment);
            }
            InsertionPoint::After => {
                statements.splice(pos + 1..pos + 1, fragment);
            }
            _ => {
                if let Some(first) = fragment.first_mut() {
                    first.element = first.element.clone().with_prefix(prefix);
                }
                statements.splice(pos..=pos, fragment);
            }
        }
        self.changed = Some(block.id);
        block.with_statements(statements)
    }
}

impl JavaVisitor<()> for Splicer {
    fn visit_method_declaration(
        &mut self,
        method: Arc<MethodDeclaration>,
        cursor: &Cursor<'_, J>,
        p: &mut (),
    ) -> Arc<MethodDeclaration> {
        let point = self.coordinate.point;
        let at_body = matches!(point, InsertionPoint::InsertFirstStatement | InsertionPoint::InsertLastStatement);
        if self.done() || method.id != self.coordinate.target || !at_body {
            return walk_method_declaration(self, method, cursor, p);
        }
        match &method.body {
            Some(body) => {
                let body = self.insert_into(Arc::clone(body));
                method.with_body(Some(body))
            }
            None => {
                self.error = Some(invalid(point, "MethodDeclaration"));
                method
            }
        }
    }

    fn visit_block(&mut self, block: Arc<Block>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<Block> {
        if self.done() {
            return block;
        }
        let target = self.coordinate.target;
        match self.coordinate.point {
            InsertionPoint::InsertFirstStatement | InsertionPoint::InsertLastStatement if block.id == target => {
                self.insert_into(block)
            }
            InsertionPoint::Before | InsertionPoint::After | InsertionPoint::Replace => {
                let position = block.statements().position(|s| s.id() == target);
                match position {
                    Some(pos) => self.insert_around(block, pos),
                    None => walk_block(self, block, cursor, p),
                }
            }
            _ => walk_block(self, block, cursor, p),
        }
    }

    fn visit_expression(&mut self, expression: Expression, cursor: &Cursor<'_, J>, p: &mut ()) -> Expression {
        if self.done() || expression.id() != self.coordinate.target || self.coordinate.point != InsertionPoint::Replace
        {
            return walk_expression(self, expression, cursor, p);
        }
        match self.fragment.take() {
            Some(JavaFragment::Expression(replacement)) => {
                self.inserted.push(replacement.id());
                self.changed = Some(cursor.parent().map_or(replacement.id(), |parent| parent.value().id()));
                replacement.with_prefix(expression.prefix().clone())
            }
            _ => {
                self.error = Some(invalid(self.coordinate.point, expression.kind()));
                expression
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Apply a template to `edited`, a rewrite of the block `original` made by
/// the caller. If the template fails, a diagnostic is recorded and
/// `original` comes back, so a half-done edit never survives.
/// `cursor` is positioned at the block.
pub fn apply_to_block(
    cursor: &Cursor<'_, J>,
    original: &Arc<Block>,
    edited: Arc<Block>,
    coordinate: Coordinate,
    template: &Template,
    args: &[&str],
    ctx: &mut ExecutionContext,
) -> Arc<Block> {
    match JavaTemplateLanguage::engine().apply(cursor, J::Block(edited), coordinate, template, args, ctx) {
        Ok(J::Block(applied)) => applied,
        Ok(_) => Arc::clone(original),
        Err(err) => {
            ctx.record_template_error(coordinate.target, &err);
            Arc::clone(original)
        }
    }
}

/// Method counterpart of [`apply_to_block`]. `cursor` is positioned at the
/// method.
pub fn apply_to_method(
    cursor: &Cursor<'_, J>,
    original: &Arc<MethodDeclaration>,
    edited: Arc<MethodDeclaration>,
    coordinate: Coordinate,
    template: &Template,
    args: &[&str],
    ctx: &mut ExecutionContext,
) -> Arc<MethodDeclaration> {
    match JavaTemplateLanguage::engine().apply(cursor, J::MethodDeclaration(edited), coordinate, template, args, ctx) {
        Ok(J::MethodDeclaration(applied)) => applied,
        Ok(_) => Arc::clone(original),
        Err(err) => {
            ctx.record_template_error(coordinate.target, &err);
            Arc::clone(original)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JavaParser;
    use crate::tree::CompilationUnit;
    use reweave_core::print::Codegen;
    use reweave_core::typing::Type;
    use reweave_core::DiagnosticKind;

    const SOURCE: &str = "package a;\n\npublic class A {\n    private String name;\n\n    public void m(int count) {\n        String local = name;\n        count = 1;\n    }\n\n    abstract void n();\n}\n";

    fn unit() -> Arc<CompilationUnit> {
        JavaParser::new().parse("A.java", SOURCE).unwrap()
    }

    fn method(unit: &CompilationUnit, name: &str) -> Arc<MethodDeclaration> {
        Arc::clone(unit.classes[0].methods().find(|m| m.name.name == name).unwrap())
    }

    /// Apply at the method `m`, with the cursor at the method.
    fn apply_at_method(
        unit: &Arc<CompilationUnit>,
        name: &str,
        coordinate: impl Fn(&MethodDeclaration) -> Coordinate,
        code: &str,
    ) -> Result<J, TemplateError> {
        let method = method(unit, name);
        let root = Cursor::root(J::CompilationUnit(Arc::clone(unit)));
        let class = root.push(J::ClassDeclaration(Arc::clone(&unit.classes[0])));
        let cursor = class.push(J::MethodDeclaration(Arc::clone(&method)));
        JavaTemplateLanguage::engine().apply(
            &cursor,
            J::MethodDeclaration(Arc::clone(&method)),
            coordinate(&method),
            &Template::new(code),
            &[],
            &ExecutionContext::new(),
        )
    }

    fn body(unit: &Arc<CompilationUnit>) -> Arc<Block> {
        Arc::clone(method(unit, "m").body.as_ref().unwrap())
    }

    #[test]
    fn last_statement_goes_before_the_closing_brace() {
        let unit = unit();
        let out = apply_at_method(&unit, "m", |m| Coordinate::last_statement(m.id), "return;").unwrap();
        assert_eq!(
            out.print(),
            "\n\n    public void m(int count) {\n        String local = name;\n        count = 1;\n        return;\n    }"
        );
    }

    #[test]
    fn first_statement_of_a_block() {
        let unit = unit();
        let block = body(&unit);
        let out = apply_at_method(&unit, "m", |_| Coordinate::first_statement(block.id), "count = 0;").unwrap();
        let J::MethodDeclaration(method) = out else { panic!("expected a method") };
        let first = method.body.as_ref().unwrap().statements[0].element.clone();
        assert_eq!(first.print(), "\n        count = 0");
    }

    #[test]
    fn replace_keeps_the_target_prefix() {
        let unit = unit();
        let target = body(&unit).statements[1].element.id();
        let out = apply_at_method(&unit, "m", |_| Coordinate::replace(target), "count = 2;").unwrap();
        assert!(out.print().contains("String local = name;\n        count = 2;\n    }"));
    }

    #[test]
    fn before_and_after_a_statement() {
        let unit = unit();
        let target = body(&unit).statements[1].element.id();
        let before = apply_at_method(&unit, "m", |_| Coordinate::before(target), "local = null;").unwrap();
        assert!(before.print().contains("name;\n        local = null;\n        count = 1;"));
        let after = apply_at_method(&unit, "m", |_| Coordinate::after(target), "local = null;").unwrap();
        assert!(after.print().contains("count = 1;\n        local = null;\n    }"));
    }

    #[test]
    fn snippets_see_fields_parameters_and_earlier_locals() {
        let unit = unit();
        let out = apply_at_method(
            &unit,
            "m",
            |m| Coordinate::last_statement(m.id),
            "local = name;\ncount = count;\nthis.name = local;",
        )
        .unwrap();
        let J::MethodDeclaration(method) = out else { panic!("expected a method") };
        let types: Vec<Option<Type>> = method
            .body
            .as_ref()
            .unwrap()
            .statements()
            .skip(2)
            .map(|s| s.as_assignment().unwrap().ty.clone())
            .collect();
        assert_eq!(types[0].as_ref().and_then(Type::fully_qualified_name), Some("java.lang.String"));
        assert_eq!(types[1].as_ref().map(ToString::to_string).as_deref(), Some("int"));
        assert_eq!(types[2].as_ref().and_then(Type::fully_qualified_name), Some("java.lang.String"));
    }

    #[test]
    fn expressions_are_replaced_in_place() {
        let unit = unit();
        let assignment = body(&unit).statements[1].element.as_assignment().cloned().unwrap();
        let value = assignment.assignment.element.id();
        let out = apply_at_method(&unit, "m", |_| Coordinate::replace(value), "count + 1").unwrap();
        assert!(out.print().contains("count = count + 1;"));
    }

    #[test]
    fn bodiless_methods_reject_statements() {
        let unit = unit();
        let err = apply_at_method(&unit, "n", |m| Coordinate::last_statement(m.id), "return;").unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidInsertionPoint {
                point: "last statement".to_string(),
                kind: "MethodDeclaration",
            }
        );
    }

    #[test]
    fn unparseable_snippet_is_contained() {
        let unit = unit();
        let method = method(&unit, "m");
        let root = Cursor::root(J::CompilationUnit(Arc::clone(&unit)));
        let class = root.push(J::ClassDeclaration(Arc::clone(&unit.classes[0])));
        let cursor = class.push(J::MethodDeclaration(Arc::clone(&method)));
        let mut ctx = ExecutionContext::new();
        let out = apply_to_method(
            &cursor,
            &method,
            Arc::clone(&method),
            Coordinate::last_statement(method.id),
            &Template::new("return ;;("),
            &[],
            &mut ctx,
        );
        assert!(Arc::ptr_eq(&out, &method));
        assert_eq!(ctx.diagnostics()[0].kind, DiagnosticKind::TemplateParse);
    }
}
