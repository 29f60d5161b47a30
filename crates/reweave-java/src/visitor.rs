// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitors over Java trees.
//!
//! - [`JavaVisitor`]: rewriting; each `visit_*` defaults to the matching
//!   `walk_*`, which visits the children in source order and rebuilds the
//!   node through its `with_*` setters
//! - [`JavaSourceVisitor`]: accumulating, on top of [`Fold`]
//!
//! The cursor handed to `visit_x` has `x` as its value. The `visit_statement`,
//! `visit_expression` and `visit_decoration` dispatchers receive the same
//! cursor as the variant hook they call.

use std::sync::Arc;

use reweave_core::context::ExecutionContext;
use reweave_core::cursor::Cursor;
use reweave_core::error::AncestorNotFound;
use reweave_core::tree::{downcast_source, Container, LeftPadded, Padded, SourceRef};
use reweave_core::visitor::{fold_children, Fold, TreeVisitor};

use crate::tree::{
    Annotation, Assignment, Binary, Block, ClassDeclaration, CompilationUnit, Decoration, Else, Expression,
    FieldAccess, Identifier, If, Import, Literal, MethodDeclaration, MethodInvocation, Modifier, NamedVariable,
    NewArray, NewClass, Package, Parentheses, Return, Statement, Throw, TypeName, TypeParameter, Unary,
    VariableDeclarations, WhileLoop, J,
};

/// Nearest class declaration above the cursor's node, not counting the node
/// itself.
pub fn enclosing_class(cursor: &Cursor<'_, J>) -> Option<Arc<ClassDeclaration>> {
    cursor
        .parent()
        .and_then(|parent| parent.first_enclosing(|node| node.as_class_declaration().cloned()))
}

/// Like [`enclosing_class`], as an error when there is none.
pub fn enclosing_class_or_err(cursor: &Cursor<'_, J>) -> Result<Arc<ClassDeclaration>, AncestorNotFound> {
    const KIND: &str = "ClassDeclaration";
    cursor
        .parent_or_err()
        .map_err(|_| AncestorNotFound { kind: KIND })?
        .first_enclosing_or_err(|node| node.as_class_declaration().cloned(), KIND)
}

/// Nearest method declaration above the cursor's node.
pub fn enclosing_method(cursor: &Cursor<'_, J>) -> Option<Arc<MethodDeclaration>> {
    cursor
        .parent()
        .and_then(|parent| parent.first_enclosing(|node| node.as_method_declaration().cloned()))
}

// ============================================================================
// Rewriting visitor
// ============================================================================

pub trait JavaVisitor<P> {
    /// Visit a whole compilation unit from a fresh root cursor.
    fn visit_root(&mut self, unit: Arc<CompilationUnit>, p: &mut P) -> Arc<CompilationUnit> {
        let cursor = Cursor::root(J::CompilationUnit(Arc::clone(&unit)));
        self.visit_compilation_unit(unit, &cursor, p)
    }

    fn visit_compilation_unit(
        &mut self,
        unit: Arc<CompilationUnit>,
        cursor: &Cursor<'_, J>,
        p: &mut P,
    ) -> Arc<CompilationUnit> {
        walk_compilation_unit(self, unit, cursor, p)
    }

    fn visit_package(&mut self, package: Arc<Package>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Package> {
        walk_package(self, package, cursor, p)
    }

    fn visit_import(&mut self, import: Arc<Import>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Import> {
        walk_import(self, import, cursor, p)
    }

    fn visit_class_declaration(
        &mut self,
        class: Arc<ClassDeclaration>,
        cursor: &Cursor<'_, J>,
        p: &mut P,
    ) -> Arc<ClassDeclaration> {
        walk_class_declaration(self, class, cursor, p)
    }

    fn visit_annotation(&mut self, annotation: Arc<Annotation>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Annotation> {
        walk_annotation(self, annotation, cursor, p)
    }

    fn visit_modifier(&mut self, modifier: Arc<Modifier>, _cursor: &Cursor<'_, J>, _p: &mut P) -> Arc<Modifier> {
        modifier
    }

    fn visit_type_parameter(
        &mut self,
        parameter: Arc<TypeParameter>,
        cursor: &Cursor<'_, J>,
        p: &mut P,
    ) -> Arc<TypeParameter> {
        walk_type_parameter(self, parameter, cursor, p)
    }

    fn visit_method_declaration(
        &mut self,
        method: Arc<MethodDeclaration>,
        cursor: &Cursor<'_, J>,
        p: &mut P,
    ) -> Arc<MethodDeclaration> {
        walk_method_declaration(self, method, cursor, p)
    }

    fn visit_variable_declarations(
        &mut self,
        declarations: Arc<VariableDeclarations>,
        cursor: &Cursor<'_, J>,
        p: &mut P,
    ) -> Arc<VariableDeclarations> {
        walk_variable_declarations(self, declarations, cursor, p)
    }

    fn visit_named_variable(
        &mut self,
        variable: Arc<NamedVariable>,
        cursor: &Cursor<'_, J>,
        p: &mut P,
    ) -> Arc<NamedVariable> {
        walk_named_variable(self, variable, cursor, p)
    }

    fn visit_block(&mut self, block: Arc<Block>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Block> {
        walk_block(self, block, cursor, p)
    }

    fn visit_return(&mut self, node: Arc<Return>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Return> {
        walk_return(self, node, cursor, p)
    }

    fn visit_if(&mut self, node: Arc<If>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<If> {
        walk_if(self, node, cursor, p)
    }

    fn visit_else(&mut self, node: Arc<Else>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Else> {
        walk_else(self, node, cursor, p)
    }

    fn visit_while_loop(&mut self, node: Arc<WhileLoop>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<WhileLoop> {
        walk_while_loop(self, node, cursor, p)
    }

    fn visit_throw(&mut self, node: Arc<Throw>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Throw> {
        walk_throw(self, node, cursor, p)
    }

    fn visit_identifier(&mut self, identifier: Arc<Identifier>, _cursor: &Cursor<'_, J>, _p: &mut P) -> Arc<Identifier> {
        identifier
    }

    fn visit_field_access(&mut self, node: Arc<FieldAccess>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<FieldAccess> {
        walk_field_access(self, node, cursor, p)
    }

    fn visit_literal(&mut self, literal: Arc<Literal>, _cursor: &Cursor<'_, J>, _p: &mut P) -> Arc<Literal> {
        literal
    }

    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        cursor: &Cursor<'_, J>,
        p: &mut P,
    ) -> Arc<MethodInvocation> {
        walk_method_invocation(self, node, cursor, p)
    }

    fn visit_assignment(&mut self, node: Arc<Assignment>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Assignment> {
        walk_assignment(self, node, cursor, p)
    }

    fn visit_new_class(&mut self, node: Arc<NewClass>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<NewClass> {
        walk_new_class(self, node, cursor, p)
    }

    fn visit_new_array(&mut self, node: Arc<NewArray>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<NewArray> {
        walk_new_array(self, node, cursor, p)
    }

    fn visit_binary(&mut self, node: Arc<Binary>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Binary> {
        walk_binary(self, node, cursor, p)
    }

    fn visit_unary(&mut self, node: Arc<Unary>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Unary> {
        walk_unary(self, node, cursor, p)
    }

    fn visit_parentheses(&mut self, node: Arc<Parentheses>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Parentheses> {
        walk_parentheses(self, node, cursor, p)
    }

    fn visit_type_name(&mut self, node: Arc<TypeName>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<TypeName> {
        walk_type_name(self, node, cursor, p)
    }

    /// Dispatch on the kind of statement.
    fn visit_statement(&mut self, statement: Statement, cursor: &Cursor<'_, J>, p: &mut P) -> Statement {
        walk_statement(self, statement, cursor, p)
    }

    /// Dispatch on the kind of expression. Only called for nodes in
    /// expression position; names of declarations, members and types go to
    /// their own hooks.
    fn visit_expression(&mut self, expression: Expression, cursor: &Cursor<'_, J>, p: &mut P) -> Expression {
        walk_expression(self, expression, cursor, p)
    }

    /// Dispatch on annotation or modifier.
    fn visit_decoration(&mut self, decoration: Decoration, cursor: &Cursor<'_, J>, p: &mut P) -> Decoration {
        match decoration {
            Decoration::Annotation(n) => Decoration::Annotation(self.visit_annotation(n, cursor, p)),
            Decoration::Modifier(n) => Decoration::Modifier(self.visit_modifier(n, cursor, p)),
        }
    }

    /// Erase this visitor for the pipeline.
    fn into_tree_visitor(self) -> Box<dyn TreeVisitor>
    where
        Self: JavaVisitor<ExecutionContext> + Sized + 'static,
    {
        Box::new(JavaTreeVisitor(self))
    }
}

// ----------------------------------------------------------------------------
// Child helpers
// ----------------------------------------------------------------------------

fn visit_child_expression<V, P>(visitor: &mut V, expression: &Expression, cursor: &Cursor<'_, J>, p: &mut P) -> Expression
where
    V: JavaVisitor<P> + ?Sized,
{
    let child = cursor.push(J::from(expression.clone()));
    visitor.visit_expression(expression.clone(), &child, p)
}

fn visit_child_statement<V, P>(
    visitor: &mut V,
    statement: &Padded<Statement>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Padded<Statement>
where
    V: JavaVisitor<P> + ?Sized,
{
    let child = cursor.push(J::from(statement.element.clone()));
    let element = visitor.visit_statement(statement.element.clone(), &child, p);
    Padded::new(element, statement.after.clone())
}

fn visit_child_identifier<V, P>(
    visitor: &mut V,
    identifier: &Arc<Identifier>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<Identifier>
where
    V: JavaVisitor<P> + ?Sized,
{
    let child = cursor.push(J::Identifier(Arc::clone(identifier)));
    visitor.visit_identifier(Arc::clone(identifier), &child, p)
}

fn visit_child_type<V, P>(visitor: &mut V, type_name: &Arc<TypeName>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<TypeName>
where
    V: JavaVisitor<P> + ?Sized,
{
    let child = cursor.push(J::TypeName(Arc::clone(type_name)));
    visitor.visit_type_name(Arc::clone(type_name), &child, p)
}

fn visit_decorations<V, P>(
    visitor: &mut V,
    decorations: &[Decoration],
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Vec<Decoration>
where
    V: JavaVisitor<P> + ?Sized,
{
    decorations
        .iter()
        .map(|decoration| {
            let child = cursor.push(J::from(decoration.clone()));
            visitor.visit_decoration(decoration.clone(), &child, p)
        })
        .collect()
}

fn visit_annotations<V, P>(
    visitor: &mut V,
    annotations: &[Arc<Annotation>],
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Vec<Arc<Annotation>>
where
    V: JavaVisitor<P> + ?Sized,
{
    annotations
        .iter()
        .map(|annotation| {
            let child = cursor.push(J::Annotation(Arc::clone(annotation)));
            visitor.visit_annotation(Arc::clone(annotation), &child, p)
        })
        .collect()
}

fn map_padded<T: Clone>(items: &[Padded<T>], mut f: impl FnMut(&T) -> T) -> Vec<Padded<T>> {
    items
        .iter()
        .map(|item| Padded::new(f(&item.element), item.after.clone()))
        .collect()
}

fn map_container<T: Clone>(container: &Container<T>, f: impl FnMut(&T) -> T) -> Container<T> {
    Container {
        before: container.before.clone(),
        elements: map_padded(&container.elements, f),
        end: container.end.clone(),
    }
}

fn visit_expressions<V, P>(
    visitor: &mut V,
    container: &Container<Expression>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Container<Expression>
where
    V: JavaVisitor<P> + ?Sized,
{
    map_container(container, |e| visit_child_expression(visitor, e, cursor, p))
}

fn visit_type_list<V, P>(
    visitor: &mut V,
    container: &Option<Container<Arc<TypeName>>>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Option<Container<Arc<TypeName>>>
where
    V: JavaVisitor<P> + ?Sized,
{
    container
        .as_ref()
        .map(|c| map_container(c, |t| visit_child_type(visitor, t, cursor, p)))
}

fn visit_type_parameters<V, P>(
    visitor: &mut V,
    container: &Option<Container<Arc<TypeParameter>>>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Option<Container<Arc<TypeParameter>>>
where
    V: JavaVisitor<P> + ?Sized,
{
    container.as_ref().map(|c| {
        map_container(c, |parameter| {
            let child = cursor.push(J::TypeParameter(Arc::clone(parameter)));
            visitor.visit_type_parameter(Arc::clone(parameter), &child, p)
        })
    })
}

fn visit_child_block<V, P>(visitor: &mut V, block: &Arc<Block>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Block>
where
    V: JavaVisitor<P> + ?Sized,
{
    let child = cursor.push(J::Block(Arc::clone(block)));
    visitor.visit_block(Arc::clone(block), &child, p)
}

fn visit_child_parentheses<V, P>(
    visitor: &mut V,
    parentheses: &Arc<Parentheses>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<Parentheses>
where
    V: JavaVisitor<P> + ?Sized,
{
    let child = cursor.push(J::Parentheses(Arc::clone(parentheses)));
    visitor.visit_parentheses(Arc::clone(parentheses), &child, p)
}

// ----------------------------------------------------------------------------
// Walks
// ----------------------------------------------------------------------------

pub fn walk_compilation_unit<V, P>(
    visitor: &mut V,
    unit: Arc<CompilationUnit>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<CompilationUnit>
where
    V: JavaVisitor<P> + ?Sized,
{
    let package = unit.package.as_ref().map(|package| {
        let child = cursor.push(J::Package(Arc::clone(&package.element)));
        Padded::new(
            visitor.visit_package(Arc::clone(&package.element), &child, p),
            package.after.clone(),
        )
    });
    let imports = map_padded(&unit.imports, |import| {
        let child = cursor.push(J::Import(Arc::clone(import)));
        visitor.visit_import(Arc::clone(import), &child, p)
    });
    let classes = unit
        .classes
        .iter()
        .map(|class| {
            let child = cursor.push(J::ClassDeclaration(Arc::clone(class)));
            visitor.visit_class_declaration(Arc::clone(class), &child, p)
        })
        .collect();
    unit.with_package(package).with_imports(imports).with_classes(classes)
}

pub fn walk_package<V, P>(visitor: &mut V, package: Arc<Package>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Package>
where
    V: JavaVisitor<P> + ?Sized,
{
    let name = visit_child_expression(visitor, &package.name, cursor, p);
    package.with_name(name)
}

pub fn walk_import<V, P>(visitor: &mut V, import: Arc<Import>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Import>
where
    V: JavaVisitor<P> + ?Sized,
{
    let qualid = visit_child_expression(visitor, &import.qualid, cursor, p);
    import.with_qualid(qualid)
}

pub fn walk_class_declaration<V, P>(
    visitor: &mut V,
    class: Arc<ClassDeclaration>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<ClassDeclaration>
where
    V: JavaVisitor<P> + ?Sized,
{
    let decorations = visit_decorations(visitor, &class.decorations, cursor, p);
    let name = visit_child_identifier(visitor, &class.name, cursor, p);
    let type_parameters = visit_type_parameters(visitor, &class.type_parameters, cursor, p);
    let extends = visit_type_list(visitor, &class.extends, cursor, p);
    let implements = visit_type_list(visitor, &class.implements, cursor, p);
    let body = visit_child_block(visitor, &class.body, cursor, p);
    class
        .with_decorations(decorations)
        .with_name(name)
        .with_type_parameters(type_parameters)
        .with_extends(extends)
        .with_implements(implements)
        .with_body(body)
}

pub fn walk_annotation<V, P>(
    visitor: &mut V,
    annotation: Arc<Annotation>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<Annotation>
where
    V: JavaVisitor<P> + ?Sized,
{
    let annotation_type = visit_child_expression(visitor, &annotation.annotation_type, cursor, p);
    let arguments = annotation
        .arguments
        .as_ref()
        .map(|arguments| visit_expressions(visitor, arguments, cursor, p));
    annotation.with_annotation_type(annotation_type).with_arguments(arguments)
}

pub fn walk_type_parameter<V, P>(
    visitor: &mut V,
    parameter: Arc<TypeParameter>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<TypeParameter>
where
    V: JavaVisitor<P> + ?Sized,
{
    let annotations = visit_annotations(visitor, &parameter.annotations, cursor, p);
    let name = visit_child_identifier(visitor, &parameter.name, cursor, p);
    let bounds = visit_type_list(visitor, &parameter.bounds, cursor, p);
    parameter.with_annotations(annotations).with_name(name).with_bounds(bounds)
}

pub fn walk_method_declaration<V, P>(
    visitor: &mut V,
    method: Arc<MethodDeclaration>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<MethodDeclaration>
where
    V: JavaVisitor<P> + ?Sized,
{
    let decorations = visit_decorations(visitor, &method.decorations, cursor, p);
    let type_parameters = visit_type_parameters(visitor, &method.type_parameters, cursor, p);
    let type_annotations = visit_annotations(visitor, &method.type_annotations, cursor, p);
    let return_type = method
        .return_type
        .as_ref()
        .map(|t| visit_child_type(visitor, t, cursor, p));
    let name = visit_child_identifier(visitor, &method.name, cursor, p);
    let params = map_container(&method.params, |param| {
        let child = cursor.push(J::VariableDeclarations(Arc::clone(param)));
        visitor.visit_variable_declarations(Arc::clone(param), &child, p)
    });
    let throws = visit_type_list(visitor, &method.throws, cursor, p);
    let default_value = method.default_value.as_ref().map(|value| {
        LeftPadded::new(
            value.before.clone(),
            visit_child_expression(visitor, &value.element, cursor, p),
        )
    });
    let body = method.body.as_ref().map(|body| visit_child_block(visitor, body, cursor, p));
    method
        .with_decorations(decorations)
        .with_type_parameters(type_parameters)
        .with_type_annotations(type_annotations)
        .with_return_type(return_type)
        .with_name(name)
        .with_params(params)
        .with_throws(throws)
        .with_default_value(default_value)
        .with_body(body)
}

pub fn walk_variable_declarations<V, P>(
    visitor: &mut V,
    declarations: Arc<VariableDeclarations>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<VariableDeclarations>
where
    V: JavaVisitor<P> + ?Sized,
{
    let decorations = visit_decorations(visitor, &declarations.decorations, cursor, p);
    let type_expr = visit_child_type(visitor, &declarations.type_expr, cursor, p);
    let variables = map_padded(&declarations.variables, |variable| {
        let child = cursor.push(J::NamedVariable(Arc::clone(variable)));
        visitor.visit_named_variable(Arc::clone(variable), &child, p)
    });
    declarations
        .with_decorations(decorations)
        .with_type_expr(type_expr)
        .with_variables(variables)
}

pub fn walk_named_variable<V, P>(
    visitor: &mut V,
    variable: Arc<NamedVariable>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<NamedVariable>
where
    V: JavaVisitor<P> + ?Sized,
{
    let name = visit_child_identifier(visitor, &variable.name, cursor, p);
    let initializer = variable.initializer.as_ref().map(|initializer| {
        LeftPadded::new(
            initializer.before.clone(),
            visit_child_expression(visitor, &initializer.element, cursor, p),
        )
    });
    variable.with_name(name).with_initializer(initializer)
}

pub fn walk_block<V, P>(visitor: &mut V, block: Arc<Block>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Block>
where
    V: JavaVisitor<P> + ?Sized,
{
    let statements = block
        .statements
        .iter()
        .map(|statement| visit_child_statement(visitor, statement, cursor, p))
        .collect();
    block.with_statements(statements)
}

pub fn walk_return<V, P>(visitor: &mut V, node: Arc<Return>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Return>
where
    V: JavaVisitor<P> + ?Sized,
{
    let expression = node
        .expression
        .as_ref()
        .map(|e| visit_child_expression(visitor, e, cursor, p));
    node.with_expression(expression)
}

pub fn walk_if<V, P>(visitor: &mut V, node: Arc<If>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<If>
where
    V: JavaVisitor<P> + ?Sized,
{
    let condition = visit_child_parentheses(visitor, &node.condition, cursor, p);
    let then_part = visit_child_statement(visitor, &node.then_part, cursor, p);
    let else_part = node.else_part.as_ref().map(|else_part| {
        let child = cursor.push(J::Else(Arc::clone(else_part)));
        visitor.visit_else(Arc::clone(else_part), &child, p)
    });
    node.with_condition(condition)
        .with_then_part(then_part)
        .with_else_part(else_part)
}

pub fn walk_else<V, P>(visitor: &mut V, node: Arc<Else>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Else>
where
    V: JavaVisitor<P> + ?Sized,
{
    let body = visit_child_statement(visitor, &node.body, cursor, p);
    node.with_body(body)
}

pub fn walk_while_loop<V, P>(visitor: &mut V, node: Arc<WhileLoop>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<WhileLoop>
where
    V: JavaVisitor<P> + ?Sized,
{
    let condition = visit_child_parentheses(visitor, &node.condition, cursor, p);
    let body = visit_child_statement(visitor, &node.body, cursor, p);
    node.with_condition(condition).with_body(body)
}

pub fn walk_throw<V, P>(visitor: &mut V, node: Arc<Throw>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Throw>
where
    V: JavaVisitor<P> + ?Sized,
{
    let exception = visit_child_expression(visitor, &node.exception, cursor, p);
    node.with_exception(exception)
}

pub fn walk_field_access<V, P>(
    visitor: &mut V,
    node: Arc<FieldAccess>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<FieldAccess>
where
    V: JavaVisitor<P> + ?Sized,
{
    let target = visit_child_expression(visitor, &node.target, cursor, p);
    let name = LeftPadded::new(
        node.name.before.clone(),
        visit_child_identifier(visitor, &node.name.element, cursor, p),
    );
    node.with_target(target).with_name(name)
}

pub fn walk_method_invocation<V, P>(
    visitor: &mut V,
    node: Arc<MethodInvocation>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<MethodInvocation>
where
    V: JavaVisitor<P> + ?Sized,
{
    let select = node.select.as_ref().map(|select| {
        Padded::new(
            visit_child_expression(visitor, &select.element, cursor, p),
            select.after.clone(),
        )
    });
    let name = visit_child_identifier(visitor, &node.name, cursor, p);
    let args = visit_expressions(visitor, &node.args, cursor, p);
    node.with_select(select).with_name(name).with_args(args)
}

pub fn walk_assignment<V, P>(visitor: &mut V, node: Arc<Assignment>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Assignment>
where
    V: JavaVisitor<P> + ?Sized,
{
    let variable = visit_child_expression(visitor, &node.variable, cursor, p);
    let assignment = LeftPadded::new(
        node.assignment.before.clone(),
        visit_child_expression(visitor, &node.assignment.element, cursor, p),
    );
    node.with_variable(variable).with_assignment(assignment)
}

pub fn walk_new_class<V, P>(visitor: &mut V, node: Arc<NewClass>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<NewClass>
where
    V: JavaVisitor<P> + ?Sized,
{
    let clazz = visit_child_type(visitor, &node.clazz, cursor, p);
    let args = visit_expressions(visitor, &node.args, cursor, p);
    node.with_clazz(clazz).with_args(args)
}

pub fn walk_new_array<V, P>(visitor: &mut V, node: Arc<NewArray>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<NewArray>
where
    V: JavaVisitor<P> + ?Sized,
{
    let initializer = visit_expressions(visitor, &node.initializer, cursor, p);
    node.with_initializer(initializer)
}

pub fn walk_binary<V, P>(visitor: &mut V, node: Arc<Binary>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Binary>
where
    V: JavaVisitor<P> + ?Sized,
{
    let left = visit_child_expression(visitor, &node.left, cursor, p);
    let right = visit_child_expression(visitor, &node.right, cursor, p);
    node.with_left(left).with_right(right)
}

pub fn walk_unary<V, P>(visitor: &mut V, node: Arc<Unary>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<Unary>
where
    V: JavaVisitor<P> + ?Sized,
{
    let expression = visit_child_expression(visitor, &node.expression, cursor, p);
    node.with_expression(expression)
}

pub fn walk_parentheses<V, P>(
    visitor: &mut V,
    node: Arc<Parentheses>,
    cursor: &Cursor<'_, J>,
    p: &mut P,
) -> Arc<Parentheses>
where
    V: JavaVisitor<P> + ?Sized,
{
    let tree = Padded::new(
        visit_child_expression(visitor, &node.tree.element, cursor, p),
        node.tree.after.clone(),
    );
    node.with_tree(tree)
}

pub fn walk_type_name<V, P>(visitor: &mut V, node: Arc<TypeName>, cursor: &Cursor<'_, J>, p: &mut P) -> Arc<TypeName>
where
    V: JavaVisitor<P> + ?Sized,
{
    let name = visit_child_expression(visitor, &node.name, cursor, p);
    let type_arguments = visit_type_list(visitor, &node.type_arguments, cursor, p);
    node.with_name(name).with_type_arguments(type_arguments)
}

/// Default statement dispatch.
pub fn walk_statement<V, P>(visitor: &mut V, statement: Statement, cursor: &Cursor<'_, J>, p: &mut P) -> Statement
where
    V: JavaVisitor<P> + ?Sized,
{
    match statement {
        Statement::ClassDeclaration(n) => Statement::ClassDeclaration(visitor.visit_class_declaration(n, cursor, p)),
        Statement::MethodDeclaration(n) => Statement::MethodDeclaration(visitor.visit_method_declaration(n, cursor, p)),
        Statement::VariableDeclarations(n) => {
            Statement::VariableDeclarations(visitor.visit_variable_declarations(n, cursor, p))
        }
        Statement::Block(n) => Statement::Block(visitor.visit_block(n, cursor, p)),
        Statement::Return(n) => Statement::Return(visitor.visit_return(n, cursor, p)),
        Statement::If(n) => Statement::If(visitor.visit_if(n, cursor, p)),
        Statement::WhileLoop(n) => Statement::WhileLoop(visitor.visit_while_loop(n, cursor, p)),
        Statement::Throw(n) => Statement::Throw(visitor.visit_throw(n, cursor, p)),
        Statement::MethodInvocation(n) => Statement::MethodInvocation(visitor.visit_method_invocation(n, cursor, p)),
        Statement::Assignment(n) => Statement::Assignment(visitor.visit_assignment(n, cursor, p)),
        Statement::NewClass(n) => Statement::NewClass(visitor.visit_new_class(n, cursor, p)),
    }
}

/// Default expression dispatch.
pub fn walk_expression<V, P>(visitor: &mut V, expression: Expression, cursor: &Cursor<'_, J>, p: &mut P) -> Expression
where
    V: JavaVisitor<P> + ?Sized,
{
    match expression {
        Expression::Identifier(n) => Expression::Identifier(visitor.visit_identifier(n, cursor, p)),
        Expression::FieldAccess(n) => Expression::FieldAccess(visitor.visit_field_access(n, cursor, p)),
        Expression::Literal(n) => Expression::Literal(visitor.visit_literal(n, cursor, p)),
        Expression::MethodInvocation(n) => {
            Expression::MethodInvocation(visitor.visit_method_invocation(n, cursor, p))
        }
        Expression::Assignment(n) => Expression::Assignment(visitor.visit_assignment(n, cursor, p)),
        Expression::NewClass(n) => Expression::NewClass(visitor.visit_new_class(n, cursor, p)),
        Expression::NewArray(n) => Expression::NewArray(visitor.visit_new_array(n, cursor, p)),
        Expression::Binary(n) => Expression::Binary(visitor.visit_binary(n, cursor, p)),
        Expression::Unary(n) => Expression::Unary(visitor.visit_unary(n, cursor, p)),
        Expression::Parentheses(n) => Expression::Parentheses(visitor.visit_parentheses(n, cursor, p)),
    }
}

/// Visit a node of any kind. Expression variants go through
/// [`JavaVisitor::visit_expression`]; `cursor` must have `node` as its value.
pub fn visit_j<V, P>(visitor: &mut V, node: J, cursor: &Cursor<'_, J>, p: &mut P) -> J
where
    V: JavaVisitor<P> + ?Sized,
{
    match node {
        J::CompilationUnit(n) => J::CompilationUnit(visitor.visit_compilation_unit(n, cursor, p)),
        J::Package(n) => J::Package(visitor.visit_package(n, cursor, p)),
        J::Import(n) => J::Import(visitor.visit_import(n, cursor, p)),
        J::ClassDeclaration(n) => J::ClassDeclaration(visitor.visit_class_declaration(n, cursor, p)),
        J::Annotation(n) => J::Annotation(visitor.visit_annotation(n, cursor, p)),
        J::Modifier(n) => J::Modifier(visitor.visit_modifier(n, cursor, p)),
        J::TypeParameter(n) => J::TypeParameter(visitor.visit_type_parameter(n, cursor, p)),
        J::MethodDeclaration(n) => J::MethodDeclaration(visitor.visit_method_declaration(n, cursor, p)),
        J::VariableDeclarations(n) => J::VariableDeclarations(visitor.visit_variable_declarations(n, cursor, p)),
        J::NamedVariable(n) => J::NamedVariable(visitor.visit_named_variable(n, cursor, p)),
        J::Block(n) => J::Block(visitor.visit_block(n, cursor, p)),
        J::Return(n) => J::Return(visitor.visit_return(n, cursor, p)),
        J::If(n) => J::If(visitor.visit_if(n, cursor, p)),
        J::Else(n) => J::Else(visitor.visit_else(n, cursor, p)),
        J::WhileLoop(n) => J::WhileLoop(visitor.visit_while_loop(n, cursor, p)),
        J::Throw(n) => J::Throw(visitor.visit_throw(n, cursor, p)),
        J::TypeName(n) => J::TypeName(visitor.visit_type_name(n, cursor, p)),
        J::Identifier(n) => J::from(visitor.visit_expression(Expression::Identifier(n), cursor, p)),
        J::FieldAccess(n) => J::from(visitor.visit_expression(Expression::FieldAccess(n), cursor, p)),
        J::Literal(n) => J::from(visitor.visit_expression(Expression::Literal(n), cursor, p)),
        J::MethodInvocation(n) => J::from(visitor.visit_expression(Expression::MethodInvocation(n), cursor, p)),
        J::Assignment(n) => J::from(visitor.visit_expression(Expression::Assignment(n), cursor, p)),
        J::NewClass(n) => J::from(visitor.visit_expression(Expression::NewClass(n), cursor, p)),
        J::NewArray(n) => J::from(visitor.visit_expression(Expression::NewArray(n), cursor, p)),
        J::Binary(n) => J::from(visitor.visit_expression(Expression::Binary(n), cursor, p)),
        J::Unary(n) => J::from(visitor.visit_expression(Expression::Unary(n), cursor, p)),
        J::Parentheses(n) => J::from(visitor.visit_expression(Expression::Parentheses(n), cursor, p)),
    }
}

/// Adapts a [`JavaVisitor`] to the pipeline. Sources of other grammars pass
/// through untouched.
pub struct JavaTreeVisitor<V>(pub V);

impl<V: JavaVisitor<ExecutionContext>> TreeVisitor for JavaTreeVisitor<V> {
    fn visit_source(&mut self, source: SourceRef, ctx: &mut ExecutionContext) -> SourceRef {
        match downcast_source::<CompilationUnit>(source) {
            Ok(unit) => self.0.visit_root(unit, ctx),
            Err(other) => other,
        }
    }
}

// ============================================================================
// Accumulating visitor
// ============================================================================

/// Hooks over [`Fold`] for the nodes searches usually care about; every
/// other node goes through [`visit_node`](Self::visit_node).
pub trait JavaSourceVisitor: Fold<J> + Sized {
    fn visit_compilation_unit(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    fn visit_class_declaration(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    fn visit_method_declaration(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    fn visit_variable_declarations(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    fn visit_block(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    fn visit_method_invocation(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    fn visit_assignment(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    fn visit_identifier(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        self.default_to(cursor)
    }

    /// Any other node.
    fn visit_node(&mut self, cursor: &Cursor<'_, J>) -> Self::Output {
        fold_children(self, cursor, fold_j::<Self>)
    }

    /// Fold a whole compilation unit.
    fn fold_compilation_unit(&mut self, unit: &Arc<CompilationUnit>) -> Self::Output {
        let cursor = Cursor::root(J::CompilationUnit(Arc::clone(unit)));
        fold_j(self, &cursor)
    }
}

/// Dispatch to the hook for the node at `cursor`.
pub fn fold_j<V: JavaSourceVisitor>(visitor: &mut V, cursor: &Cursor<'_, J>) -> V::Output {
    match cursor.value() {
        J::CompilationUnit(_) => visitor.visit_compilation_unit(cursor),
        J::ClassDeclaration(_) => visitor.visit_class_declaration(cursor),
        J::MethodDeclaration(_) => visitor.visit_method_declaration(cursor),
        J::VariableDeclarations(_) => visitor.visit_variable_declarations(cursor),
        J::Block(_) => visitor.visit_block(cursor),
        J::MethodInvocation(_) => visitor.visit_method_invocation(cursor),
        J::Assignment(_) => visitor.visit_assignment(cursor),
        J::Identifier(_) => visitor.visit_identifier(cursor),
        _ => visitor.visit_node(cursor),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_syntax;
    use reweave_core::print::Codegen;

    const SOURCE: &str = "package a;\n\npublic class A {\n    int x;\n\n    void m(int y) {\n        x = y + 1;\n        m(x);\n    }\n\n    class Inner {\n        void n() { }\n    }\n}\n";

    struct Nothing;

    impl JavaVisitor<()> for Nothing {}

    #[test]
    fn visitor_matching_nothing_keeps_every_node() {
        let unit = parse_syntax("A.java", SOURCE).unwrap();
        let out = Nothing.visit_root(Arc::clone(&unit), &mut ());
        assert!(Arc::ptr_eq(&unit, &out));
    }

    struct RenameIdentifier;

    impl JavaVisitor<()> for RenameIdentifier {
        fn visit_identifier(&mut self, identifier: Arc<Identifier>, _: &Cursor<'_, J>, _: &mut ()) -> Arc<Identifier> {
            if identifier.name == "y" {
                identifier.with_name("z".to_string())
            } else {
                identifier
            }
        }
    }

    #[test]
    fn rewrite_rebuilds_only_the_changed_path() {
        let unit = parse_syntax("A.java", SOURCE).unwrap();
        let out = RenameIdentifier.visit_root(Arc::clone(&unit), &mut ());
        assert_eq!(Codegen::print(out.as_ref()), SOURCE.replace("int y", "int z").replace("y + 1", "z + 1"));
        assert!(Arc::ptr_eq(&unit.package.as_ref().unwrap().element, &out.package.as_ref().unwrap().element));
        let old_fields: Vec<_> = unit.classes[0].fields().collect();
        let new_fields: Vec<_> = out.classes[0].fields().collect();
        assert!(Arc::ptr_eq(old_fields[0], new_fields[0]));
        assert_eq!(unit.classes[0].id, out.classes[0].id);
    }

    /// Records the class enclosing every method.
    struct Enclosing(Vec<String>);

    impl JavaVisitor<()> for Enclosing {
        fn visit_method_declaration(
            &mut self,
            method: Arc<MethodDeclaration>,
            cursor: &Cursor<'_, J>,
            p: &mut (),
        ) -> Arc<MethodDeclaration> {
            if let Ok(class) = enclosing_class_or_err(cursor) {
                self.0.push(format!("{}.{}", class.name.name, method.name.name));
            }
            walk_method_declaration(self, method, cursor, p)
        }

        fn visit_method_invocation(
            &mut self,
            call: Arc<MethodInvocation>,
            cursor: &Cursor<'_, J>,
            p: &mut (),
        ) -> Arc<MethodInvocation> {
            if let Some(method) = enclosing_method(cursor) {
                self.0.push(format!("{}>{}", method.name.name, call.name.name));
            }
            walk_method_invocation(self, call, cursor, p)
        }
    }

    #[test]
    fn enclosing_lookups_skip_the_node_itself() {
        let unit = parse_syntax("A.java", SOURCE).unwrap();
        let mut visitor = Enclosing(Vec::new());
        visitor.visit_root(unit, &mut ());
        assert_eq!(visitor.0, vec!["A.m", "m>m", "Inner.n"]);
    }

    #[test]
    fn missing_class_is_an_error() {
        let unit = parse_syntax("A.java", SOURCE).unwrap();
        let cursor = Cursor::root(J::CompilationUnit(unit));
        let err = enclosing_class_or_err(&cursor).unwrap_err();
        assert_eq!(err.kind, "ClassDeclaration");
    }

    struct CountCalls;

    impl Fold<J> for CountCalls {
        type Output = usize;

        fn default_to(&mut self, cursor: &Cursor<'_, J>) -> usize {
            usize::from(matches!(cursor.value(), J::MethodInvocation(_)))
        }

        fn reduce(&mut self, left: usize, right: usize) -> usize {
            left + right
        }
    }

    impl JavaSourceVisitor for CountCalls {}

    #[test]
    fn fold_counts_calls() {
        let unit = parse_syntax("A.java", SOURCE).unwrap();
        assert_eq!(CountCalls.fold_compilation_unit(&unit), 1);
    }
}
