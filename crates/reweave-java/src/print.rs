// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing Java trees.

use reweave_core::print::{Codegen, CodegenState};
use reweave_core::tree::{Container, Space};

use crate::tree::{
    Annotation, Assignment, Binary, Block, ClassDeclaration, CompilationUnit, Decoration, Else, Expression,
    FieldAccess, Identifier, If, Import, Literal, MethodDeclaration, MethodInvocation, Modifier, NamedVariable,
    NewArray, NewClass, Package, Parentheses, Return, Statement, Throw, TypeName, TypeParameter, Unary,
    VariableDeclarations, WhileLoop, J,
};

/// `before open a after , b after close`, with `end` before `close` when
/// the list is empty.
fn delimited<T: Codegen>(state: &mut CodegenState, container: &Container<T>, open: &str, separator: &str, close: &str) {
    container.before.codegen(state);
    state.add_token(open);
    for (i, element) in container.elements.iter().enumerate() {
        if i > 0 {
            state.add_token(separator);
        }
        element.element.codegen(state);
        element.after.codegen(state);
    }
    if container.elements.is_empty() {
        container.end.codegen(state);
    }
    state.add_token(close);
}

/// `before keyword a after , b after`, for `extends`, `implements` and
/// `throws` lists.
fn keyword_list<T: Codegen>(state: &mut CodegenState, container: &Container<T>, keyword: &str, separator: &str) {
    container.before.codegen(state);
    state.add_token(keyword);
    for (i, element) in container.elements.iter().enumerate() {
        if i > 0 {
            state.add_token(separator);
        }
        element.element.codegen(state);
        element.after.codegen(state);
    }
}

fn statement_with_semicolon(state: &mut CodegenState, statement: &Statement, after: &Space) {
    statement.codegen(state);
    after.codegen(state);
    if statement.needs_semicolon() {
        state.add_token(";");
    }
}

impl Codegen for CompilationUnit {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        if let Some(package) = &self.package {
            package.element.codegen(state);
            package.after.codegen(state);
            state.add_token(";");
        }
        for import in &self.imports {
            import.element.codegen(state);
            import.after.codegen(state);
            state.add_token(";");
        }
        for class in &self.classes {
            class.codegen(state);
        }
        self.eof.codegen(state);
    }
}

impl Codegen for Package {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("package");
        self.name.codegen(state);
    }
}

impl Codegen for Import {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("import");
        if let Some(statik) = &self.statik {
            statik.codegen(state);
            state.add_token("static");
        }
        self.qualid.codegen(state);
    }
}

impl Codegen for Decoration {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Decoration::Annotation(n) => n.codegen(state),
            Decoration::Modifier(n) => n.codegen(state),
        }
    }
}

impl Codegen for ClassDeclaration {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        for decoration in &self.decorations {
            decoration.codegen(state);
        }
        self.kind_prefix.codegen(state);
        state.add_token(self.kind.keyword());
        self.name.codegen(state);
        if let Some(type_parameters) = &self.type_parameters {
            delimited(state, type_parameters, "<", ",", ">");
        }
        if let Some(extends) = &self.extends {
            keyword_list(state, extends, "extends", ",");
        }
        if let Some(implements) = &self.implements {
            keyword_list(state, implements, "implements", ",");
        }
        self.body.codegen(state);
    }
}

impl Codegen for Annotation {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("@");
        self.annotation_type.codegen(state);
        if let Some(arguments) = &self.arguments {
            delimited(state, arguments, "(", ",", ")");
        }
    }
}

impl Codegen for Modifier {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token(&self.keyword);
    }
}

impl Codegen for TypeParameter {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        for annotation in &self.annotations {
            annotation.codegen(state);
        }
        self.name.codegen(state);
        if let Some(bounds) = &self.bounds {
            keyword_list(state, bounds, "extends", "&");
        }
    }
}

impl Codegen for MethodDeclaration {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        for decoration in &self.decorations {
            decoration.codegen(state);
        }
        if let Some(type_parameters) = &self.type_parameters {
            delimited(state, type_parameters, "<", ",", ">");
        }
        for annotation in &self.type_annotations {
            annotation.codegen(state);
        }
        self.return_type.codegen(state);
        self.name.codegen(state);
        delimited(state, &self.params, "(", ",", ")");
        if let Some(throws) = &self.throws {
            keyword_list(state, throws, "throws", ",");
        }
        if let Some(default_value) = &self.default_value {
            default_value.before.codegen(state);
            state.add_token("default");
            default_value.element.codegen(state);
        }
        self.body.codegen(state);
    }
}

impl Codegen for VariableDeclarations {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        for decoration in &self.decorations {
            decoration.codegen(state);
        }
        self.type_expr.codegen(state);
        if let Some(varargs) = &self.varargs {
            varargs.codegen(state);
            state.add_token("...");
        }
        for (i, variable) in self.variables.iter().enumerate() {
            if i > 0 {
                state.add_token(",");
            }
            variable.element.codegen(state);
            variable.after.codegen(state);
        }
    }
}

impl Codegen for NamedVariable {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.name.codegen(state);
        if let Some(initializer) = &self.initializer {
            initializer.before.codegen(state);
            state.add_token("=");
            initializer.element.codegen(state);
        }
    }
}

impl Codegen for Block {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("{");
        for statement in &self.statements {
            statement_with_semicolon(state, &statement.element, &statement.after);
        }
        self.end.codegen(state);
        state.add_token("}");
    }
}

impl Codegen for Statement {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Statement::ClassDeclaration(n) => n.codegen(state),
            Statement::MethodDeclaration(n) => n.codegen(state),
            Statement::VariableDeclarations(n) => n.codegen(state),
            Statement::Block(n) => n.codegen(state),
            Statement::Return(n) => n.codegen(state),
            Statement::If(n) => n.codegen(state),
            Statement::WhileLoop(n) => n.codegen(state),
            Statement::Throw(n) => n.codegen(state),
            Statement::MethodInvocation(n) => n.codegen(state),
            Statement::Assignment(n) => n.codegen(state),
            Statement::NewClass(n) => n.codegen(state),
        }
    }
}

impl Codegen for Return {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("return");
        self.expression.codegen(state);
    }
}

impl Codegen for If {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("if");
        self.condition.codegen(state);
        statement_with_semicolon(state, &self.then_part.element, &self.then_part.after);
        self.else_part.codegen(state);
    }
}

impl Codegen for Else {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("else");
        statement_with_semicolon(state, &self.body.element, &self.body.after);
    }
}

impl Codegen for WhileLoop {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("while");
        self.condition.codegen(state);
        statement_with_semicolon(state, &self.body.element, &self.body.after);
    }
}

impl Codegen for Throw {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("throw");
        self.exception.codegen(state);
    }
}

impl Codegen for Expression {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Expression::Identifier(n) => n.codegen(state),
            Expression::FieldAccess(n) => n.codegen(state),
            Expression::Literal(n) => n.codegen(state),
            Expression::MethodInvocation(n) => n.codegen(state),
            Expression::Assignment(n) => n.codegen(state),
            Expression::NewClass(n) => n.codegen(state),
            Expression::NewArray(n) => n.codegen(state),
            Expression::Binary(n) => n.codegen(state),
            Expression::Unary(n) => n.codegen(state),
            Expression::Parentheses(n) => n.codegen(state),
        }
    }
}

impl Codegen for Identifier {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token(&self.name);
    }
}

impl Codegen for FieldAccess {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.target.codegen(state);
        self.name.before.codegen(state);
        state.add_token(".");
        self.name.element.codegen(state);
    }
}

impl Codegen for Literal {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token(&self.value_source);
    }
}

impl Codegen for MethodInvocation {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        if let Some(select) = &self.select {
            select.element.codegen(state);
            select.after.codegen(state);
            state.add_token(".");
        }
        self.name.codegen(state);
        delimited(state, &self.args, "(", ",", ")");
    }
}

impl Codegen for Assignment {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.variable.codegen(state);
        self.assignment.before.codegen(state);
        state.add_token("=");
        self.assignment.element.codegen(state);
    }
}

impl Codegen for NewClass {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("new");
        self.clazz.codegen(state);
        delimited(state, &self.args, "(", ",", ")");
    }
}

impl Codegen for NewArray {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        delimited(state, &self.initializer, "{", ",", "}");
    }
}

impl Codegen for Binary {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.left.codegen(state);
        self.operator.before.codegen(state);
        state.add_token(self.operator.element.as_str());
        self.right.codegen(state);
    }
}

impl Codegen for Unary {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token(self.operator.as_str());
        self.expression.codegen(state);
    }
}

impl Codegen for Parentheses {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        state.add_token("(");
        self.tree.element.codegen(state);
        self.tree.after.codegen(state);
        state.add_token(")");
    }
}

impl Codegen for TypeName {
    fn codegen(&self, state: &mut CodegenState) {
        self.prefix.codegen(state);
        self.name.codegen(state);
        if let Some(type_arguments) = &self.type_arguments {
            delimited(state, type_arguments, "<", ",", ">");
        }
        for dimension in &self.dimensions {
            dimension.before.codegen(state);
            state.add_token("[");
            dimension.inner.codegen(state);
            state.add_token("]");
        }
    }
}

impl Codegen for J {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            J::CompilationUnit(n) => n.codegen(state),
            J::Package(n) => n.codegen(state),
            J::Import(n) => n.codegen(state),
            J::ClassDeclaration(n) => n.codegen(state),
            J::Annotation(n) => n.codegen(state),
            J::Modifier(n) => n.codegen(state),
            J::TypeParameter(n) => n.codegen(state),
            J::MethodDeclaration(n) => n.codegen(state),
            J::VariableDeclarations(n) => n.codegen(state),
            J::NamedVariable(n) => n.codegen(state),
            J::Block(n) => n.codegen(state),
            J::Return(n) => n.codegen(state),
            J::If(n) => n.codegen(state),
            J::Else(n) => n.codegen(state),
            J::WhileLoop(n) => n.codegen(state),
            J::Throw(n) => n.codegen(state),
            J::Identifier(n) => n.codegen(state),
            J::FieldAccess(n) => n.codegen(state),
            J::Literal(n) => n.codegen(state),
            J::MethodInvocation(n) => n.codegen(state),
            J::Assignment(n) => n.codegen(state),
            J::NewClass(n) => n.codegen(state),
            J::NewArray(n) => n.codegen(state),
            J::Binary(n) => n.codegen(state),
            J::Unary(n) => n.codegen(state),
            J::Parentheses(n) => n.codegen(state),
            J::TypeName(n) => n.codegen(state),
        }
    }
}
