// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node types for the supported Java subset.
//!
//! Nodes own the whitespace and comments before their first token in
//! `prefix`. When a node starts with a child (a method call starts with its
//! select, an assignment with its variable), the prefix belongs to the outer
//! node and the child's prefix is empty. Delimiters carry the space before
//! them through [`Padded`], [`LeftPadded`] and [`Container`].
//!
//! Three sums cover the nodes:
//!
//! - [`J`]: every node, as seen by cursors and accumulating visitors
//! - [`Statement`]: what a [`Block`] holds (class members included)
//! - [`Expression`]: what an expression position holds
//!
//! Attributed types live on the nodes themselves (`ty`, `method_type`,
//! `variable_type`) and are filled in by [`JavaParser`](crate::JavaParser).

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reweave_core::print::Codegen;
use reweave_core::tree::{Container, LeftPadded, NodeId, Padded, SourceFile, Space, TreeNode, Unchanged};
use reweave_core::typing::{Flag, MethodType, Type, VarType};
use reweave_core::{impl_tree, with_methods, Markers};

// ============================================================================
// Sums
// ============================================================================

/// Any Java node.
#[derive(Debug, Clone)]
pub enum J {
    CompilationUnit(Arc<CompilationUnit>),
    Package(Arc<Package>),
    Import(Arc<Import>),
    ClassDeclaration(Arc<ClassDeclaration>),
    Annotation(Arc<Annotation>),
    Modifier(Arc<Modifier>),
    TypeParameter(Arc<TypeParameter>),
    MethodDeclaration(Arc<MethodDeclaration>),
    VariableDeclarations(Arc<VariableDeclarations>),
    NamedVariable(Arc<NamedVariable>),
    Block(Arc<Block>),
    Return(Arc<Return>),
    If(Arc<If>),
    Else(Arc<Else>),
    WhileLoop(Arc<WhileLoop>),
    Throw(Arc<Throw>),
    Identifier(Arc<Identifier>),
    FieldAccess(Arc<FieldAccess>),
    Literal(Arc<Literal>),
    MethodInvocation(Arc<MethodInvocation>),
    Assignment(Arc<Assignment>),
    NewClass(Arc<NewClass>),
    NewArray(Arc<NewArray>),
    Binary(Arc<Binary>),
    Unary(Arc<Unary>),
    Parentheses(Arc<Parentheses>),
    TypeName(Arc<TypeName>),
}

/// Sub-sums of [`J`] share accessors and convert into it.
macro_rules! node_sum {
    ($name:ident { $($variant:ident),* $(,)? }) => {
        reweave_core::unchanged_enum!($name { $($variant),* });

        impl $name {
            pub fn id(&self) -> NodeId {
                match self {
                    $($name::$variant(node) => node.id,)*
                }
            }

            pub fn prefix(&self) -> &Space {
                match self {
                    $($name::$variant(node) => &node.prefix,)*
                }
            }

            pub fn markers(&self) -> &Markers {
                match self {
                    $($name::$variant(node) => &node.markers,)*
                }
            }

            /// The same node with a different prefix.
            pub fn with_prefix(self, prefix: Space) -> Self {
                match self {
                    $($name::$variant(node) => $name::$variant(node.with_prefix(prefix)),)*
                }
            }

            pub fn kind(&self) -> &'static str {
                match self {
                    $($name::$variant(_) => stringify!($variant),)*
                }
            }
        }

        impl From<$name> for J {
            fn from(node: $name) -> J {
                match node {
                    $($name::$variant(node) => J::$variant(node),)*
                }
            }
        }
    };
}

/// A member of a class body or a statement of a method body.
#[derive(Debug, Clone)]
pub enum Statement {
    ClassDeclaration(Arc<ClassDeclaration>),
    MethodDeclaration(Arc<MethodDeclaration>),
    VariableDeclarations(Arc<VariableDeclarations>),
    Block(Arc<Block>),
    Return(Arc<Return>),
    If(Arc<If>),
    WhileLoop(Arc<WhileLoop>),
    Throw(Arc<Throw>),
    MethodInvocation(Arc<MethodInvocation>),
    Assignment(Arc<Assignment>),
    NewClass(Arc<NewClass>),
}

node_sum!(Statement {
    ClassDeclaration,
    MethodDeclaration,
    VariableDeclarations,
    Block,
    Return,
    If,
    WhileLoop,
    Throw,
    MethodInvocation,
    Assignment,
    NewClass,
});

impl Statement {
    /// An expression that can stand alone as a statement.
    pub fn from_expression(expression: Expression) -> Option<Statement> {
        match expression {
            Expression::MethodInvocation(n) => Some(Statement::MethodInvocation(n)),
            Expression::Assignment(n) => Some(Statement::Assignment(n)),
            Expression::NewClass(n) => Some(Statement::NewClass(n)),
            _ => None,
        }
    }

    /// True if the statement is terminated by `;`.
    pub fn needs_semicolon(&self) -> bool {
        match self {
            Statement::VariableDeclarations(_)
            | Statement::Return(_)
            | Statement::Throw(_)
            | Statement::MethodInvocation(_)
            | Statement::Assignment(_)
            | Statement::NewClass(_) => true,
            Statement::MethodDeclaration(method) => method.body.is_none(),
            Statement::ClassDeclaration(_) | Statement::Block(_) | Statement::If(_) | Statement::WhileLoop(_) => {
                false
            }
        }
    }

    pub fn as_method_invocation(&self) -> Option<&Arc<MethodInvocation>> {
        match self {
            Statement::MethodInvocation(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_assignment(&self) -> Option<&Arc<Assignment>> {
        match self {
            Statement::Assignment(n) => Some(n),
            _ => None,
        }
    }
}

/// A value-producing node.
#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Arc<Identifier>),
    FieldAccess(Arc<FieldAccess>),
    Literal(Arc<Literal>),
    MethodInvocation(Arc<MethodInvocation>),
    Assignment(Arc<Assignment>),
    NewClass(Arc<NewClass>),
    NewArray(Arc<NewArray>),
    Binary(Arc<Binary>),
    Unary(Arc<Unary>),
    Parentheses(Arc<Parentheses>),
}

node_sum!(Expression {
    Identifier,
    FieldAccess,
    Literal,
    MethodInvocation,
    Assignment,
    NewClass,
    NewArray,
    Binary,
    Unary,
    Parentheses,
});

impl Expression {
    /// Attributed type of the value, if known.
    pub fn ty(&self) -> Option<Type> {
        match self {
            Expression::Identifier(n) => n.ty.clone(),
            Expression::FieldAccess(n) => n.ty.clone(),
            Expression::Literal(n) => n.ty.clone(),
            Expression::MethodInvocation(n) => n.return_type(),
            Expression::Assignment(n) => n.ty.clone(),
            Expression::NewClass(n) => n.clazz.ty.clone(),
            Expression::NewArray(_) => None,
            Expression::Binary(n) => n.ty.clone(),
            Expression::Unary(n) => n.ty.clone(),
            Expression::Parentheses(n) => n.tree.element.ty(),
        }
    }

    /// The last name of an identifier or field access.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            Expression::Identifier(n) => Some(&n.name),
            Expression::FieldAccess(n) => Some(&n.name.element.name),
            _ => None,
        }
    }

    /// `a.b.c` for identifier and field access chains, without whitespace.
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Expression::Identifier(n) => Some(n.name.clone()),
            Expression::FieldAccess(n) => {
                let target = n.target.qualified_name()?;
                Some(format!("{}.{}", target, n.name.element.name))
            }
            _ => None,
        }
    }

    pub fn as_method_invocation(&self) -> Option<&Arc<MethodInvocation>> {
        match self {
            Expression::MethodInvocation(n) => Some(n),
            _ => None,
        }
    }
}

/// Annotations and modifiers, in source order.
#[derive(Debug, Clone)]
pub enum Decoration {
    Annotation(Arc<Annotation>),
    Modifier(Arc<Modifier>),
}

node_sum!(Decoration { Annotation, Modifier });

/// Modifiers among `decorations`.
fn modifiers(decorations: &[Decoration]) -> impl Iterator<Item = &Arc<Modifier>> {
    decorations.iter().filter_map(|d| match d {
        Decoration::Modifier(m) => Some(m),
        Decoration::Annotation(_) => None,
    })
}

/// Annotations among `decorations`.
fn annotations(decorations: &[Decoration]) -> impl Iterator<Item = &Arc<Annotation>> {
    decorations.iter().filter_map(|d| match d {
        Decoration::Annotation(a) => Some(a),
        Decoration::Modifier(_) => None,
    })
}

/// Flags of the modifiers among `decorations`.
pub fn flags(decorations: &[Decoration]) -> impl Iterator<Item = Flag> + '_ {
    modifiers(decorations).filter_map(|m| m.flag())
}

// ============================================================================
// Compilation unit
// ============================================================================

/// A parsed `.java` file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: PathBuf,
    /// `package a.b;`, padded by the space before `;`.
    pub package: Option<Padded<Arc<Package>>>,
    pub imports: Vec<Padded<Arc<Import>>>,
    pub classes: Vec<Arc<ClassDeclaration>>,
    pub eof: Space,
}

with_methods!(CompilationUnit {
    prefix: Space,
    markers: Markers,
    source_path: PathBuf,
    package: Option<Padded<Arc<Package>>>,
    imports: Vec<Padded<Arc<Import>>>,
    classes: Vec<Arc<ClassDeclaration>>,
    eof: Space,
});

impl CompilationUnit {
    pub fn package_name(&self) -> Option<String> {
        self.package.as_ref().and_then(|p| p.element.name.qualified_name())
    }

    pub fn imports(&self) -> impl Iterator<Item = &Arc<Import>> {
        self.imports.iter().map(|p| &p.element)
    }

    /// Top-level class with this simple name.
    pub fn class(&self, name: &str) -> Option<&Arc<ClassDeclaration>> {
        self.classes.iter().find(|c| c.name.name == name)
    }
}

/// `package a.b`
#[derive(Debug, Clone)]
pub struct Package {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: Expression,
}

with_methods!(Package {
    prefix: Space,
    markers: Markers,
    name: Expression,
});

/// `import [static] a.b.C` or `import a.b.*`
#[derive(Debug, Clone)]
pub struct Import {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Space before `static`, for static imports.
    pub statik: Option<Space>,
    pub qualid: Expression,
}

with_methods!(Import {
    prefix: Space,
    markers: Markers,
    statik: Option<Space>,
    qualid: Expression,
});

impl Import {
    /// The imported name, `*` included.
    pub fn type_name(&self) -> String {
        self.qualid.qualified_name().unwrap_or_default()
    }

    pub fn is_static(&self) -> bool {
        self.statik.is_some()
    }

    pub fn is_wildcard(&self) -> bool {
        self.qualid.simple_name() == Some("*")
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    /// `@interface`
    Annotation,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Annotation => "@interface",
        }
    }
}

impl Unchanged for ClassKind {
    fn unchanged(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub decorations: Vec<Decoration>,
    /// Space before the `class` keyword.
    pub kind_prefix: Space,
    pub kind: ClassKind,
    pub name: Arc<Identifier>,
    pub type_parameters: Option<Container<Arc<TypeParameter>>>,
    /// `extends A`; `before` is the space before the keyword.
    pub extends: Option<Container<Arc<TypeName>>>,
    pub implements: Option<Container<Arc<TypeName>>>,
    pub body: Arc<Block>,
    pub ty: Option<Type>,
}

with_methods!(ClassDeclaration {
    prefix: Space,
    markers: Markers,
    decorations: Vec<Decoration>,
    kind_prefix: Space,
    kind: ClassKind,
    name: Arc<Identifier>,
    type_parameters: Option<Container<Arc<TypeParameter>>>,
    extends: Option<Container<Arc<TypeName>>>,
    implements: Option<Container<Arc<TypeName>>>,
    body: Arc<Block>,
    ty: Option<Type>,
});

impl ClassDeclaration {
    pub fn annotations(&self) -> impl Iterator<Item = &Arc<Annotation>> {
        annotations(&self.decorations)
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        flags(&self.decorations).any(|f| f == flag)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodDeclaration>> {
        self.body.statements.iter().filter_map(|s| match &s.element {
            Statement::MethodDeclaration(m) => Some(m),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &Arc<VariableDeclarations>> {
        self.body.statements.iter().filter_map(|s| match &s.element {
            Statement::VariableDeclarations(v) => Some(v),
            _ => None,
        })
    }
}

/// `@Name`, `@Name(args)`
#[derive(Debug, Clone)]
pub struct Annotation {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The name; its prefix is the space after `@`.
    pub annotation_type: Expression,
    pub arguments: Option<Container<Expression>>,
}

with_methods!(Annotation {
    prefix: Space,
    markers: Markers,
    annotation_type: Expression,
    arguments: Option<Container<Expression>>,
});

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.annotation_type.simple_name().unwrap_or_default()
    }
}

/// `public`, `static`, ...
#[derive(Debug, Clone)]
pub struct Modifier {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub keyword: String,
}

with_methods!(Modifier {
    prefix: Space,
    markers: Markers,
    keyword: String,
});

impl Modifier {
    pub fn flag(&self) -> Option<Flag> {
        Flag::from_keyword(&self.keyword)
    }
}

/// `T`, `T extends A & B`
#[derive(Debug, Clone)]
pub struct TypeParameter {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub annotations: Vec<Arc<Annotation>>,
    pub name: Arc<Identifier>,
    /// Bounds separated by `&`; `before` is the space before `extends`.
    pub bounds: Option<Container<Arc<TypeName>>>,
}

with_methods!(TypeParameter {
    prefix: Space,
    markers: Markers,
    annotations: Vec<Arc<Annotation>>,
    name: Arc<Identifier>,
    bounds: Option<Container<Arc<TypeName>>>,
});

/// A method or constructor.
#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub decorations: Vec<Decoration>,
    pub type_parameters: Option<Container<Arc<TypeParameter>>>,
    /// Annotations between the type parameters and the return type.
    pub type_annotations: Vec<Arc<Annotation>>,
    /// Absent for constructors.
    pub return_type: Option<Arc<TypeName>>,
    pub name: Arc<Identifier>,
    pub params: Container<Arc<VariableDeclarations>>,
    pub throws: Option<Container<Arc<TypeName>>>,
    /// `default value` of an annotation type element.
    pub default_value: Option<LeftPadded<Expression>>,
    /// Absent for abstract and interface methods.
    pub body: Option<Arc<Block>>,
    pub method_type: Option<Arc<MethodType>>,
}

with_methods!(MethodDeclaration {
    prefix: Space,
    markers: Markers,
    decorations: Vec<Decoration>,
    type_parameters: Option<Container<Arc<TypeParameter>>>,
    type_annotations: Vec<Arc<Annotation>>,
    return_type: Option<Arc<TypeName>>,
    name: Arc<Identifier>,
    params: Container<Arc<VariableDeclarations>>,
    throws: Option<Container<Arc<TypeName>>>,
    default_value: Option<LeftPadded<Expression>>,
    body: Option<Arc<Block>>,
    method_type: Option<Arc<MethodType>>,
});

impl MethodDeclaration {
    pub fn annotations(&self) -> impl Iterator<Item = &Arc<Annotation>> {
        annotations(&self.decorations).chain(self.type_annotations.iter())
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        flags(&self.decorations).any(|f| f == flag)
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Arc<VariableDeclarations>> {
        self.params.iter()
    }
}

/// `int a = 1, b;` (the `;` belongs to the enclosing block) or a parameter.
#[derive(Debug, Clone)]
pub struct VariableDeclarations {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub decorations: Vec<Decoration>,
    pub type_expr: Arc<TypeName>,
    /// Space before `...` of a varargs parameter.
    pub varargs: Option<Space>,
    /// Each padded by the space before the following `,`.
    pub variables: Vec<Padded<Arc<NamedVariable>>>,
}

with_methods!(VariableDeclarations {
    prefix: Space,
    markers: Markers,
    decorations: Vec<Decoration>,
    type_expr: Arc<TypeName>,
    varargs: Option<Space>,
    variables: Vec<Padded<Arc<NamedVariable>>>,
});

impl VariableDeclarations {
    pub fn has_flag(&self, flag: Flag) -> bool {
        flags(&self.decorations).any(|f| f == flag)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Arc<NamedVariable>> {
        self.variables.iter().map(|p| &p.element)
    }
}

/// One declared name, with its initializer.
#[derive(Debug, Clone)]
pub struct NamedVariable {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: Arc<Identifier>,
    /// `= value`, padded by the space before `=`.
    pub initializer: Option<LeftPadded<Expression>>,
    pub variable_type: Option<Arc<VarType>>,
}

with_methods!(NamedVariable {
    prefix: Space,
    markers: Markers,
    name: Arc<Identifier>,
    initializer: Option<LeftPadded<Expression>>,
    variable_type: Option<Arc<VarType>>,
});

// ============================================================================
// Statements
// ============================================================================

/// `{ statements }`, also used for class bodies.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Each padded by the space before its `;`, when it has one.
    pub statements: Vec<Padded<Statement>>,
    /// Space before `}`.
    pub end: Space,
}

with_methods!(Block {
    prefix: Space,
    markers: Markers,
    statements: Vec<Padded<Statement>>,
    end: Space,
});

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().map(|p| &p.element)
    }
}

#[derive(Debug, Clone)]
pub struct Return {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: Option<Expression>,
}

with_methods!(Return {
    prefix: Space,
    markers: Markers,
    expression: Option<Expression>,
});

#[derive(Debug, Clone)]
pub struct If {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub condition: Arc<Parentheses>,
    pub then_part: Padded<Statement>,
    pub else_part: Option<Arc<Else>>,
}

with_methods!(If {
    prefix: Space,
    markers: Markers,
    condition: Arc<Parentheses>,
    then_part: Padded<Statement>,
    else_part: Option<Arc<Else>>,
});

#[derive(Debug, Clone)]
pub struct Else {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub body: Padded<Statement>,
}

with_methods!(Else {
    prefix: Space,
    markers: Markers,
    body: Padded<Statement>,
});

#[derive(Debug, Clone)]
pub struct WhileLoop {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub condition: Arc<Parentheses>,
    pub body: Padded<Statement>,
}

with_methods!(WhileLoop {
    prefix: Space,
    markers: Markers,
    condition: Arc<Parentheses>,
    body: Padded<Statement>,
});

#[derive(Debug, Clone)]
pub struct Throw {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub exception: Expression,
}

with_methods!(Throw {
    prefix: Space,
    markers: Markers,
    exception: Expression,
});

// ============================================================================
// Expressions
// ============================================================================

/// A simple name, including `this`, `super`, keywords used as type names
/// and the `*` of a wildcard import.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: String,
    pub ty: Option<Type>,
}

with_methods!(Identifier {
    prefix: Space,
    markers: Markers,
    name: String,
    ty: Option<Type>,
});

impl Identifier {
    /// A detached identifier with no prefix.
    pub fn build(name: impl Into<String>, ty: Option<Type>) -> Arc<Identifier> {
        Arc::new(Identifier {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::new(),
            name: name.into(),
            ty,
        })
    }
}

/// `target.name`
#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub target: Expression,
    /// Padded by the space before `.`.
    pub name: LeftPadded<Arc<Identifier>>,
    pub ty: Option<Type>,
}

with_methods!(FieldAccess {
    prefix: Space,
    markers: Markers,
    target: Expression,
    name: LeftPadded<Arc<Identifier>>,
    ty: Option<Type>,
});

impl FieldAccess {
    pub fn simple_name(&self) -> &str {
        &self.name.element.name
    }
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The literal as written.
    pub value_source: String,
    pub ty: Option<Type>,
}

with_methods!(Literal {
    prefix: Space,
    markers: Markers,
    value_source: String,
    ty: Option<Type>,
});

/// `select.name(args)` or `name(args)`
#[derive(Debug, Clone)]
pub struct MethodInvocation {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The receiver, padded by the space before `.`.
    pub select: Option<Padded<Expression>>,
    pub name: Arc<Identifier>,
    pub args: Container<Expression>,
    pub method_type: Option<Arc<MethodType>>,
}

with_methods!(MethodInvocation {
    prefix: Space,
    markers: Markers,
    select: Option<Padded<Expression>>,
    name: Arc<Identifier>,
    args: Container<Expression>,
    method_type: Option<Arc<MethodType>>,
});

impl MethodInvocation {
    pub fn select(&self) -> Option<&Expression> {
        self.select.as_ref().map(|p| &p.element)
    }

    pub fn return_type(&self) -> Option<Type> {
        self.method_type.as_ref().map(|m| m.return_type.clone())
    }

    /// The innermost receiver of a call chain: `a` in `a.b().c()`.
    pub fn root_select(&self) -> Option<&Expression> {
        let mut select = self.select()?;
        while let Expression::MethodInvocation(inner) = select {
            match inner.select() {
                Some(next) => select = next,
                None => break,
            }
        }
        Some(select)
    }
}

/// `variable = value`
#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub variable: Expression,
    /// Padded by the space before `=`.
    pub assignment: LeftPadded<Expression>,
    pub ty: Option<Type>,
}

with_methods!(Assignment {
    prefix: Space,
    markers: Markers,
    variable: Expression,
    assignment: LeftPadded<Expression>,
    ty: Option<Type>,
});

/// `new T(args)`
#[derive(Debug, Clone)]
pub struct NewClass {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The class; its prefix is the space after `new`.
    pub clazz: Arc<TypeName>,
    pub args: Container<Expression>,
    pub constructor_type: Option<Arc<MethodType>>,
}

with_methods!(NewClass {
    prefix: Space,
    markers: Markers,
    clazz: Arc<TypeName>,
    args: Container<Expression>,
    constructor_type: Option<Arc<MethodType>>,
});

/// An array initializer, `{ a, b }`.
#[derive(Debug, Clone)]
pub struct NewArray {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub initializer: Container<Expression>,
}

with_methods!(NewArray {
    prefix: Space,
    markers: Markers,
    initializer: Container<Expression>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Addition => "+",
            BinaryOperator::Subtraction => "-",
            BinaryOperator::Multiplication => "*",
            BinaryOperator::Division => "/",
            BinaryOperator::Modulo => "%",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOperator> {
        let op = match symbol {
            "||" => BinaryOperator::Or,
            "&&" => BinaryOperator::And,
            "|" => BinaryOperator::BitOr,
            "^" => BinaryOperator::BitXor,
            "&" => BinaryOperator::BitAnd,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            "<" => BinaryOperator::LessThan,
            ">" => BinaryOperator::GreaterThan,
            "<=" => BinaryOperator::LessThanOrEqual,
            ">=" => BinaryOperator::GreaterThanOrEqual,
            "+" => BinaryOperator::Addition,
            "-" => BinaryOperator::Subtraction,
            "*" => BinaryOperator::Multiplication,
            "/" => BinaryOperator::Division,
            "%" => BinaryOperator::Modulo,
            _ => return None,
        };
        Some(op)
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::BitOr => 3,
            BinaryOperator::BitXor => 4,
            BinaryOperator::BitAnd => 5,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 6,
            BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThanOrEqual => 7,
            BinaryOperator::Addition | BinaryOperator::Subtraction => 8,
            BinaryOperator::Multiplication | BinaryOperator::Division | BinaryOperator::Modulo => 9,
        }
    }

    /// True for operators producing a boolean.
    pub fn is_comparison(self) -> bool {
        self.precedence() <= 2 || matches!(self.precedence(), 6 | 7)
    }
}

impl Unchanged for BinaryOperator {
    fn unchanged(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub left: Expression,
    /// Padded by the space before the operator.
    pub operator: LeftPadded<BinaryOperator>,
    pub right: Expression,
    pub ty: Option<Type>,
}

with_methods!(Binary {
    prefix: Space,
    markers: Markers,
    left: Expression,
    operator: LeftPadded<BinaryOperator>,
    right: Expression,
    ty: Option<Type>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negative,
    Positive,
    Complement,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negative => "-",
            UnaryOperator::Positive => "+",
            UnaryOperator::Complement => "~",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<UnaryOperator> {
        match symbol {
            "!" => Some(UnaryOperator::Not),
            "-" => Some(UnaryOperator::Negative),
            "+" => Some(UnaryOperator::Positive),
            "~" => Some(UnaryOperator::Complement),
            _ => None,
        }
    }
}

impl Unchanged for UnaryOperator {
    fn unchanged(&self, other: &Self) -> bool {
        self == other
    }
}

/// A prefix operator applied to an expression.
#[derive(Debug, Clone)]
pub struct Unary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub operator: UnaryOperator,
    pub expression: Expression,
    pub ty: Option<Type>,
}

with_methods!(Unary {
    prefix: Space,
    markers: Markers,
    operator: UnaryOperator,
    expression: Expression,
    ty: Option<Type>,
});

/// `( tree )`; also the condition of `if` and `while`.
#[derive(Debug, Clone)]
pub struct Parentheses {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Padded by the space before `)`.
    pub tree: Padded<Expression>,
}

with_methods!(Parentheses {
    prefix: Space,
    markers: Markers,
    tree: Padded<Expression>,
});

/// `[]` after a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    /// Space before `[`.
    pub before: Space,
    /// Space before `]`.
    pub inner: Space,
}

impl Unchanged for Dimension {
    fn unchanged(&self, other: &Self) -> bool {
        self == other
    }
}

/// A type reference: `int`, `a.b.C`, `List<String>`, `String[]`, `?`.
#[derive(Debug, Clone)]
pub struct TypeName {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Identifier or field access chain.
    pub name: Expression,
    pub type_arguments: Option<Container<Arc<TypeName>>>,
    pub dimensions: Vec<Dimension>,
    pub ty: Option<Type>,
}

with_methods!(TypeName {
    prefix: Space,
    markers: Markers,
    name: Expression,
    type_arguments: Option<Container<Arc<TypeName>>>,
    dimensions: Vec<Dimension>,
    ty: Option<Type>,
});

impl TypeName {
    /// A detached simple type name with no prefix.
    pub fn build(name: &str, ty: Option<Type>) -> Arc<TypeName> {
        Arc::new(TypeName {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::new(),
            name: Expression::Identifier(Identifier::build(name, ty.clone())),
            type_arguments: None,
            dimensions: Vec::new(),
            ty,
        })
    }

    /// The name as written, without type arguments or dimensions.
    pub fn base_name(&self) -> String {
        self.name.qualified_name().unwrap_or_default()
    }
}

impl_tree!(
    CompilationUnit,
    Package,
    Import,
    ClassDeclaration,
    Annotation,
    Modifier,
    TypeParameter,
    MethodDeclaration,
    VariableDeclarations,
    NamedVariable,
    Block,
    Return,
    If,
    Else,
    WhileLoop,
    Throw,
    Identifier,
    FieldAccess,
    Literal,
    MethodInvocation,
    Assignment,
    NewClass,
    NewArray,
    Binary,
    Unary,
    Parentheses,
    TypeName,
);

// ============================================================================
// Node sum
// ============================================================================

fn push_container<T: Clone + Into<J>>(out: &mut Vec<J>, container: &Option<Container<T>>) {
    if let Some(container) = container {
        out.extend(container.iter().cloned().map(Into::into));
    }
}

impl From<Arc<TypeName>> for J {
    fn from(node: Arc<TypeName>) -> J {
        J::TypeName(node)
    }
}

impl From<Arc<TypeParameter>> for J {
    fn from(node: Arc<TypeParameter>) -> J {
        J::TypeParameter(node)
    }
}

impl From<Arc<VariableDeclarations>> for J {
    fn from(node: Arc<VariableDeclarations>) -> J {
        J::VariableDeclarations(node)
    }
}

impl From<Arc<Annotation>> for J {
    fn from(node: Arc<Annotation>) -> J {
        J::Annotation(node)
    }
}

impl J {
    pub fn as_class_declaration(&self) -> Option<&Arc<ClassDeclaration>> {
        match self {
            J::ClassDeclaration(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_method_declaration(&self) -> Option<&Arc<MethodDeclaration>> {
        match self {
            J::MethodDeclaration(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_compilation_unit(&self) -> Option<&Arc<CompilationUnit>> {
        match self {
            J::CompilationUnit(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Arc<Block>> {
        match self {
            J::Block(n) => Some(n),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &Space {
        match self {
            J::CompilationUnit(n) => &n.prefix,
            J::Package(n) => &n.prefix,
            J::Import(n) => &n.prefix,
            J::ClassDeclaration(n) => &n.prefix,
            J::Annotation(n) => &n.prefix,
            J::Modifier(n) => &n.prefix,
            J::TypeParameter(n) => &n.prefix,
            J::MethodDeclaration(n) => &n.prefix,
            J::VariableDeclarations(n) => &n.prefix,
            J::NamedVariable(n) => &n.prefix,
            J::Block(n) => &n.prefix,
            J::Return(n) => &n.prefix,
            J::If(n) => &n.prefix,
            J::Else(n) => &n.prefix,
            J::WhileLoop(n) => &n.prefix,
            J::Throw(n) => &n.prefix,
            J::Identifier(n) => &n.prefix,
            J::FieldAccess(n) => &n.prefix,
            J::Literal(n) => &n.prefix,
            J::MethodInvocation(n) => &n.prefix,
            J::Assignment(n) => &n.prefix,
            J::NewClass(n) => &n.prefix,
            J::NewArray(n) => &n.prefix,
            J::Binary(n) => &n.prefix,
            J::Unary(n) => &n.prefix,
            J::Parentheses(n) => &n.prefix,
            J::TypeName(n) => &n.prefix,
        }
    }
}

impl TreeNode for J {
    fn id(&self) -> NodeId {
        match self {
            J::CompilationUnit(n) => n.id,
            J::Package(n) => n.id,
            J::Import(n) => n.id,
            J::ClassDeclaration(n) => n.id,
            J::Annotation(n) => n.id,
            J::Modifier(n) => n.id,
            J::TypeParameter(n) => n.id,
            J::MethodDeclaration(n) => n.id,
            J::VariableDeclarations(n) => n.id,
            J::NamedVariable(n) => n.id,
            J::Block(n) => n.id,
            J::Return(n) => n.id,
            J::If(n) => n.id,
            J::Else(n) => n.id,
            J::WhileLoop(n) => n.id,
            J::Throw(n) => n.id,
            J::Identifier(n) => n.id,
            J::FieldAccess(n) => n.id,
            J::Literal(n) => n.id,
            J::MethodInvocation(n) => n.id,
            J::Assignment(n) => n.id,
            J::NewClass(n) => n.id,
            J::NewArray(n) => n.id,
            J::Binary(n) => n.id,
            J::Unary(n) => n.id,
            J::Parentheses(n) => n.id,
            J::TypeName(n) => n.id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            J::CompilationUnit(_) => "CompilationUnit",
            J::Package(_) => "Package",
            J::Import(_) => "Import",
            J::ClassDeclaration(_) => "ClassDeclaration",
            J::Annotation(_) => "Annotation",
            J::Modifier(_) => "Modifier",
            J::TypeParameter(_) => "TypeParameter",
            J::MethodDeclaration(_) => "MethodDeclaration",
            J::VariableDeclarations(_) => "VariableDeclarations",
            J::NamedVariable(_) => "NamedVariable",
            J::Block(_) => "Block",
            J::Return(_) => "Return",
            J::If(_) => "If",
            J::Else(_) => "Else",
            J::WhileLoop(_) => "WhileLoop",
            J::Throw(_) => "Throw",
            J::Identifier(_) => "Identifier",
            J::FieldAccess(_) => "FieldAccess",
            J::Literal(_) => "Literal",
            J::MethodInvocation(_) => "MethodInvocation",
            J::Assignment(_) => "Assignment",
            J::NewClass(_) => "NewClass",
            J::NewArray(_) => "NewArray",
            J::Binary(_) => "Binary",
            J::Unary(_) => "Unary",
            J::Parentheses(_) => "Parentheses",
            J::TypeName(_) => "TypeName",
        }
    }

    fn children(&self) -> Vec<Self> {
        let mut out = Vec::new();
        match self {
            J::CompilationUnit(n) => {
                if let Some(package) = &n.package {
                    out.push(J::Package(Arc::clone(&package.element)));
                }
                out.extend(n.imports().cloned().map(J::Import));
                out.extend(n.classes.iter().cloned().map(J::ClassDeclaration));
            }
            J::Package(n) => out.push(n.name.clone().into()),
            J::Import(n) => out.push(n.qualid.clone().into()),
            J::ClassDeclaration(n) => {
                out.extend(n.decorations.iter().cloned().map(J::from));
                out.push(J::Identifier(Arc::clone(&n.name)));
                push_container(&mut out, &n.type_parameters);
                push_container(&mut out, &n.extends);
                push_container(&mut out, &n.implements);
                out.push(J::Block(Arc::clone(&n.body)));
            }
            J::Annotation(n) => {
                out.push(n.annotation_type.clone().into());
                push_container(&mut out, &n.arguments);
            }
            J::Modifier(_) | J::Identifier(_) | J::Literal(_) => {}
            J::TypeParameter(n) => {
                out.extend(n.annotations.iter().cloned().map(J::Annotation));
                out.push(J::Identifier(Arc::clone(&n.name)));
                push_container(&mut out, &n.bounds);
            }
            J::MethodDeclaration(n) => {
                out.extend(n.decorations.iter().cloned().map(J::from));
                push_container(&mut out, &n.type_parameters);
                out.extend(n.type_annotations.iter().cloned().map(J::Annotation));
                if let Some(return_type) = &n.return_type {
                    out.push(J::TypeName(Arc::clone(return_type)));
                }
                out.push(J::Identifier(Arc::clone(&n.name)));
                out.extend(n.params.iter().cloned().map(J::VariableDeclarations));
                push_container(&mut out, &n.throws);
                if let Some(default_value) = &n.default_value {
                    out.push(default_value.element.clone().into());
                }
                if let Some(body) = &n.body {
                    out.push(J::Block(Arc::clone(body)));
                }
            }
            J::VariableDeclarations(n) => {
                out.extend(n.decorations.iter().cloned().map(J::from));
                out.push(J::TypeName(Arc::clone(&n.type_expr)));
                out.extend(n.variables().cloned().map(J::NamedVariable));
            }
            J::NamedVariable(n) => {
                out.push(J::Identifier(Arc::clone(&n.name)));
                if let Some(initializer) = &n.initializer {
                    out.push(initializer.element.clone().into());
                }
            }
            J::Block(n) => out.extend(n.statements().cloned().map(J::from)),
            J::Return(n) => out.extend(n.expression.clone().map(J::from)),
            J::If(n) => {
                out.push(J::Parentheses(Arc::clone(&n.condition)));
                out.push(n.then_part.element.clone().into());
                out.extend(n.else_part.clone().map(J::Else));
            }
            J::Else(n) => out.push(n.body.element.clone().into()),
            J::WhileLoop(n) => {
                out.push(J::Parentheses(Arc::clone(&n.condition)));
                out.push(n.body.element.clone().into());
            }
            J::Throw(n) => out.push(n.exception.clone().into()),
            J::FieldAccess(n) => {
                out.push(n.target.clone().into());
                out.push(J::Identifier(Arc::clone(&n.name.element)));
            }
            J::MethodInvocation(n) => {
                out.extend(n.select().cloned().map(J::from));
                out.push(J::Identifier(Arc::clone(&n.name)));
                out.extend(n.args.iter().cloned().map(J::from));
            }
            J::Assignment(n) => {
                out.push(n.variable.clone().into());
                out.push(n.assignment.element.clone().into());
            }
            J::NewClass(n) => {
                out.push(J::TypeName(Arc::clone(&n.clazz)));
                out.extend(n.args.iter().cloned().map(J::from));
            }
            J::NewArray(n) => out.extend(n.initializer.iter().cloned().map(J::from)),
            J::Binary(n) => {
                out.push(n.left.clone().into());
                out.push(n.right.clone().into());
            }
            J::Unary(n) => out.push(n.expression.clone().into()),
            J::Parentheses(n) => out.push(n.tree.element.clone().into()),
            J::TypeName(n) => {
                out.push(n.name.clone().into());
                push_container(&mut out, &n.type_arguments);
            }
        }
        out
    }
}

impl SourceFile for CompilationUnit {
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
        "java"
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
