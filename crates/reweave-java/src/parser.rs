// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive descent parser for the supported Java subset.
//!
//! [`JavaParser`] is the entry point: it parses a batch of compilation
//! units, builds a type table from them (and from any `depends_on`
//! sources), and attributes every unit against it.
//!
//! The syntax layer follows one rule for whitespace: a node takes the
//! prefix of its first token and leaves that token's prefix empty. Nested
//! nodes starting at the same token therefore get an empty prefix, and when
//! a node turns out to start with an already-parsed child (`a.b`, `a = b`,
//! `a + b`) the child's prefix is lifted onto the new outer node.
//!
//! Not supported: enums, records, lambdas, switch, for loops, casts, the
//! ternary operator, array creation with `new`, and anonymous classes.

use std::path::PathBuf;
use std::sync::Arc;

use reweave_core::marker::{Checksum, Markers};
use reweave_core::text::LineIndex;
use reweave_core::tree::{Container, LeftPadded, NodeId, Padded, Space};
use reweave_core::typing::{Primitive, Type};
use reweave_core::ParseError;
use thiserror::Error;
use tracing::debug;

use crate::attribution::{attribute, TypeTable};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::tree::{
    Annotation, Assignment, Binary, BinaryOperator, Block, ClassDeclaration, ClassKind, CompilationUnit, Decoration,
    Dimension, Else, Expression, FieldAccess, Identifier, If, Import, Literal, MethodDeclaration, MethodInvocation,
    Modifier, NamedVariable, NewArray, NewClass, Package, Parentheses, Return, Statement, Throw, TypeName,
    TypeParameter, Unary, UnaryOperator, VariableDeclarations, WhileLoop,
};

// ============================================================================
// Entry point
// ============================================================================

/// Parses and attributes Java sources.
///
/// ```ignore
/// let units = JavaParser::new()
///     .depends_on(["package a; public class B { public void setX(int x) {} }"])
///     .parse_all(vec![(PathBuf::from("A.java"), source)])?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct JavaParser {
    dependencies: Vec<String>,
}

impl JavaParser {
    pub fn new() -> Self {
        JavaParser::default()
    }

    /// Sources whose declarations are visible for type attribution but
    /// which are not returned.
    pub fn depends_on<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(sources.into_iter().map(Into::into));
        self
    }

    /// Parse one compilation unit.
    pub fn parse(&self, path: impl Into<PathBuf>, source: &str) -> Result<Arc<CompilationUnit>, ParseError> {
        let path = path.into();
        let display = path.display().to_string();
        self.parse_all(vec![(path, source.to_string())])?
            .pop()
            .ok_or_else(|| ParseError {
                path: display,
                line: 1,
                column: 1,
                message: "no compilation unit".to_string(),
            })
    }

    /// Parse compilation units that can see each other's declarations.
    pub fn parse_all(&self, sources: Vec<(PathBuf, String)>) -> Result<Vec<Arc<CompilationUnit>>, ParseError> {
        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for (i, source) in self.dependencies.iter().enumerate() {
            let path = PathBuf::from(format!("<dependency {}>", i + 1));
            dependencies.push(parse_syntax(path, source)?);
        }
        let mut units = Vec::with_capacity(sources.len());
        for (path, source) in &sources {
            units.push(parse_syntax(path.clone(), source)?);
        }

        let table = Arc::new(TypeTable::build(dependencies.iter().chain(units.iter())));
        debug!(
            units = units.len(),
            dependencies = dependencies.len(),
            classes = table.len(),
            "attributing java sources"
        );
        Ok(units.into_iter().map(|unit| attribute(unit, &table)).collect())
    }
}

/// Parse a compilation unit without type attribution.
pub fn parse_syntax(path: impl Into<PathBuf>, source: &str) -> Result<Arc<CompilationUnit>, ParseError> {
    let path = path.into();
    let index = LineIndex::new(source);
    let to_parse_error = |offset: usize, message: String| {
        let (line, column) = index.position(offset);
        ParseError {
            path: path.display().to_string(),
            line,
            column,
            message,
        }
    };
    let tokens = tokenize(source).map_err(|e| to_parse_error(e.offset, e.message))?;
    let mut parser = Parser::new(tokens, Some(&index), false);
    let unit = parser
        .compilation_unit(path.clone())
        .map_err(|e| to_parse_error(e.offset, e.message))?;
    Ok(Arc::new(CompilationUnit {
        markers: Markers::of(Checksum::of(source)),
        ..unit
    }))
}

/// Parse statements of a snippet, detached from any file.
///
/// The `;` after the last statement is optional. Nodes get no position
/// markers and no type attribution.
pub fn parse_statements(snippet: &str) -> Result<Vec<Padded<Statement>>, String> {
    let tokens = tokenize(snippet).map_err(|e| snippet_error(snippet, e.offset, &e.message))?;
    let mut parser = Parser::new(tokens, None, true);
    parser
        .snippet_statements()
        .map_err(|e| snippet_error(snippet, e.offset, &e.message))
}

/// Parse a single expression of a snippet.
pub fn parse_expression(snippet: &str) -> Result<Expression, String> {
    let tokens = tokenize(snippet).map_err(|e| snippet_error(snippet, e.offset, &e.message))?;
    let mut parser = Parser::new(tokens, None, true);
    let expression = parser
        .expression()
        .map_err(|e| snippet_error(snippet, e.offset, &e.message))?;
    if !parser.at_eof() {
        let offset = parser.peek().offset;
        return Err(snippet_error(snippet, offset, "expected end of expression"));
    }
    Ok(expression)
}

fn snippet_error(snippet: &str, offset: usize, message: &str) -> String {
    let (line, column) = LineIndex::new(snippet).position(offset);
    format!("{}:{}: {}", line, column, message)
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
struct SyntaxError {
    offset: usize,
    message: String,
}

type SyntaxResult<T> = Result<T, SyntaxError>;

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "default",
];

/// Words that start an expression rather than a declaration.
const EXPRESSION_WORDS: &[&str] = &["this", "super", "new", "true", "false", "null"];

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    index: Option<&'a LineIndex>,
    /// Snippets may leave off the last `;`.
    snippet: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, index: Option<&'a LineIndex>, snippet: bool) -> Self {
        Parser {
            tokens,
            pos: 0,
            index,
            snippet,
        }
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    /// The current token. The token list always ends with `Eof`, which is
    /// never consumed.
    fn peek(&self) -> &Token {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    fn nth_is(&self, n: usize, text: &str) -> bool {
        let token = self.nth(n);
        matches!(token.kind, TokenKind::Word | TokenKind::Symbol) && token.text == text
    }

    fn at(&self, text: &str) -> bool {
        self.nth_is(0, text)
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_word(&self) -> bool {
        self.peek().kind == TokenKind::Word
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Take the current token's prefix, leaving it empty.
    fn take_prefix(&mut self) -> Space {
        let pos = self.pos.min(self.tokens.len().saturating_sub(1));
        std::mem::take(&mut self.tokens[pos].prefix)
    }

    /// Start a node at the current token.
    fn open(&mut self) -> (Space, Markers) {
        let markers = self.markers_at(self.peek().offset);
        (self.take_prefix(), markers)
    }

    fn markers_at(&self, offset: usize) -> Markers {
        match self.index {
            Some(index) => Markers::of(index.source_position(offset)),
            None => Markers::new(),
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> SyntaxResult<T> {
        Err(SyntaxError {
            offset: self.peek().offset,
            message: message.into(),
        })
    }

    fn expected<T>(&self, what: &str) -> SyntaxResult<T> {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", token.text)
        };
        self.error(format!("expected {}, found {}", what, found))
    }

    /// Consume `text`, returning the space before it.
    fn expect(&mut self, text: &str) -> SyntaxResult<Space> {
        if self.at(text) {
            Ok(self.bump().prefix)
        } else {
            self.expected(&format!("'{}'", text))
        }
    }

    fn identifier(&mut self) -> SyntaxResult<Arc<Identifier>> {
        if !self.at_word() {
            return self.expected("an identifier");
        }
        let (prefix, markers) = self.open();
        let token = self.bump();
        Ok(Arc::new(Identifier {
            id: NodeId::random(),
            prefix,
            markers,
            name: token.text,
            ty: None,
        }))
    }

    /// `open a , b close`
    fn container<T>(
        &mut self,
        open: &str,
        close: &str,
        mut element: impl FnMut(&mut Self) -> SyntaxResult<T>,
    ) -> SyntaxResult<Container<T>> {
        let before = self.expect(open)?;
        if self.at(close) {
            let end = self.bump().prefix;
            return Ok(Container {
                before,
                elements: Vec::new(),
                end,
            });
        }
        let mut elements = Vec::new();
        loop {
            let value = element(self)?;
            if self.at(",") {
                let after = self.bump().prefix;
                elements.push(Padded::new(value, after));
            } else {
                let after = self.expect(close)?;
                elements.push(Padded::new(value, after));
                return Ok(Container {
                    before,
                    elements,
                    end: Space::EMPTY,
                });
            }
        }
    }

    /// `keyword A sep B`, for `extends`, `implements`, `throws` and bounds.
    fn keyword_list(&mut self, keyword: &str, separator: &str) -> SyntaxResult<Container<Arc<TypeName>>> {
        let before = self.expect(keyword)?;
        let mut elements = Vec::new();
        loop {
            let type_name = self.type_name()?;
            if self.at(separator) {
                let after = self.bump().prefix;
                elements.push(Padded::new(type_name, after));
            } else {
                elements.push(Padded::build(type_name));
                return Ok(Container {
                    before,
                    elements,
                    end: Space::EMPTY,
                });
            }
        }
    }

    /// `a.b.c`, with a trailing `.*` when `allow_star`.
    fn qualified_name(&mut self, allow_star: bool) -> SyntaxResult<Expression> {
        let mut name = Expression::Identifier(self.identifier()?);
        while self.at(".") {
            let before = self.bump().prefix;
            let part = if allow_star && self.at("*") {
                let (prefix, markers) = self.open();
                self.bump();
                Arc::new(Identifier {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    name: "*".to_string(),
                    ty: None,
                })
            } else {
                self.identifier()?
            };
            let markers = name.markers().clone();
            let (prefix, target) = lift(name);
            name = Expression::FieldAccess(Arc::new(FieldAccess {
                id: NodeId::random(),
                prefix,
                markers,
                target,
                name: LeftPadded::new(before, part),
                ty: None,
            }));
        }
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Compilation unit and declarations
    // ------------------------------------------------------------------

    fn compilation_unit(&mut self, source_path: PathBuf) -> SyntaxResult<CompilationUnit> {
        let prefix = self.take_prefix();

        let package = if self.at("package") {
            let (prefix, markers) = self.open();
            self.bump();
            let name = self.qualified_name(false)?;
            let after = self.expect(";")?;
            Some(Padded::new(
                Arc::new(Package {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    name,
                }),
                after,
            ))
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.at("import") {
            let (prefix, markers) = self.open();
            self.bump();
            let statik = if self.at("static") { Some(self.bump().prefix) } else { None };
            let qualid = self.qualified_name(true)?;
            let after = self.expect(";")?;
            imports.push(Padded::new(
                Arc::new(Import {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    statik,
                    qualid,
                }),
                after,
            ));
        }

        let mut classes = Vec::new();
        while !self.at_eof() {
            let (prefix, markers) = self.open();
            let decorations = self.decorations()?;
            classes.push(self.class_declaration(prefix, markers, decorations)?);
        }

        Ok(CompilationUnit {
            id: NodeId::random(),
            prefix,
            markers: Markers::new(),
            source_path,
            package,
            imports,
            classes,
            eof: self.take_prefix(),
        })
    }

    /// Annotations and modifiers in source order.
    fn decorations(&mut self) -> SyntaxResult<Vec<Decoration>> {
        let mut decorations = Vec::new();
        loop {
            if self.at("@") && !self.nth_is(1, "interface") {
                decorations.push(Decoration::Annotation(self.annotation()?));
            } else if self.at_word() && MODIFIERS.contains(&self.peek().text.as_str()) {
                let (prefix, markers) = self.open();
                let token = self.bump();
                decorations.push(Decoration::Modifier(Arc::new(Modifier {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    keyword: token.text,
                })));
            } else {
                return Ok(decorations);
            }
        }
    }

    fn annotation(&mut self) -> SyntaxResult<Arc<Annotation>> {
        let (prefix, markers) = self.open();
        self.expect("@")?;
        let annotation_type = self.qualified_name(false)?;
        let arguments = if self.at("(") {
            Some(self.container("(", ")", Self::expression)?)
        } else {
            None
        };
        Ok(Arc::new(Annotation {
            id: NodeId::random(),
            prefix,
            markers,
            annotation_type,
            arguments,
        }))
    }

    fn class_declaration(
        &mut self,
        prefix: Space,
        markers: Markers,
        decorations: Vec<Decoration>,
    ) -> SyntaxResult<Arc<ClassDeclaration>> {
        let (kind_prefix, kind) = if self.at("@") && self.nth_is(1, "interface") {
            let kind_prefix = self.bump().prefix;
            if !self.peek().prefix.is_empty() {
                return self.error("unexpected space in '@interface'");
            }
            self.bump();
            (kind_prefix, ClassKind::Annotation)
        } else if self.at("class") {
            (self.bump().prefix, ClassKind::Class)
        } else if self.at("interface") {
            (self.bump().prefix, ClassKind::Interface)
        } else if self.at("enum") || self.at("record") {
            return self.error(format!("{} declarations are not supported", self.peek().text));
        } else {
            return self.expected("a class declaration");
        };

        let name = self.identifier()?;
        let type_parameters = if self.at("<") {
            Some(self.container("<", ">", Self::type_parameter)?)
        } else {
            None
        };
        let extends = if self.at("extends") {
            Some(self.keyword_list("extends", ",")?)
        } else {
            None
        };
        let implements = if self.at("implements") {
            Some(self.keyword_list("implements", ",")?)
        } else {
            None
        };
        let body = self.class_body()?;

        Ok(Arc::new(ClassDeclaration {
            id: NodeId::random(),
            prefix,
            markers,
            decorations,
            kind_prefix,
            kind,
            name,
            type_parameters,
            extends,
            implements,
            body,
            ty: None,
        }))
    }

    fn type_parameter(&mut self) -> SyntaxResult<Arc<TypeParameter>> {
        let (prefix, markers) = self.open();
        let mut annotations = Vec::new();
        while self.at("@") {
            annotations.push(self.annotation()?);
        }
        let name = self.identifier()?;
        let bounds = if self.at("extends") {
            Some(self.keyword_list("extends", "&")?)
        } else {
            None
        };
        Ok(Arc::new(TypeParameter {
            id: NodeId::random(),
            prefix,
            markers,
            annotations,
            name,
            bounds,
        }))
    }

    fn class_body(&mut self) -> SyntaxResult<Arc<Block>> {
        let (prefix, markers) = self.open();
        self.expect("{")?;
        let mut statements = Vec::new();
        while !self.at("}") {
            if self.at_eof() {
                return self.expected("'}'");
            }
            let member = self.class_member()?;
            let after = if member.needs_semicolon() {
                self.expect(";")?
            } else {
                Space::EMPTY
            };
            statements.push(Padded::new(member, after));
        }
        let end = self.bump().prefix;
        Ok(Arc::new(Block {
            id: NodeId::random(),
            prefix,
            markers,
            statements,
            end,
        }))
    }

    fn class_member(&mut self) -> SyntaxResult<Statement> {
        if self.at("{") {
            return Ok(Statement::Block(self.block()?));
        }
        let (prefix, markers) = self.open();
        let decorations = self.decorations()?;
        if self.starts_class_declaration() {
            return Ok(Statement::ClassDeclaration(self.class_declaration(
                prefix,
                markers,
                decorations,
            )?));
        }

        let type_parameters = if self.at("<") {
            Some(self.container("<", ">", Self::type_parameter)?)
        } else {
            None
        };
        let mut type_annotations = Vec::new();
        while self.at("@") {
            type_annotations.push(self.annotation()?);
        }

        let return_type = if self.at_word() && self.nth_is(1, "(") {
            // A constructor.
            None
        } else {
            Some(self.type_name()?)
        };
        if self.at_word() && self.nth_is(1, "(") {
            let method = MethodDeclaration {
                id: NodeId::random(),
                prefix,
                markers,
                decorations,
                type_parameters,
                type_annotations,
                return_type,
                name: self.identifier()?,
                params: Container::empty(),
                throws: None,
                default_value: None,
                body: None,
                method_type: None,
            };
            return Ok(Statement::MethodDeclaration(self.method_rest(method)?));
        }
        if type_parameters.is_some() || !type_annotations.is_empty() {
            return self.expected("a method declaration");
        }
        let Some(type_expr) = return_type else {
            return self.expected("a member declaration");
        };
        Ok(Statement::VariableDeclarations(self.variables(
            prefix,
            markers,
            decorations,
            type_expr,
        )?))
    }

    fn starts_class_declaration(&self) -> bool {
        self.at("class")
            || self.at("interface")
            || self.at("enum")
            || self.at("record")
            || (self.at("@") && self.nth_is(1, "interface"))
    }

    /// Parameters, `throws`, `default` and body of a method whose name has
    /// been parsed.
    fn method_rest(&mut self, method: MethodDeclaration) -> SyntaxResult<Arc<MethodDeclaration>> {
        let params = self.container("(", ")", Self::parameter)?;
        let throws = if self.at("throws") {
            Some(self.keyword_list("throws", ",")?)
        } else {
            None
        };
        let default_value = if self.at("default") {
            let before = self.bump().prefix;
            Some(LeftPadded::new(before, self.expression()?))
        } else {
            None
        };
        let body = if self.at("{") { Some(self.block()?) } else { None };
        Ok(Arc::new(MethodDeclaration {
            params,
            throws,
            default_value,
            body,
            ..method
        }))
    }

    fn parameter(&mut self) -> SyntaxResult<Arc<VariableDeclarations>> {
        let (prefix, markers) = self.open();
        let decorations = self.decorations()?;
        let type_expr = self.type_name()?;
        let varargs = if self.at("...") { Some(self.bump().prefix) } else { None };
        let variable = self.named_variable(false)?;
        Ok(Arc::new(VariableDeclarations {
            id: NodeId::random(),
            prefix,
            markers,
            decorations,
            type_expr,
            varargs,
            variables: vec![Padded::build(variable)],
        }))
    }

    /// `a = 1, b` after the type of a field or local declaration.
    fn variables(
        &mut self,
        prefix: Space,
        markers: Markers,
        decorations: Vec<Decoration>,
        type_expr: Arc<TypeName>,
    ) -> SyntaxResult<Arc<VariableDeclarations>> {
        let mut variables = Vec::new();
        loop {
            let variable = self.named_variable(true)?;
            if self.at(",") {
                let after = self.bump().prefix;
                variables.push(Padded::new(variable, after));
            } else {
                variables.push(Padded::build(variable));
                break;
            }
        }
        Ok(Arc::new(VariableDeclarations {
            id: NodeId::random(),
            prefix,
            markers,
            decorations,
            type_expr,
            varargs: None,
            variables,
        }))
    }

    fn named_variable(&mut self, allow_initializer: bool) -> SyntaxResult<Arc<NamedVariable>> {
        let (prefix, markers) = self.open();
        let name = self.identifier()?;
        let initializer = if allow_initializer && self.at("=") {
            let before = self.bump().prefix;
            Some(LeftPadded::new(before, self.expression()?))
        } else {
            None
        };
        Ok(Arc::new(NamedVariable {
            id: NodeId::random(),
            prefix,
            markers,
            name,
            initializer,
            variable_type: None,
        }))
    }

    fn type_name(&mut self) -> SyntaxResult<Arc<TypeName>> {
        let (prefix, markers) = self.open();
        let name = if self.at("?") {
            let (prefix, markers) = self.open();
            self.bump();
            Expression::Identifier(Arc::new(Identifier {
                id: NodeId::random(),
                prefix,
                markers,
                name: "?".to_string(),
                ty: None,
            }))
        } else {
            self.qualified_name(false)?
        };
        let type_arguments = if self.at("<") {
            Some(self.container("<", ">", Self::type_name)?)
        } else {
            None
        };
        let mut dimensions = Vec::new();
        while self.at("[") && self.nth_is(1, "]") {
            let before = self.bump().prefix;
            let inner = self.bump().prefix;
            dimensions.push(Dimension { before, inner });
        }
        Ok(Arc::new(TypeName {
            id: NodeId::random(),
            prefix,
            markers,
            name,
            type_arguments,
            dimensions,
            ty: None,
        }))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> SyntaxResult<Arc<Block>> {
        let (prefix, markers) = self.open();
        self.expect("{")?;
        let mut statements = Vec::new();
        while !self.at("}") {
            if self.at_eof() {
                return self.expected("'}'");
            }
            statements.push(self.padded_statement()?);
        }
        let end = self.bump().prefix;
        Ok(Arc::new(Block {
            id: NodeId::random(),
            prefix,
            markers,
            statements,
            end,
        }))
    }

    /// A statement and the space before its `;`.
    fn padded_statement(&mut self) -> SyntaxResult<Padded<Statement>> {
        let statement = self.statement()?;
        let after = if !statement.needs_semicolon() || (self.snippet && self.at_eof()) {
            Space::EMPTY
        } else {
            self.expect(";")?
        };
        Ok(Padded::new(statement, after))
    }

    fn statement(&mut self) -> SyntaxResult<Statement> {
        if self.at("{") {
            return Ok(Statement::Block(self.block()?));
        }
        if self.at("return") {
            let (prefix, markers) = self.open();
            self.bump();
            let expression = if self.at(";") || (self.snippet && self.at_eof()) {
                None
            } else {
                Some(self.expression()?)
            };
            return Ok(Statement::Return(Arc::new(Return {
                id: NodeId::random(),
                prefix,
                markers,
                expression,
            })));
        }
        if self.at("if") {
            let (prefix, markers) = self.open();
            self.bump();
            let condition = self.parentheses()?;
            let then_part = self.padded_statement()?;
            let else_part = if self.at("else") {
                let (prefix, markers) = self.open();
                self.bump();
                Some(Arc::new(Else {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    body: self.padded_statement()?,
                }))
            } else {
                None
            };
            return Ok(Statement::If(Arc::new(If {
                id: NodeId::random(),
                prefix,
                markers,
                condition,
                then_part,
                else_part,
            })));
        }
        if self.at("while") {
            let (prefix, markers) = self.open();
            self.bump();
            let condition = self.parentheses()?;
            return Ok(Statement::WhileLoop(Arc::new(WhileLoop {
                id: NodeId::random(),
                prefix,
                markers,
                condition,
                body: self.padded_statement()?,
            })));
        }
        if self.at("throw") {
            let (prefix, markers) = self.open();
            self.bump();
            return Ok(Statement::Throw(Arc::new(Throw {
                id: NodeId::random(),
                prefix,
                markers,
                exception: self.expression()?,
            })));
        }
        if self.looks_like_declaration() {
            let (prefix, markers) = self.open();
            let decorations = self.decorations()?;
            if self.starts_class_declaration() {
                return Ok(Statement::ClassDeclaration(self.class_declaration(
                    prefix,
                    markers,
                    decorations,
                )?));
            }
            let type_expr = self.type_name()?;
            return Ok(Statement::VariableDeclarations(self.variables(
                prefix,
                markers,
                decorations,
                type_expr,
            )?));
        }

        let offset = self.peek().offset;
        let expression = self.expression()?;
        Statement::from_expression(expression).ok_or(SyntaxError {
            offset,
            message: "not a statement".to_string(),
        })
    }

    /// Statements up to the end of a snippet.
    fn snippet_statements(&mut self) -> SyntaxResult<Vec<Padded<Statement>>> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.padded_statement()?);
        }
        Ok(statements)
    }

    /// Token lookahead for `Type name =`, `Type name;` and friends.
    fn looks_like_declaration(&self) -> bool {
        if self.at("@") || self.at("final") || self.starts_class_declaration() {
            return true;
        }
        let token = self.peek();
        if token.kind != TokenKind::Word || EXPRESSION_WORDS.contains(&token.text.as_str()) {
            return false;
        }
        let mut i = 1;
        while self.nth_is(i, ".") && self.nth(i + 1).kind == TokenKind::Word {
            i += 2;
        }
        if self.nth_is(i, "<") {
            let mut depth = 0usize;
            loop {
                let token = self.nth(i);
                match (token.kind, token.text.as_str()) {
                    (TokenKind::Symbol, "<") => depth += 1,
                    (TokenKind::Symbol, ">") => {
                        depth -= 1;
                        if depth == 0 {
                            i += 1;
                            break;
                        }
                    }
                    (TokenKind::Word, _) | (TokenKind::Symbol, "," | "." | "?" | "[" | "]") => {}
                    _ => return false,
                }
                i += 1;
            }
        }
        while self.nth_is(i, "[") && self.nth_is(i + 1, "]") {
            i += 2;
        }
        let next = self.nth(i + 1);
        self.nth(i).kind == TokenKind::Word
            && (next.kind == TokenKind::Eof || matches!(next.text.as_str(), "=" | ";" | ","))
    }

    fn parentheses(&mut self) -> SyntaxResult<Arc<Parentheses>> {
        let (prefix, markers) = self.open();
        self.expect("(")?;
        let tree = self.expression()?;
        let after = self.expect(")")?;
        Ok(Arc::new(Parentheses {
            id: NodeId::random(),
            prefix,
            markers,
            tree: Padded::new(tree, after),
        }))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self) -> SyntaxResult<Expression> {
        let left = self.binary(1)?;
        if !self.at("=") {
            return Ok(left);
        }
        let markers = left.markers().clone();
        let (prefix, variable) = lift(left);
        let before = self.bump().prefix;
        let value = self.expression()?;
        Ok(Expression::Assignment(Arc::new(Assignment {
            id: NodeId::random(),
            prefix,
            markers,
            variable,
            assignment: LeftPadded::new(before, value),
            ty: None,
        })))
    }

    /// Precedence climbing over left-associative binary operators.
    fn binary(&mut self, min_precedence: u8) -> SyntaxResult<Expression> {
        let mut left = self.unary()?;
        loop {
            let token = self.peek();
            if token.kind != TokenKind::Symbol {
                break;
            }
            let Some(operator) = BinaryOperator::from_symbol(&token.text) else {
                break;
            };
            if operator.precedence() < min_precedence {
                break;
            }
            let before = self.bump().prefix;
            let right = self.binary(operator.precedence() + 1)?;
            let markers = left.markers().clone();
            let (prefix, operand) = lift(left);
            left = Expression::Binary(Arc::new(Binary {
                id: NodeId::random(),
                prefix,
                markers,
                left: operand,
                operator: LeftPadded::new(before, operator),
                right,
                ty: None,
            }));
        }
        Ok(left)
    }

    fn unary(&mut self) -> SyntaxResult<Expression> {
        let operator = match self.peek().kind {
            TokenKind::Symbol => UnaryOperator::from_symbol(&self.peek().text),
            _ => None,
        };
        if let Some(operator) = operator {
            let (prefix, markers) = self.open();
            self.bump();
            let expression = self.unary()?;
            return Ok(Expression::Unary(Arc::new(Unary {
                id: NodeId::random(),
                prefix,
                markers,
                operator,
                expression,
                ty: None,
            })));
        }
        let primary = self.primary()?;
        self.postfix(primary)
    }

    fn primary(&mut self) -> SyntaxResult<Expression> {
        let kind = self.peek().kind;
        let text = self.peek().text.clone();
        match (kind, text.as_str()) {
            (TokenKind::String | TokenKind::Char | TokenKind::Number, _) => self.literal(),
            (TokenKind::Word, "true" | "false" | "null") => self.literal(),
            (TokenKind::Word, "new") => self.new_class(),
            (TokenKind::Word, _) if self.nth_is(1, "(") => {
                let (prefix, markers) = self.open();
                let name = self.identifier()?;
                let args = self.container("(", ")", Self::expression)?;
                Ok(Expression::MethodInvocation(Arc::new(MethodInvocation {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    select: None,
                    name,
                    args,
                    method_type: None,
                })))
            }
            (TokenKind::Word, _) => Ok(Expression::Identifier(self.identifier()?)),
            (TokenKind::Symbol, "(") => Ok(Expression::Parentheses(self.parentheses()?)),
            (TokenKind::Symbol, "{") => {
                let (prefix, markers) = self.open();
                let initializer = self.container("{", "}", Self::expression)?;
                Ok(Expression::NewArray(Arc::new(NewArray {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    initializer,
                })))
            }
            _ => self.expected("an expression"),
        }
    }

    fn literal(&mut self) -> SyntaxResult<Expression> {
        let (prefix, markers) = self.open();
        let token = self.bump();
        let ty = literal_type(&token);
        Ok(Expression::Literal(Arc::new(Literal {
            id: NodeId::random(),
            prefix,
            markers,
            value_source: token.text,
            ty,
        })))
    }

    fn new_class(&mut self) -> SyntaxResult<Expression> {
        let (prefix, markers) = self.open();
        self.bump();
        let clazz = self.type_name()?;
        if self.at("[") {
            return self.error("array creation is not supported");
        }
        let args = self.container("(", ")", Self::expression)?;
        if self.at("{") {
            return self.error("anonymous classes are not supported");
        }
        Ok(Expression::NewClass(Arc::new(NewClass {
            id: NodeId::random(),
            prefix,
            markers,
            clazz,
            args,
            constructor_type: None,
        })))
    }

    /// `.name` and `.name(args)` suffixes.
    fn postfix(&mut self, mut expression: Expression) -> SyntaxResult<Expression> {
        while self.at(".") {
            let before = self.bump().prefix;
            let name = self.identifier()?;
            let markers = expression.markers().clone();
            let (prefix, target) = lift(expression);
            expression = if self.at("(") {
                let args = self.container("(", ")", Self::expression)?;
                Expression::MethodInvocation(Arc::new(MethodInvocation {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    select: Some(Padded::new(target, before)),
                    name,
                    args,
                    method_type: None,
                }))
            } else {
                Expression::FieldAccess(Arc::new(FieldAccess {
                    id: NodeId::random(),
                    prefix,
                    markers,
                    target,
                    name: LeftPadded::new(before, name),
                    ty: None,
                }))
            };
        }
        Ok(expression)
    }
}

/// Move an expression's prefix to the node about to wrap it.
fn lift(expression: Expression) -> (Space, Expression) {
    let prefix = expression.prefix().clone();
    (prefix, expression.with_prefix(Space::EMPTY))
}

fn literal_type(token: &Token) -> Option<Type> {
    let primitive = match token.kind {
        TokenKind::String => Primitive::String,
        TokenKind::Char => Primitive::Char,
        TokenKind::Word => match token.text.as_str() {
            "true" | "false" => Primitive::Boolean,
            "null" => Primitive::Null,
            _ => return None,
        },
        TokenKind::Number => {
            let text = token.text.to_ascii_lowercase();
            let hex = text.starts_with("0x");
            if text.ends_with('l') {
                Primitive::Long
            } else if !hex && text.ends_with('f') {
                Primitive::Float
            } else if !hex && (text.ends_with('d') || text.contains('.') || text.contains('e')) {
                Primitive::Double
            } else {
                Primitive::Int
            }
        }
        TokenKind::Symbol | TokenKind::Eof => return None,
    };
    Some(Type::Primitive(primitive))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reweave_core::print::Codegen;
    use reweave_core::SourcePosition;

    fn round_trip(source: &str) {
        let unit = parse_syntax("A.java", source).unwrap();
        assert_eq!(Codegen::print(unit.as_ref()), source);
    }

    #[test]
    fn round_trips_a_class() {
        round_trip(
            "package a.b;\n\nimport java.util.List;\nimport static java.lang.Math.*;\n\n/** Docs. */\npublic class A<T extends Comparable<T> & Cloneable> extends B implements C, D {\n    private final List<String> names = null;\n    int[] counts, more;\n\n    public A() { super(); }\n\n    public void setFoo(final String value) throws Exception {\n        // set it\n        this.foo = value ;\n        if (value == null || !ok()) {\n            throw new IllegalArgumentException(\"bad\");\n        } else return;\n        while (i < 10) i = i + 1;\n    }\n\n    abstract <R> R map(String... values);\n}\n",
        );
    }

    #[test]
    fn round_trips_annotations() {
        round_trip("@SuppressWarnings(\"ALL\")\npublic class A {}");
        round_trip("@SuppressWarnings(value = \"ALL\")\npublic class A {}");
        round_trip("@Deprecated ( )\npublic class A {}");
        round_trip(
            "import java.lang.annotation.Target;\nimport static java.lang.annotation.ElementType.*;\n\n@Target({ FIELD, PARAMETER })\npublic @interface Annotation {}",
        );
        round_trip("@Ho(Foo.class)\n@Hos( { Bar.class , Baz.class } )\npublic class A {}");
        round_trip("public class A {\n    public @Ho <T> @Ho T merryChristmas() { return null; }\n}");
        round_trip("public @interface Ho {\n    String value() default \"x\";\n}");
    }

    #[test]
    fn chained_calls_keep_line_breaks() {
        round_trip(
            "class A {\n    void m() {\n        a.setFoo(\"foo\")\n                .setBar(\"bar\");\n        A a = new A();\n        List<A> as = new ArrayList<>();\n    }\n}",
        );
    }

    #[test]
    fn prefixes_move_to_the_outermost_node() {
        let unit = parse_syntax("A.java", "class A { void m() {\n  a.b(c); } }").unwrap();
        let method = unit.classes[0].methods().next().unwrap();
        let body = method.body.as_ref().unwrap();
        let Statement::MethodInvocation(call) = &body.statements[0].element else {
            panic!("expected a call");
        };
        assert_eq!(call.prefix.whitespace, "\n  ");
        assert!(call.select().unwrap().prefix().is_empty());
    }

    #[test]
    fn nodes_carry_positions() {
        let unit = parse_syntax("A.java", "class A {\n    int x;\n}").unwrap();
        let field = unit.classes[0].fields().next().unwrap();
        let position = field.markers.find_first::<SourcePosition>().unwrap();
        assert_eq!((position.line, position.column), (2, 5));
        assert!(unit.markers.find_first::<Checksum>().is_some());
    }

    #[test]
    fn literals_are_typed() {
        let expression = parse_expression("f(1, 2L, 1.5, 1.5f, 'c', \"s\", true, null, 0xFF)").unwrap();
        let call = expression.as_method_invocation().unwrap();
        let types: Vec<String> = call.args.iter().map(|a| a.ty().unwrap().to_string()).collect();
        assert_eq!(
            types,
            vec!["int", "long", "double", "float", "char", "String", "boolean", "null", "int"]
        );
    }

    #[test]
    fn binary_operators_bind_by_precedence() {
        let expression = parse_expression("a + b * c == d").unwrap();
        let Expression::Binary(eq) = &expression else {
            panic!("expected a binary");
        };
        assert_eq!(eq.operator.element, BinaryOperator::Equal);
        let Expression::Binary(sum) = &eq.left else {
            panic!("expected a binary");
        };
        assert_eq!(sum.operator.element, BinaryOperator::Addition);
    }

    #[test]
    fn snippets_may_leave_off_the_last_semicolon() {
        let statements = parse_statements("a.setFoo(\"foo\")\n        .setBar(\"bar\")").unwrap();
        assert_eq!(statements.len(), 1);
        let mut out = String::new();
        for statement in &statements {
            out.push_str(&Codegen::print(&statement.element));
        }
        assert_eq!(out, "a.setFoo(\"foo\")\n        .setBar(\"bar\")");

        let statements = parse_statements("return this;").unwrap();
        assert!(matches!(statements[0].element, Statement::Return(_)));
    }

    #[test]
    fn local_declarations_are_told_apart_from_expressions() {
        let statements = parse_statements("A a = new A(); a.b = c; List<String> x; a.b();").unwrap();
        let kinds: Vec<&str> = statements.iter().map(|s| s.element.kind()).collect();
        assert_eq!(
            kinds,
            vec!["VariableDeclarations", "Assignment", "VariableDeclarations", "MethodInvocation"]
        );
    }

    #[test]
    fn syntax_errors_report_line_and_column() {
        let err = parse_syntax("A.java", "class A {\n    int x\n}").unwrap_err();
        assert_eq!((err.line, err.column), (3, 1));
        assert!(err.message.contains("expected ';'"), "{}", err.message);
    }

    #[test]
    fn unsupported_forms_are_errors() {
        assert!(parse_syntax("E.java", "enum E { A }").is_err());
        assert!(parse_syntax("A.java", "public @ interface A {}").is_err());
        assert!(parse_statements("1 + 2;").unwrap_err().contains("not a statement"));
    }
}
