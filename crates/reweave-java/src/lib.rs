// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Java support for reweave.
//!
//! Covers the subset of Java that setter and builder code is written in:
//! packages, imports, classes, interfaces and annotation types with fields,
//! constructors and methods, and the common statements and expressions.
//!
//! - [`parser`]: lossless parser; [`JavaParser`] attributes types across
//!   every unit parsed together
//! - [`attribution`]: declared types, expression types and method types
//! - [`tree`]: node types and the [`J`] node sum
//! - [`visitor`]: rewriting and accumulating visitors
//! - [`template`]: statements and expressions from text, spliced in scope
//! - [`format`]: indentation of spliced regions
//! - [`recipes`]: `ChangeNonFluentSetterToFluentSetter`

pub mod attribution;
pub mod format;
mod lexer;
pub mod parser;
pub mod print;
pub mod recipes;
pub mod template;
pub mod tree;
pub mod visitor;

pub use attribution::{JavaSourceSet, SnippetScope, TypeTable};
pub use format::auto_format;
pub use parser::{parse_expression, parse_statements, parse_syntax, JavaParser};
pub use recipes::ChangeNonFluentSetterToFluentSetter;
pub use template::{JavaFragment, JavaTemplateLanguage};
pub use tree::{
    Block, ClassDeclaration, CompilationUnit, Expression, MethodDeclaration, MethodInvocation, Statement, J,
};
pub use visitor::{JavaSourceVisitor, JavaTreeVisitor, JavaVisitor};
