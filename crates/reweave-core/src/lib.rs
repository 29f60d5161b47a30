// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Core infrastructure for reweave.
//!
//! This crate provides the grammar-independent parts of the transformation
//! engine:
//!
//! - **Markers**: extensible, deduplicating metadata attached to nodes
//! - **Tree**: node identity, whitespace, persistent `with_*` updates
//! - **Cursor**: upward-navigable traversal position with scoped messages
//! - **Visitors**: accumulating folds and the erased rewriting interface
//! - **Types**: declared-type model with strict and relaxed matching
//! - **Templates**: snippet rendering, parsing in scope, splicing
//! - **Recipes and pipelines**: validated configurations run in order
//!
//! Grammar crates (`reweave-java`, `reweave-properties`, `reweave-xml`)
//! supply node types, parsers, printers and recipes on top of these.

pub mod context;
pub mod cursor;
pub mod error;
pub mod marker;
pub mod pipeline;
pub mod print;
pub mod recipe;
pub mod style;
pub mod template;
pub mod text;
pub mod tree;
pub mod typing;
pub mod visitor;

#[doc(hidden)]
pub use paste;

pub use context::{CancellationFlag, Diagnostic, DiagnosticKind, ExecutionContext, Severity};
pub use cursor::Cursor;
pub use error::{AncestorNotFound, ConstructionError, ParseError, PipelineError, TemplateError};
pub use marker::{Checksum, ContentHash, Marker, Markers, SearchResult, SourcePosition};
pub use pipeline::{Pipeline, RunResult, SourceResult};
pub use print::{Codegen, CodegenState};
pub use recipe::{CompositeRecipe, Recipe, RecipeDescriptor, RecipeEntry, RecipeOptions, RecipeRegistry};
pub use style::{Styles, TabsAndIndentsStyle};
pub use template::{Coordinate, InsertionPoint, Template, TemplateEngine, TemplateLanguage};
pub use tree::{
    Comment, CommentStyle, Container, LeftPadded, NodeId, Padded, SourceFile, SourceRef, Space,
    Tree, TreeNode, Unchanged,
};
pub use typing::{Flag, MatchMode, Primitive, Type};
pub use visitor::{Fold, TreeVisitor};
