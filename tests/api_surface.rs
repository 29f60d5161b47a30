// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Compile-only test of the public API surface.
//!
//! If this file fails to compile, the public API has regressed.

#![allow(unused_imports)]

// ============================================================================
// Engine
// ============================================================================

use reweave_core::context::{CancellationFlag, Diagnostic, DiagnosticKind, ExecutionContext, Severity};
use reweave_core::cursor::Cursor;
use reweave_core::error::{AncestorNotFound, ConstructionError, ParseError, PipelineError, TemplateError};
use reweave_core::marker::{Checksum, ContentHash, Marker, Markers, SearchResult, SourcePosition};
use reweave_core::pipeline::{Pipeline, RunResult, SourceResult};
use reweave_core::print::{Codegen, CodegenState};
use reweave_core::recipe::{CompositeRecipe, Recipe, RecipeDescriptor, RecipeEntry, RecipeOptions, RecipeRegistry};
use reweave_core::style::{Styles, TabsAndIndentsStyle};
use reweave_core::template::{Coordinate, InsertionPoint, Template, TemplateEngine, TemplateLanguage};
use reweave_core::tree::{
    Comment, CommentStyle, Container, LeftPadded, NodeId, Padded, SourceFile, SourceRef, Space, Tree, TreeNode,
    Unchanged,
};
use reweave_core::typing::{is_assignable_to, is_of_class_type, Flag, MatchMode, Primitive, Type};
use reweave_core::visitor::{Fold, TreeVisitor};

// ============================================================================
// Grammars
// ============================================================================

use reweave_java::{
    auto_format, parse_expression, parse_statements, parse_syntax, ChangeNonFluentSetterToFluentSetter,
    CompilationUnit, JavaFragment, JavaParser, JavaSourceSet, JavaSourceVisitor, JavaTemplateLanguage,
    JavaTreeVisitor, JavaVisitor, SnippetScope, TypeTable, J,
};
use reweave_properties::{
    parse as parse_properties, AddProperty, ChangePropertyKey, ChangePropertyValue, PropertiesTemplateLanguage,
    PropertiesVisitor,
};
use reweave_xml::{parse as parse_xml, parse_pom, ChangeParentVersion, ChangeTagValue, Pom, TagPathMatcher, XmlVisitor};

// ============================================================================
// Front door
// ============================================================================

use reweave::cli::{discover, parse_sources, render_recipes_text, render_run_text, run, RunRequest, SourceKind};
use reweave::config::{CompositeConfig, RecipeStep, ReweaveConfig, CONFIG_FILE_NAME};
use reweave::diff::unified_diff;
use reweave::error::{OutputErrorCode, ReweaveError};
use reweave::output::{
    emit_response, ErrorInfo, ErrorResponse, FileChange, RecipeInfo, RecipesResponse, RunResponse, Summary,
    SCHEMA_VERSION,
};
use reweave::registry::registry;

#[test]
fn api_surface_compiles() {}
