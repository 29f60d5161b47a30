// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the transformation engine.
//!
//! Each subsystem has its own error enum:
//!
//! - [`ConstructionError`]: builders and recipe options rejected before any
//!   tree is touched
//! - [`TemplateError`]: a single template application failed; the caller
//!   keeps the original node
//! - [`AncestorNotFound`]: a visitor asked the cursor for an ancestor the tree
//!   does not have
//! - [`ParseError`]: a grammar parser rejected its input
//! - [`PipelineError`]: a run stopped early
//!
//! Only `ConstructionError` and `PipelineError` are fatal to a run. The others
//! are contained to the node being visited and reported through
//! [`ExecutionContext`](crate::context::ExecutionContext) diagnostics.

use thiserror::Error;

use crate::tree::NodeId;

/// A builder or recipe was given incomplete or invalid input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A type builder is missing a required field.
    #[error("{builder}: the {field} is required")]
    MissingField {
        builder: &'static str,
        field: &'static str,
    },

    /// A recipe is missing one or more required options.
    #[error("recipe {recipe} is missing required options: {}", .options.join(", "))]
    MissingOptions {
        recipe: String,
        options: Vec<String>,
    },

    /// A recipe option has a value the recipe cannot use.
    #[error("recipe {recipe}: invalid value for option {option}: {message}")]
    InvalidOption {
        recipe: String,
        option: String,
        message: String,
    },

    /// No recipe is registered under the requested name.
    #[error("unknown recipe: {name}")]
    UnknownRecipe { name: String },
}

/// A template application failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The coordinate's target is not in the tree the template was applied to.
    #[error("coordinate target {target} not found")]
    CoordinateNotFound { target: NodeId },

    /// The rendered snippet did not parse in the scope of the coordinate.
    #[error("template did not parse: {diagnostic}\n{snippet}")]
    Parse { snippet: String, diagnostic: String },

    /// The insertion point makes no sense for the target node.
    #[error("cannot insert {point} at a {kind}")]
    InvalidInsertionPoint { point: String, kind: &'static str },

    /// The number of arguments does not match the template's placeholders.
    #[error("template expects {expected} parameters, got {actual}")]
    ParameterMismatch { expected: usize, actual: usize },
}

/// A cursor ancestor lookup found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected an enclosing {kind}")]
pub struct AncestorNotFound {
    pub kind: &'static str,
}

/// A source file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}:{line}:{column}: {message}")]
pub struct ParseError {
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// A pipeline run stopped before completing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A recipe that opted into hard failure recorded an error.
    #[error("recipe {recipe} failed: {message}")]
    RecipeFailed { recipe: String, message: String },

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_options_lists_all() {
        let err = ConstructionError::MissingOptions {
            recipe: "maven.ChangeParentVersion".to_string(),
            options: vec!["artifactId".to_string(), "groupId".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "recipe maven.ChangeParentVersion is missing required options: artifactId, groupId"
        );
    }

    #[test]
    fn missing_field_message() {
        let err = ConstructionError::MissingField {
            builder: "VariableTypeBuilder",
            field: "variable name",
        };
        assert_eq!(err.to_string(), "VariableTypeBuilder: the variable name is required");
    }
}
