// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! JSON output for `--format json`.
//!
//! Every response starts with `status` and `schema_version`. Field and array
//! order is deterministic: files in input order, recipes in pipeline order,
//! diagnostics in the order they were recorded.

use std::io::{self, Write};

use reweave_core::{Diagnostic, RecipeEntry};
use serde::Serialize;

use crate::error::{OutputErrorCode, ReweaveError};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Run
// ============================================================================

/// Response of `reweave run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub status: String,
    pub schema_version: String,
    /// Whether changed files were written back.
    pub applied: bool,
    /// Whether the deadline stopped the run early.
    pub cancelled: bool,
    /// Recipe descriptors in pipeline order, e.g. `xml.ChangeTagValue(elementPath=/a, newValue=1)`.
    pub recipes: Vec<String>,
    /// Changed files only.
    pub files: Vec<FileChange>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    pub path: String,
    pub language: String,
    /// Recipes that changed this file, in the order they ran.
    pub changed_by: Vec<String>,
    pub diff: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub diagnostics: usize,
}

// ============================================================================
// Recipes
// ============================================================================

/// Response of `reweave recipes`.
#[derive(Debug, Clone, Serialize)]
pub struct RecipesResponse {
    pub status: String,
    pub schema_version: String,
    pub recipes: Vec<RecipeInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeInfo {
    pub name: String,
    pub description: String,
    pub options: Vec<String>,
}

impl From<&RecipeEntry> for RecipeInfo {
    fn from(entry: &RecipeEntry) -> Self {
        RecipeInfo {
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            options: entry.options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl RecipesResponse {
    pub fn new<'a>(entries: impl IntoIterator<Item = &'a RecipeEntry>) -> Self {
        RecipesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            recipes: entries.into_iter().map(RecipeInfo::from).collect(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Same as the process exit code.
    pub code: u8,
    pub message: String,
}

impl ErrorResponse {
    pub fn from_error(err: &ReweaveError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code: OutputErrorCode::from(err).code(),
                message: err.to_string(),
            },
        }
    }
}

/// Write `response` as pretty JSON followed by a newline.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
