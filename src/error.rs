// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types and exit codes for the reweave CLI.
//!
//! `ReweaveError` is the single error type the CLI reports. Subsystem errors
//! from the engine and the grammar crates are bridged into it with `From`, so
//! command code can use `?` throughout.
//!
//! ## Exit codes
//!
//! - `2`: invalid arguments (unknown recipe, missing options, bad config)
//! - `3`: a source file did not parse
//! - `4`: reading or writing files failed
//! - `5`: a recipe that opted into hard failure failed
//! - `10`: internal errors

use std::fmt;
use std::io;
use std::path::PathBuf;

use reweave_core::{ConstructionError, ParseError, PipelineError};
use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable codes used as process exit codes and in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Bad input from the caller.
    InvalidArguments = 2,
    /// A source file could not be parsed.
    ParseError = 3,
    /// Files could not be read or written.
    ApplyError = 4,
    /// A recipe failed the run.
    RecipeFailed = 5,
    /// Bugs and unexpected state.
    InternalError = 10,
}

impl OutputErrorCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ReweaveError {
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A recipe could not be built from its options.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("invalid configuration{}: {message}", .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Config {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("recipe {recipe} failed: {message}")]
    RecipeFailed { recipe: String, message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ReweaveError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ReweaveError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReweaveError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ReweaveError::Internal {
            message: message.into(),
        }
    }
}

impl From<&ReweaveError> for OutputErrorCode {
    fn from(err: &ReweaveError) -> Self {
        match err {
            ReweaveError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ReweaveError::Construction(_) => OutputErrorCode::InvalidArguments,
            ReweaveError::Config { .. } => OutputErrorCode::InvalidArguments,
            ReweaveError::Parse(_) => OutputErrorCode::ParseError,
            ReweaveError::Io { .. } => OutputErrorCode::ApplyError,
            ReweaveError::RecipeFailed { .. } => OutputErrorCode::RecipeFailed,
            ReweaveError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<PipelineError> for ReweaveError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::RecipeFailed { recipe, message } => ReweaveError::RecipeFailed { recipe, message },
            PipelineError::Construction(err) => ReweaveError::Construction(err),
        }
    }
}

impl From<toml::de::Error> for ReweaveError {
    fn from(err: toml::de::Error) -> Self {
        ReweaveError::Config {
            path: None,
            message: err.message().to_string(),
        }
    }
}

impl From<serde_json::Error> for ReweaveError {
    fn from(err: serde_json::Error) -> Self {
        ReweaveError::internal(format!("failed to serialize output: {}", err))
    }
}

// ============================================================================
// Tests
// ============================================================================
