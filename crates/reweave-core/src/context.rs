// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-run state shared by every recipe of a pipeline run.
//!
//! An [`ExecutionContext`] is single-writer: it is passed as `&mut` through a
//! run and never shared between concurrent runs. The one piece that can be
//! shared is the [`CancellationFlag`], so a deadline thread can stop a run.
//!
//! Contained failures (a template that did not parse, a missing ancestor, an
//! unattributed expression) never abort a run; they are recorded here as
//! [`Diagnostic`]s and mirrored to `tracing`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{AncestorNotFound, TemplateError};
use crate::style::Styles;
use crate::tree::NodeId;

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation signal, checked between visits.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TemplateParse,
    CoordinateNotFound,
    InvalidInsertionPoint,
    ParameterMismatch,
    TypeResolutionGap,
    AncestorNotFound,
    /// A recipe was skipped because it was already running.
    RecursiveRecipe,
}

impl DiagnosticKind {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::TemplateParse => "template_parse",
            DiagnosticKind::CoordinateNotFound => "coordinate_not_found",
            DiagnosticKind::InvalidInsertionPoint => "invalid_insertion_point",
            DiagnosticKind::ParameterMismatch => "parameter_mismatch",
            DiagnosticKind::TypeResolutionGap => "type_resolution_gap",
            DiagnosticKind::AncestorNotFound => "ancestor_not_found",
            DiagnosticKind::RecursiveRecipe => "recursive_recipe",
        }
    }
}

/// A contained failure recorded during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(recipe) = &self.recipe {
            write!(f, "[{}] ", recipe)?;
        }
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

// ============================================================================
// ExecutionContext
// ============================================================================

/// Mutable state for one pipeline run.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    cancellation: CancellationFlag,
    styles: Styles,
    diagnostics: Vec<Diagnostic>,
    current_recipe: Option<String>,
    failure: Option<Diagnostic>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Handle that cancels this run from another thread.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn current_recipe(&self) -> Option<&str> {
        self.current_recipe.as_deref()
    }

    pub fn set_current_recipe(&mut self, recipe: Option<String>) {
        self.current_recipe = recipe;
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Record a diagnostic, attributed to the running recipe.
    pub fn record(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        node: Option<NodeId>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            severity,
            kind,
            recipe: self.current_recipe.clone(),
            node,
            message: message.into(),
        };
        match severity {
            Severity::Info => info!(kind = kind.name(), "{}", diagnostic),
            Severity::Warning => warn!(kind = kind.name(), "{}", diagnostic),
            Severity::Error => error!(kind = kind.name(), "{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record a failed template application against `node`.
    pub fn record_template_error(&mut self, node: NodeId, err: &TemplateError) {
        let kind = match err {
            TemplateError::CoordinateNotFound { .. } => DiagnosticKind::CoordinateNotFound,
            TemplateError::Parse { .. } => DiagnosticKind::TemplateParse,
            TemplateError::InvalidInsertionPoint { .. } => DiagnosticKind::InvalidInsertionPoint,
            TemplateError::ParameterMismatch { .. } => DiagnosticKind::ParameterMismatch,
        };
        self.record(Severity::Warning, kind, Some(node), err.to_string());
    }

    /// Record a visitor asking for an ancestor the tree does not have.
    pub fn record_ancestor_not_found(&mut self, node: NodeId, err: &AncestorNotFound) {
        self.record(
            Severity::Error,
            DiagnosticKind::AncestorNotFound,
            Some(node),
            err.to_string(),
        );
    }

    /// Record that a predicate saw an expression without type attribution.
    pub fn record_type_gap(&mut self, node: NodeId, what: impl fmt::Display) {
        self.record(
            Severity::Info,
            DiagnosticKind::TypeResolutionGap,
            Some(node),
            format!("no type attribution for {}", what),
        );
    }

    /// Stop the run after the current visit. Used by recipes that opt into
    /// hard failure instead of leaving the node unchanged.
    pub fn fail(&mut self, kind: DiagnosticKind, node: Option<NodeId>, message: impl Into<String>) {
        self.record(Severity::Error, kind, node, message);
        if self.failure.is_none() {
            self.failure = self.diagnostics.last().cloned();
        }
    }

    pub fn failure(&self) -> Option<&Diagnostic> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<Diagnostic> {
        self.failure.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_carry_the_running_recipe() {
        let mut ctx = ExecutionContext::new();
        ctx.set_current_recipe(Some("test.Recipe".to_string()));
        ctx.record_template_error(
            NodeId(7),
            &TemplateError::Parse {
                snippet: "return".to_string(),
                diagnostic: "expected ';'".to_string(),
            },
        );

        let diagnostics = ctx.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::TemplateParse);
        assert_eq!(diagnostics[0].recipe.as_deref(), Some("test.Recipe"));
        assert_eq!(diagnostics[0].node, Some(NodeId(7)));
        assert!(ctx.failure().is_none());
    }

    #[test]
    fn cancellation_is_shared() {
        let ctx = ExecutionContext::new();
        let flag = ctx.cancellation();
        assert!(!ctx.is_cancelled());
        flag.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn fail_keeps_the_first_failure() {
        let mut ctx = ExecutionContext::new();
        ctx.fail(DiagnosticKind::TemplateParse, None, "first");
        ctx.fail(DiagnosticKind::TemplateParse, None, "second");
        assert_eq!(ctx.failure().map(|d| d.message.as_str()), Some("first"));
        assert_eq!(ctx.diagnostics().len(), 2);
        assert!(ctx.take_failure().is_some());
        assert!(ctx.failure().is_none());
    }
}
