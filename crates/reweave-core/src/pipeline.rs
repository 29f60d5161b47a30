// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Running recipes over source files.
//!
//! A [`Pipeline`] is an ordered, deduplicated list of recipes. Running it:
//!
//! - applies each recipe's visitor to every source, in order, each recipe
//!   seeing the output of the one before
//! - runs a recipe's sub-recipes right after it, depth first
//! - skips (with a diagnostic) a recipe that is already running further up
//!   the composition, instead of re-entering it
//! - checks for cancellation before every (recipe, source) visit and stops
//!   early, returning what was done so far
//! - stops with [`PipelineError::RecipeFailed`] when a recipe opted into
//!   hard failure through [`ExecutionContext::fail`]

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::context::{DiagnosticKind, ExecutionContext, Severity};
use crate::error::PipelineError;
use crate::recipe::{Recipe, RecipeDescriptor};
use crate::tree::{same_source, SourceRef};

/// Outcome for one source file.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub before: SourceRef,
    pub after: SourceRef,
    /// Names of the recipes that changed this file, in the order they ran.
    pub changed_by: Vec<String>,
}

impl SourceResult {
    pub fn is_changed(&self) -> bool {
        !same_source(&self.before, &self.after)
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// One entry per input source, in input order.
    pub results: Vec<SourceResult>,
    /// True if the run stopped because of cancellation.
    pub cancelled: bool,
}

impl RunResult {
    pub fn changed(&self) -> impl Iterator<Item = &SourceResult> {
        self.results.iter().filter(|r| r.is_changed())
    }
}

/// Ordered, deduplicated recipes.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    recipes: Vec<Arc<dyn Recipe>>,
}

/// Whether a recipe ran to completion.
enum Flow {
    Completed,
    Cancelled,
}

impl Pipeline {
    /// Build a pipeline, dropping recipes equal to an earlier one.
    pub fn new(recipes: impl IntoIterator<Item = Arc<dyn Recipe>>) -> Self {
        let mut seen: HashSet<RecipeDescriptor> = HashSet::new();
        let recipes = recipes
            .into_iter()
            .filter(|recipe| seen.insert(recipe.descriptor()))
            .collect();
        Pipeline { recipes }
    }

    pub fn recipes(&self) -> &[Arc<dyn Recipe>] {
        &self.recipes
    }

    pub fn run(
        &self,
        sources: Vec<SourceRef>,
        ctx: &mut ExecutionContext,
    ) -> Result<RunResult, PipelineError> {
        let mut run = Run {
            before: sources.clone(),
            current: sources,
            changed_by: Vec::new(),
            stack: Vec::new(),
        };
        run.changed_by.resize(run.current.len(), Vec::new());

        let mut cancelled = false;
        for recipe in &self.recipes {
            if let Flow::Cancelled = run.run_recipe(recipe, ctx)? {
                cancelled = true;
                break;
            }
        }
        ctx.set_current_recipe(None);

        let results = run
            .before
            .into_iter()
            .zip(run.current)
            .zip(run.changed_by)
            .map(|((before, after), changed_by)| SourceResult {
                before,
                after,
                changed_by,
            })
            .collect();
        Ok(RunResult { results, cancelled })
    }
}

struct Run {
    before: Vec<SourceRef>,
    current: Vec<SourceRef>,
    changed_by: Vec<Vec<String>>,
    stack: Vec<RecipeDescriptor>,
}

impl Run {
    fn run_recipe(
        &mut self,
        recipe: &Arc<dyn Recipe>,
        ctx: &mut ExecutionContext,
    ) -> Result<Flow, PipelineError> {
        let descriptor = recipe.descriptor();
        if self.stack.contains(&descriptor) {
            ctx.record(
                Severity::Warning,
                DiagnosticKind::RecursiveRecipe,
                None,
                format!("{} is already running, skipped", descriptor),
            );
            return Ok(Flow::Completed);
        }

        debug!(recipe = %descriptor, "running recipe");
        self.stack.push(descriptor);
        let flow = self.visit_all(recipe, ctx);
        self.stack.pop();
        flow
    }

    fn visit_all(
        &mut self,
        recipe: &Arc<dyn Recipe>,
        ctx: &mut ExecutionContext,
    ) -> Result<Flow, PipelineError> {
        let name = recipe.name().to_string();
        ctx.set_current_recipe(Some(name.clone()));
        let mut visitor = recipe.visitor(ctx);

        for i in 0..self.current.len() {
            if ctx.is_cancelled() {
                info!(recipe = %name, "run cancelled");
                return Ok(Flow::Cancelled);
            }
            let before = Arc::clone(&self.current[i]);
            let after = visitor.visit_source(Arc::clone(&before), ctx);

            if let Some(failure) = ctx.take_failure() {
                return Err(PipelineError::RecipeFailed {
                    recipe: name,
                    message: failure.message,
                });
            }
            if !same_source(&before, &after) {
                debug!(recipe = %name, path = %after.source_path().display(), "changed");
                if !self.changed_by[i].contains(&name) {
                    self.changed_by[i].push(name.clone());
                }
                self.current[i] = after;
            }
        }

        for sub in recipe.recipe_list() {
            if let Flow::Cancelled = self.run_recipe(&sub, ctx)? {
                return Ok(Flow::Cancelled);
            }
        }
        Ok(Flow::Completed)
    }
}
