// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Pipeline configuration files.
//!
//! A `reweave.toml` names the recipes to run, in order, with their options,
//! and the indentation style formatting uses:
//!
//! ```toml
//! [style.tabs_and_indents]
//! indent_size = 2
//! continuation_indent_size = 4
//!
//! [[pipeline]]
//! recipe = "properties.ChangePropertyKey"
//! options = { oldPropertyKey = "a.b.c", newPropertyKey = "a.b.d" }
//!
//! [[pipeline]]
//! recipe = "upgrade-parent"
//!
//! [[composite]]
//! name = "upgrade-parent"
//! recipes = [
//!     { recipe = "maven.ChangeParentVersion", options = { groupId = "org.acme", artifactId = "parent", newVersion = "2.0" } },
//! ]
//! ```
//!
//! A pipeline step names either a registered recipe or a composite declared
//! in the same file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reweave_core::{CompositeRecipe, Recipe, RecipeOptions, RecipeRegistry, Styles};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReweaveError;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "reweave.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReweaveConfig {
    pub style: Styles,
    pub pipeline: Vec<RecipeStep>,
    pub composite: Vec<CompositeConfig>,
}

/// One recipe with its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeStep {
    pub recipe: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// A named recipe made of other recipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositeConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recipes: Vec<RecipeStep>,
}

impl RecipeStep {
    pub fn new(recipe: impl Into<String>, options: RecipeOptions) -> Self {
        RecipeStep {
            recipe: recipe.into(),
            options: options.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    pub fn options(&self) -> RecipeOptions {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

impl ReweaveConfig {
    pub fn parse(source: &str) -> Result<Self, ReweaveError> {
        Ok(toml::from_str(source)?)
    }

    /// Load `explicit` if given, else `reweave.toml` in `dir` if present,
    /// else the defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ReweaveError> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    debug!(dir = %dir.display(), "no configuration file, using defaults");
                    return Ok(ReweaveConfig::default());
                }
                candidate
            }
        };
        let source = std::fs::read_to_string(&path).map_err(|e| ReweaveError::io(&path, e))?;
        let config = Self::parse(&source).map_err(|err| match err {
            ReweaveError::Config { message, .. } => ReweaveError::Config {
                path: Some(path.clone()),
                message,
            },
            other => other,
        })?;
        debug!(path = %path.display(), steps = config.pipeline.len(), "loaded configuration");
        Ok(config)
    }

    /// Build the configured pipeline's recipes, in order.
    pub fn recipes(&self, registry: &RecipeRegistry) -> Result<Vec<Arc<dyn Recipe>>, ReweaveError> {
        let mut building = Vec::new();
        self.pipeline
            .iter()
            .map(|step| self.build(step, registry, &mut building))
            .collect()
    }

    fn build(
        &self,
        step: &RecipeStep,
        registry: &RecipeRegistry,
        building: &mut Vec<String>,
    ) -> Result<Arc<dyn Recipe>, ReweaveError> {
        let Some(composite) = self.composite.iter().find(|c| c.name == step.recipe) else {
            return Ok(registry.build(&step.recipe, &step.options())?);
        };
        if building.contains(&composite.name) {
            return Err(ReweaveError::Config {
                path: None,
                message: format!("composite {} includes itself", composite.name),
            });
        }
        if !step.options.is_empty() {
            return Err(ReweaveError::Config {
                path: None,
                message: format!("composite {} takes no options", composite.name),
            });
        }

        building.push(composite.name.clone());
        let children = composite
            .recipes
            .iter()
            .map(|child| self.build(child, registry, building))
            .collect::<Result<Vec<_>, _>>()?;
        building.pop();

        let mut recipe = CompositeRecipe::new(composite.name.clone(), children);
        if let Some(description) = &composite.description {
            recipe = recipe.with_description(description.clone());
        }
        Ok(Arc::new(recipe))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::registry;
    use reweave_core::ConstructionError;

    #[test]
    fn empty_file_is_the_default() {
        let config = ReweaveConfig::parse("").unwrap();
        assert_eq!(config, ReweaveConfig::default());
        assert_eq!(config.style.tabs_and_indents.indent_size, 4);
        assert_eq!(config.style.tabs_and_indents.continuation_indent_size, 8);
    }

    #[test]
    fn style_overrides_keep_other_defaults() {
        let config = ReweaveConfig::parse("[style.tabs_and_indents]\nindent_size = 2\n").unwrap();
        let style = &config.style.tabs_and_indents;
        assert_eq!(style.indent_size, 2);
        assert_eq!(style.tab_size, 4);
        assert!(!style.use_tab_character);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ReweaveConfig::parse("[[pipeline]]\nrecipe = \"x\"\noptoins = {}\n").unwrap_err();
        assert!(matches!(err, ReweaveError::Config { .. }), "{}", err);
    }

    #[test]
    fn pipeline_steps_build_in_order() {
        let config = ReweaveConfig::parse(
            r#"
            [[pipeline]]
            recipe = "properties.ChangePropertyKey"
            options = { oldPropertyKey = "a.b.c", newPropertyKey = "a.b.d" }

            [[pipeline]]
            recipe = "xml.ChangeTagValue"
            options = { elementPath = "/project/version", newValue = "2" }
            "#,
        )
        .unwrap();
        let recipes = config.recipes(&registry()).unwrap();
        let names: Vec<&str> = recipes.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["properties.ChangePropertyKey", "xml.ChangeTagValue"]);
    }

    #[test]
    fn composites_wrap_their_recipes() {
        let config = ReweaveConfig::parse(
            r#"
            [[pipeline]]
            recipe = "tidy"

            [[composite]]
            name = "tidy"
            description = "Rename and re-value"
            recipes = [
                { recipe = "properties.ChangePropertyKey", options = { oldPropertyKey = "a", newPropertyKey = "b" } },
                { recipe = "properties.ChangePropertyValue", options = { propertyKey = "b", newValue = "1" } },
            ]
            "#,
        )
        .unwrap();
        let recipes = config.recipes(&registry()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name(), "tidy");
        assert_eq!(recipes[0].recipe_list().len(), 2);
    }

    #[test]
    fn self_including_composites_are_rejected() {
        let config = ReweaveConfig::parse(
            r#"
            [[pipeline]]
            recipe = "loop"

            [[composite]]
            name = "loop"
            recipes = [{ recipe = "loop" }]
            "#,
        )
        .unwrap();
        let err = config.recipes(&registry()).unwrap_err();
        assert!(err.to_string().contains("composite loop includes itself"));
    }

    #[test]
    fn missing_options_surface_as_construction_errors() {
        let config = ReweaveConfig::parse("[[pipeline]]\nrecipe = \"maven.ChangeParentVersion\"\n").unwrap();
        let err = config.recipes(&registry()).unwrap_err();
        let ReweaveError::Construction(ConstructionError::MissingOptions { options, .. }) = err else {
            panic!("expected missing options, got {}", err);
        };
        assert_eq!(options, vec!["artifactId", "groupId", "newVersion"]);
    }
}
