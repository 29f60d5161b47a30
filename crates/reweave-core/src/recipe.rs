// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recipes: validated, comparable configurations that produce visitors.
//!
//! A [`Recipe`] holds immutable options, validated when it is constructed.
//! Two recipes are the same recipe when their [`RecipeDescriptor`]s (name
//! plus options) are equal; pipelines use this to deduplicate.
//!
//! Recipes compose: [`Recipe::recipe_list`] names sub-recipes that run after
//! the recipe's own visitor. [`CompositeRecipe`] is a recipe that only
//! aggregates others.
//!
//! A [`RecipeRegistry`] maps recipe names to constructors taking flat string
//! options, so recipes can be configured from a command line or a file.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::context::ExecutionContext;
use crate::error::ConstructionError;
use crate::visitor::{NoopVisitor, TreeVisitor};

// ============================================================================
// Options and descriptors
// ============================================================================

/// Flat named string options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecipeOptions(BTreeMap<String, String>);

impl RecipeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value of `key`, treating blank values as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every key in `required` has a value.
    ///
    /// The error lists all missing keys, in the order given.
    pub fn require(&self, recipe: &str, required: &[&str]) -> Result<(), ConstructionError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|key| self.get(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConstructionError::MissingOptions {
                recipe: recipe.to_string(),
                options: missing,
            })
        }
    }

    /// Value of a key already checked by [`require`](Self::require).
    pub fn required(&self, recipe: &str, key: &str) -> Result<String, ConstructionError> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| ConstructionError::MissingOptions {
                recipe: recipe.to_string(),
                options: vec![key.to_string()],
            })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RecipeOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RecipeOptions(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Identity of a configured recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecipeDescriptor {
    pub name: String,
    pub options: RecipeOptions,
}

impl fmt::Display for RecipeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.options.is_empty() {
            let options: Vec<String> = self
                .options
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "({})", options.join(", "))?;
        }
        Ok(())
    }
}

// ============================================================================
// Recipe
// ============================================================================

/// A configured transformation.
pub trait Recipe: Send + Sync {
    /// Registry name, e.g. `properties.ChangePropertyKey`.
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn options(&self) -> RecipeOptions;

    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            name: self.name().to_string(),
            options: self.options(),
        }
    }

    /// A fresh visitor bound to this recipe's options.
    fn visitor(&self, ctx: &ExecutionContext) -> Box<dyn TreeVisitor>;

    /// Recipes that run after this one, in order.
    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        Vec::new()
    }
}

impl fmt::Debug for dyn Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recipe({})", self.descriptor())
    }
}

/// A named group of recipes.
pub struct CompositeRecipe {
    name: String,
    display_name: String,
    description: String,
    recipes: Vec<Arc<dyn Recipe>>,
}

impl CompositeRecipe {
    pub fn new(name: impl Into<String>, recipes: Vec<Arc<dyn Recipe>>) -> Self {
        let name = name.into();
        CompositeRecipe {
            display_name: name.clone(),
            name,
            description: String::new(),
            recipes,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Recipe for CompositeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    /// The member recipes, so composites with different members differ.
    fn options(&self) -> RecipeOptions {
        self.recipes
            .iter()
            .enumerate()
            .map(|(i, r)| (format!("{:03}", i), r.descriptor().to_string()))
            .collect()
    }

    fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
        Box::new(NoopVisitor)
    }

    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        self.recipes.clone()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Builds a recipe from flat options, validating them.
pub type RecipeConstructor = fn(&RecipeOptions) -> Result<Arc<dyn Recipe>, ConstructionError>;

/// A registered recipe.
#[derive(Debug, Clone)]
pub struct RecipeEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [&'static str],
    pub constructor: RecipeConstructor,
}

/// Recipes by name.
#[derive(Debug, Default)]
pub struct RecipeRegistry {
    entries: BTreeMap<&'static str, RecipeEntry>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: RecipeEntry) {
        self.entries.insert(entry.name, entry);
    }

    pub fn get(&self, name: &str) -> Option<&RecipeEntry> {
        self.entries.get(name)
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &RecipeEntry> {
        self.entries.values()
    }

    /// Construct the recipe registered as `name`.
    pub fn build(
        &self,
        name: &str,
        options: &RecipeOptions,
    ) -> Result<Arc<dyn Recipe>, ConstructionError> {
        let entry = self.get(name).ok_or_else(|| ConstructionError::UnknownRecipe {
            name: name.to_string(),
        })?;
        (entry.constructor)(options)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Named {
        name: String,
        value: String,
    }

    impl Recipe for Named {
        fn name(&self) -> &str {
            &self.name
        }
        fn display_name(&self) -> &str {
            "Named"
        }
        fn options(&self) -> RecipeOptions {
            RecipeOptions::new().with("value", self.value.clone())
        }
        fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
            Box::new(NoopVisitor)
        }
    }

    fn build_named(options: &RecipeOptions) -> Result<Arc<dyn Recipe>, ConstructionError> {
        options.require("test.Named", &["value"])?;
        Ok(Arc::new(Named {
            name: "test.Named".to_string(),
            value: options.required("test.Named", "value")?,
        }))
    }

    #[test]
    fn require_lists_every_missing_option() {
        let options = RecipeOptions::new().with("groupId", "org").with("newVersion", " ");
        let err = options
            .require("maven.ChangeParentVersion", &["artifactId", "groupId", "newVersion"])
            .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::MissingOptions {
                recipe: "maven.ChangeParentVersion".to_string(),
                options: vec!["artifactId".to_string(), "newVersion".to_string()],
            }
        );
    }

    #[test]
    fn descriptors_compare_name_and_options() {
        let a = build_named(&RecipeOptions::new().with("value", "1")).unwrap();
        let b = build_named(&RecipeOptions::new().with("value", "1")).unwrap();
        let c = build_named(&RecipeOptions::new().with("value", "2")).unwrap();
        assert_eq!(a.descriptor(), b.descriptor());
        assert_ne!(a.descriptor(), c.descriptor());
        assert_eq!(a.descriptor().to_string(), "test.Named(value=1)");
    }

    #[test]
    fn registry_builds_and_rejects_unknown() {
        let mut registry = RecipeRegistry::new();
        registry.register(RecipeEntry {
            name: "test.Named",
            description: "test recipe",
            options: &["value"],
            constructor: build_named,
        });

        let recipe = registry
            .build("test.Named", &RecipeOptions::new().with("value", "x"))
            .unwrap();
        assert_eq!(recipe.name(), "test.Named");

        assert!(matches!(
            registry.build("test.Named", &RecipeOptions::new()),
            Err(ConstructionError::MissingOptions { .. })
        ));
        assert!(matches!(
            registry.build("test.Missing", &RecipeOptions::new()),
            Err(ConstructionError::UnknownRecipe { .. })
        ));
    }

    #[test]
    fn composite_descriptor_includes_members() {
        let one = build_named(&RecipeOptions::new().with("value", "1")).unwrap();
        let two = build_named(&RecipeOptions::new().with("value", "2")).unwrap();
        let a = CompositeRecipe::new("test.Group", vec![Arc::clone(&one)]);
        let b = CompositeRecipe::new("test.Group", vec![one, two]);
        assert_ne!(a.descriptor(), b.descriptor());
        assert_eq!(b.recipe_list().len(), 2);
    }
}
