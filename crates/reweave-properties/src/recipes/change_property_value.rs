// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use reweave_core::cursor::Cursor;
use reweave_core::recipe::{Recipe, RecipeEntry, RecipeOptions};
use reweave_core::visitor::TreeVisitor;
use reweave_core::{ConstructionError, ExecutionContext};

use crate::tree::{Entry, Properties};
use crate::visitor::{walk_entry, PropertiesVisitor};

/// Sets the value of a property, optionally only when it has a given
/// current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePropertyValue {
    property_key: String,
    new_value: String,
    old_value: Option<String>,
}

impl ChangePropertyValue {
    pub const NAME: &'static str = "properties.ChangePropertyValue";
    const REQUIRED: &'static [&'static str] = &["propertyKey", "newValue"];
    const OPTIONS: &'static [&'static str] = &["propertyKey", "newValue", "oldValue"];

    pub fn new(
        property_key: impl Into<String>,
        new_value: impl Into<String>,
        old_value: Option<String>,
    ) -> Result<Self, ConstructionError> {
        let mut options = RecipeOptions::new()
            .with("propertyKey", property_key)
            .with("newValue", new_value);
        if let Some(old_value) = old_value {
            options.insert("oldValue", old_value);
        }
        Self::from_options(&options)
    }

    pub fn from_options(options: &RecipeOptions) -> Result<Self, ConstructionError> {
        options.require(Self::NAME, Self::REQUIRED)?;
        Ok(ChangePropertyValue {
            property_key: options.required(Self::NAME, "propertyKey")?,
            new_value: options.required(Self::NAME, "newValue")?,
            old_value: options.get("oldValue").map(str::to_string),
        })
    }

    pub fn entry() -> RecipeEntry {
        RecipeEntry {
            name: Self::NAME,
            description: "Change the value of a property.",
            options: Self::OPTIONS,
            constructor: |options| Ok(Arc::new(Self::from_options(options)?)),
        }
    }
}

impl Recipe for ChangePropertyValue {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change property value"
    }

    fn description(&self) -> &str {
        "Change the value of a property."
    }

    fn options(&self) -> RecipeOptions {
        let mut options = RecipeOptions::new()
            .with("propertyKey", self.property_key.clone())
            .with("newValue", self.new_value.clone());
        if let Some(old_value) = &self.old_value {
            options.insert("oldValue", old_value.clone());
        }
        options
    }

    fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
        ChangePropertyValueVisitor {
            recipe: self.clone(),
        }
        .into_tree_visitor()
    }
}

struct ChangePropertyValueVisitor {
    recipe: ChangePropertyValue,
}

impl PropertiesVisitor<ExecutionContext> for ChangePropertyValueVisitor {
    fn visit_entry(
        &mut self,
        entry: Arc<Entry>,
        cursor: &Cursor<'_, Properties>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Entry> {
        let recipe = &self.recipe;
        let matches_old = recipe
            .old_value
            .as_ref()
            .is_none_or(|old| *old == entry.value.text);
        let entry = if entry.key == recipe.property_key && matches_old {
            let value = Arc::clone(&entry.value).with_text(recipe.new_value.clone());
            entry.with_value(value)
        } else {
            entry
        };
        walk_entry(self, entry, cursor, ctx)
    }
}
