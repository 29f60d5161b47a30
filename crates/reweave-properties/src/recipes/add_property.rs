// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use reweave_core::cursor::Cursor;
use reweave_core::recipe::{Recipe, RecipeEntry, RecipeOptions};
use reweave_core::template::{Coordinate, Template};
use reweave_core::visitor::TreeVisitor;
use reweave_core::{ConstructionError, ExecutionContext};

use crate::template::apply_to_file;
use crate::tree::{File, Properties};
use crate::visitor::PropertiesVisitor;

/// Adds a property at the end of the file unless the key is already there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddProperty {
    property: String,
    value: String,
}

impl AddProperty {
    pub const NAME: &'static str = "properties.AddProperty";
    const OPTIONS: &'static [&'static str] = &["property", "value"];

    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Result<Self, ConstructionError> {
        Self::from_options(&RecipeOptions::new().with("property", property).with("value", value))
    }

    pub fn from_options(options: &RecipeOptions) -> Result<Self, ConstructionError> {
        options.require(Self::NAME, Self::OPTIONS)?;
        Ok(AddProperty {
            property: options.required(Self::NAME, "property")?,
            value: options.required(Self::NAME, "value")?,
        })
    }

    pub fn entry() -> RecipeEntry {
        RecipeEntry {
            name: Self::NAME,
            description: "Add a property if it is not already present.",
            options: Self::OPTIONS,
            constructor: |options| Ok(Arc::new(Self::from_options(options)?)),
        }
    }
}

impl Recipe for AddProperty {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Add property"
    }

    fn description(&self) -> &str {
        "Add a property if it is not already present."
    }

    fn options(&self) -> RecipeOptions {
        RecipeOptions::new()
            .with("property", self.property.clone())
            .with("value", self.value.clone())
    }

    fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
        AddPropertyVisitor {
            recipe: self.clone(),
        }
        .into_tree_visitor()
    }
}

struct AddPropertyVisitor {
    recipe: AddProperty,
}

impl PropertiesVisitor<ExecutionContext> for AddPropertyVisitor {
    fn visit_file(&mut self, file: Arc<File>, cursor: &Cursor<'_, Properties>, ctx: &mut ExecutionContext) -> Arc<File> {
        if file.entry(&self.recipe.property).is_some() {
            return file;
        }
        let coordinate = Coordinate::last_statement(file.id);
        apply_to_file(
            cursor,
            file,
            coordinate,
            &Template::new("#{}=#{}"),
            &[self.recipe.property.as_str(), self.recipe.value.as_str()],
            ctx,
        )
    }
}
