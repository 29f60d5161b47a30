// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use reweave_core::cursor::Cursor;
use reweave_core::recipe::{Recipe, RecipeEntry, RecipeOptions};
use reweave_core::visitor::TreeVisitor;
use reweave_core::{ConstructionError, ExecutionContext};
use tracing::debug;

use crate::tree::{Entry, Properties};
use crate::visitor::{walk_entry, PropertiesVisitor};

/// Renames a property key, keeping its value and surrounding formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePropertyKey {
    old_property_key: String,
    new_property_key: String,
}

impl ChangePropertyKey {
    pub const NAME: &'static str = "properties.ChangePropertyKey";
    const OPTIONS: &'static [&'static str] = &["oldPropertyKey", "newPropertyKey"];

    pub fn new(
        old_property_key: impl Into<String>,
        new_property_key: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        let options = RecipeOptions::new()
            .with("oldPropertyKey", old_property_key)
            .with("newPropertyKey", new_property_key);
        Self::from_options(&options)
    }

    pub fn from_options(options: &RecipeOptions) -> Result<Self, ConstructionError> {
        options.require(Self::NAME, Self::OPTIONS)?;
        Ok(ChangePropertyKey {
            old_property_key: options.required(Self::NAME, "oldPropertyKey")?,
            new_property_key: options.required(Self::NAME, "newPropertyKey")?,
        })
    }

    pub fn entry() -> RecipeEntry {
        RecipeEntry {
            name: Self::NAME,
            description: "Change a property key, leaving the value intact.",
            options: Self::OPTIONS,
            constructor: |options| Ok(Arc::new(Self::from_options(options)?)),
        }
    }
}

impl Recipe for ChangePropertyKey {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change property key"
    }

    fn description(&self) -> &str {
        "Change a property key, leaving the value intact."
    }

    fn options(&self) -> RecipeOptions {
        RecipeOptions::new()
            .with("oldPropertyKey", self.old_property_key.clone())
            .with("newPropertyKey", self.new_property_key.clone())
    }

    fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
        ChangePropertyKeyVisitor {
            old_property_key: self.old_property_key.clone(),
            new_property_key: self.new_property_key.clone(),
        }
        .into_tree_visitor()
    }
}

struct ChangePropertyKeyVisitor {
    old_property_key: String,
    new_property_key: String,
}

impl PropertiesVisitor<ExecutionContext> for ChangePropertyKeyVisitor {
    fn visit_entry(
        &mut self,
        entry: Arc<Entry>,
        cursor: &Cursor<'_, Properties>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Entry> {
        let entry = if entry.key == self.old_property_key {
            debug!(from = %self.old_property_key, to = %self.new_property_key, "renaming property");
            entry.with_key(self.new_property_key.clone())
        } else {
            entry
        };
        walk_entry(self, entry, cursor, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use reweave_core::print::Codegen;

    #[test]
    fn validation_lists_both_options() {
        let err = ChangePropertyKey::from_options(&RecipeOptions::new()).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::MissingOptions {
                recipe: ChangePropertyKey::NAME.to_string(),
                options: vec!["oldPropertyKey".to_string(), "newPropertyKey".to_string()],
            }
        );
    }

    #[test]
    fn renames_only_the_matching_key() {
        let file = parse("a.properties", "a.b.c=1\nx.y=2\n").unwrap();
        let mut visitor = ChangePropertyKeyVisitor {
            old_property_key: "a.b.c".to_string(),
            new_property_key: "a.b.d".to_string(),
        };
        let mut ctx = ExecutionContext::new();
        let out = visitor.visit_root(Arc::clone(&file), &mut ctx);

        assert_eq!(Codegen::print(out.as_ref()), "a.b.d=1\nx.y=2\n");
        assert!(Arc::ptr_eq(file.entry("x.y").unwrap(), out.entry("x.y").unwrap()));
        assert_eq!(out.entry("a.b.d").unwrap().id, file.entry("a.b.c").unwrap().id);
    }
}
