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

use super::{attach_pom, Pom};
use crate::path::TagPathMatcher;
use crate::tree::{Document, Tag, Xml};
use crate::visitor::{enclosing_tag, walk_document, walk_tag, XmlVisitor};

/// Sets the version of a pom's parent, when the parent is the given
/// artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeParentVersion {
    group_id: String,
    artifact_id: String,
    new_version: String,
}

impl ChangeParentVersion {
    pub const NAME: &'static str = "maven.ChangeParentVersion";
    const OPTIONS: &'static [&'static str] = &["artifactId", "groupId", "newVersion"];

    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        Self::from_options(
            &RecipeOptions::new()
                .with("groupId", group_id)
                .with("artifactId", artifact_id)
                .with("newVersion", new_version),
        )
    }

    pub fn from_options(options: &RecipeOptions) -> Result<Self, ConstructionError> {
        options.require(Self::NAME, Self::OPTIONS)?;
        Ok(ChangeParentVersion {
            group_id: options.required(Self::NAME, "groupId")?,
            artifact_id: options.required(Self::NAME, "artifactId")?,
            new_version: options.required(Self::NAME, "newVersion")?,
        })
    }

    pub fn entry() -> RecipeEntry {
        RecipeEntry {
            name: Self::NAME,
            description: "Set the version of the parent pom.",
            options: Self::OPTIONS,
            constructor: |options| Ok(Arc::new(Self::from_options(options)?)),
        }
    }
}

impl Recipe for ChangeParentVersion {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change Maven parent pom version"
    }

    fn description(&self) -> &str {
        "Set the version of the parent pom."
    }

    fn options(&self) -> RecipeOptions {
        RecipeOptions::new()
            .with("groupId", self.group_id.clone())
            .with("artifactId", self.artifact_id.clone())
            .with("newVersion", self.new_version.clone())
    }

    fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
        ChangeParentVersionVisitor {
            recipe: self.clone(),
            matcher: TagPathMatcher::new("/project/parent/version"),
        }
        .into_tree_visitor()
    }
}

struct ChangeParentVersionVisitor {
    recipe: ChangeParentVersion,
    matcher: TagPathMatcher,
}

impl XmlVisitor<ExecutionContext> for ChangeParentVersionVisitor {
    fn visit_document(
        &mut self,
        document: Arc<Document>,
        cursor: &Cursor<'_, Xml>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Document> {
        if document.markers.find_first::<Pom>().is_none() {
            return document;
        }
        let changed = walk_document(self, Arc::clone(&document), cursor, ctx);
        if Arc::ptr_eq(&document, &changed) {
            return changed;
        }
        attach_pom(changed)
    }

    fn visit_tag(&mut self, tag: Arc<Tag>, cursor: &Cursor<'_, Xml>, ctx: &mut ExecutionContext) -> Arc<Tag> {
        let tag = walk_tag(self, tag, cursor, ctx);
        if !self.matcher.matches(cursor) {
            return tag;
        }
        let Some(parent) = enclosing_tag(cursor) else {
            return tag;
        };
        let recipe = &self.recipe;
        if parent.child_value("groupId") == Some(recipe.group_id.as_str())
            && parent.child_value("artifactId") == Some(recipe.artifact_id.as_str())
        {
            debug!(
                artifact = %recipe.artifact_id,
                version = %recipe.new_version,
                "changing parent version"
            );
            return tag.with_value(&recipe.new_version);
        }
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(err: ConstructionError) -> Vec<String> {
        match err {
            ConstructionError::MissingOptions { options, .. } => options,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validation_reports_missing_options_in_order() {
        let none = ChangeParentVersion::from_options(&RecipeOptions::new()).unwrap_err();
        assert_eq!(names(none), vec!["artifactId", "groupId", "newVersion"]);

        let artifact_only =
            ChangeParentVersion::from_options(&RecipeOptions::new().with("artifactId", "acme-parent")).unwrap_err();
        assert_eq!(names(artifact_only), vec!["groupId", "newVersion"]);

        let group_only =
            ChangeParentVersion::from_options(&RecipeOptions::new().with("groupId", "org.acme")).unwrap_err();
        assert_eq!(names(group_only), vec!["artifactId", "newVersion"]);

        assert!(ChangeParentVersion::new("org.acme", "acme-parent", "1.0.0").is_ok());
    }
}
