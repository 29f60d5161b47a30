// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use reweave_core::cursor::Cursor;
use reweave_core::recipe::{Recipe, RecipeEntry, RecipeOptions};
use reweave_core::visitor::TreeVisitor;
use reweave_core::{ConstructionError, ExecutionContext};

use crate::path::TagPathMatcher;
use crate::tree::{Tag, Xml};
use crate::visitor::{walk_tag, XmlVisitor};

/// Sets the text of every tag at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTagValue {
    element_path: String,
    new_value: String,
}

impl ChangeTagValue {
    pub const NAME: &'static str = "xml.ChangeTagValue";
    const OPTIONS: &'static [&'static str] = &["elementPath", "newValue"];

    pub fn new(element_path: impl Into<String>, new_value: impl Into<String>) -> Result<Self, ConstructionError> {
        Self::from_options(
            &RecipeOptions::new()
                .with("elementPath", element_path)
                .with("newValue", new_value),
        )
    }

    pub fn from_options(options: &RecipeOptions) -> Result<Self, ConstructionError> {
        options.require(Self::NAME, Self::OPTIONS)?;
        Ok(ChangeTagValue {
            element_path: options.required(Self::NAME, "elementPath")?,
            new_value: options.required(Self::NAME, "newValue")?,
        })
    }

    pub fn entry() -> RecipeEntry {
        RecipeEntry {
            name: Self::NAME,
            description: "Set the text of the tags at a path.",
            options: Self::OPTIONS,
            constructor: |options| Ok(Arc::new(Self::from_options(options)?)),
        }
    }
}

impl Recipe for ChangeTagValue {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change XML tag value"
    }

    fn description(&self) -> &str {
        "Set the text of the tags at a path."
    }

    fn options(&self) -> RecipeOptions {
        RecipeOptions::new()
            .with("elementPath", self.element_path.clone())
            .with("newValue", self.new_value.clone())
    }

    fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
        ChangeTagValueVisitor {
            matcher: TagPathMatcher::new(&self.element_path),
            new_value: self.new_value.clone(),
        }
        .into_tree_visitor()
    }
}

struct ChangeTagValueVisitor {
    matcher: TagPathMatcher,
    new_value: String,
}

impl XmlVisitor<ExecutionContext> for ChangeTagValueVisitor {
    fn visit_tag(&mut self, tag: Arc<Tag>, cursor: &Cursor<'_, Xml>, ctx: &mut ExecutionContext) -> Arc<Tag> {
        let tag = walk_tag(self, tag, cursor, ctx);
        if self.matcher.matches(cursor) {
            tag.with_value(&self.new_value)
        } else {
            tag
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use reweave_core::print::Codegen;

    fn run(path: &str, value: &str, source: &str) -> String {
        let mut visitor = ChangeTagValueVisitor {
            matcher: TagPathMatcher::new(path),
            new_value: value.to_string(),
        };
        let doc = parse("a.xml", source).unwrap();
        Codegen::print(visitor.visit_root(doc, &mut ExecutionContext::new()).as_ref())
    }

    #[test]
    fn changes_text_at_path() {
        assert_eq!(
            run("/config/mode", "fast", "<config>\n  <mode>slow</mode>\n  <other><mode>x</mode></other>\n</config>"),
            "<config>\n  <mode>fast</mode>\n  <other><mode>x</mode></other>\n</config>"
        );
    }

    #[test]
    fn self_closing_tag_gains_text() {
        assert_eq!(run("/a/b", "v", "<a><b /></a>"), "<a><b>v</b></a>");
    }

    #[test]
    fn same_value_keeps_the_document() {
        let doc = parse("a.xml", "<a><b>v</b></a>").unwrap();
        let mut visitor = ChangeTagValueVisitor {
            matcher: TagPathMatcher::new("/a/b"),
            new_value: "v".to_string(),
        };
        let out = visitor.visit_root(Arc::clone(&doc), &mut ExecutionContext::new());
        assert!(Arc::ptr_eq(&doc, &out));
    }
}
