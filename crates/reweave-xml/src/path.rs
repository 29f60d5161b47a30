// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Matching a cursor's tag ancestry against a slash-separated path.
//!
//! - `/project/parent/version` matches from the root tag down
//! - `//dependency/version` matches at any depth
//! - `*` matches any single tag name

use std::fmt;

use reweave_core::cursor::Cursor;

use crate::tree::Xml;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPathMatcher {
    steps: Vec<String>,
    anywhere: bool,
}

impl TagPathMatcher {
    pub fn new(path: &str) -> Self {
        let anywhere = path.starts_with("//") || !path.starts_with('/');
        let steps = path
            .split('/')
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();
        TagPathMatcher { steps, anywhere }
    }

    /// True if the tags from the root to the cursor's node match the path.
    pub fn matches(&self, cursor: &Cursor<'_, Xml>) -> bool {
        let mut names: Vec<&str> = cursor
            .path()
            .filter_map(|frame| frame.value().as_tag().map(|tag| tag.name.as_str()))
            .collect();
        names.reverse();
        if !matches!(cursor.value(), Xml::Tag(_)) || names.len() < self.steps.len() {
            return false;
        }
        if !self.anywhere && names.len() != self.steps.len() {
            return false;
        }
        let tail = &names[names.len() - self.steps.len()..];
        tail.iter()
            .zip(&self.steps)
            .all(|(name, step)| step == "*" || name == step)
    }
}

impl fmt::Display for TagPathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lead = if self.anywhere { "//" } else { "/" };
        write!(f, "{}{}", lead, self.steps.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::sync::Arc;

    /// Cursor chain to the first `version` under `parent`.
    fn with_version_cursor(source: &str, check: impl Fn(&Cursor<'_, Xml>)) {
        let doc = parse("pom.xml", source).unwrap();
        let root = Cursor::root(Xml::Document(Arc::clone(&doc)));
        let project = root.push(Xml::Tag(Arc::clone(&doc.root)));
        let parent = doc.root.child("parent").unwrap();
        let parent_cursor = project.push(Xml::Tag(Arc::clone(parent)));
        let version = parent_cursor.push(Xml::Tag(Arc::clone(parent.child("version").unwrap())));
        check(&version);
    }

    #[test]
    fn absolute_and_relative_paths() {
        with_version_cursor(
            "<project><parent><version>1</version></parent></project>",
            |cursor| {
                assert!(TagPathMatcher::new("/project/parent/version").matches(cursor));
                assert!(TagPathMatcher::new("//parent/version").matches(cursor));
                assert!(TagPathMatcher::new("/project/*/version").matches(cursor));
                assert!(!TagPathMatcher::new("/parent/version").matches(cursor));
                assert!(!TagPathMatcher::new("/project/version").matches(cursor));
            },
        );
    }

    #[test]
    fn display_normalizes() {
        assert_eq!(TagPathMatcher::new("/a/b").to_string(), "/a/b");
        assert_eq!(TagPathMatcher::new("b/c").to_string(), "//b/c");
    }
}
