// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Maven build descriptors.
//!
//! A pom is an XML [`Document`] carrying a [`Pom`] marker with the
//! coordinates read from it. Recipes that only apply to poms check for the
//! marker.

mod change_parent_version;

pub use change_parent_version::ChangeParentVersion;

use std::path::PathBuf;
use std::sync::Arc;

use reweave_core::marker::Marker;
use reweave_core::ParseError;

use crate::parser::parse;
use crate::tree::{Document, Tag};

/// `groupId:artifactId:version` as declared; any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

impl Coordinates {
    fn read(tag: &Tag) -> Self {
        Coordinates {
            group_id: tag.child_value("groupId").map(str::to_string),
            artifact_id: tag.child_value("artifactId").map(str::to_string),
            version: tag.child_value("version").map(str::to_string),
        }
    }
}

/// The model of a pom, as far as recipes need it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pom {
    pub coordinates: Coordinates,
    pub parent: Option<Coordinates>,
}

impl Marker for Pom {
    fn kind(&self) -> &'static str {
        "Pom"
    }
}

impl Pom {
    /// Read the model of a document whose root is `<project>`.
    ///
    /// A missing group id or version is inherited from the parent.
    pub fn from_document(document: &Document) -> Option<Pom> {
        if document.root.name != "project" {
            return None;
        }
        let parent = document.root.child("parent").map(|tag| Coordinates::read(tag));
        let mut coordinates = Coordinates::read(&document.root);
        if let Some(parent) = &parent {
            coordinates.group_id = coordinates.group_id.or_else(|| parent.group_id.clone());
            coordinates.version = coordinates.version.or_else(|| parent.version.clone());
        }
        Some(Pom { coordinates, parent })
    }
}

/// Parse a pom, attaching its [`Pom`] marker.
///
/// A document whose root is not `<project>` parses as plain XML.
pub fn parse_pom(path: impl Into<PathBuf>, source: &str) -> Result<Arc<Document>, ParseError> {
    let document = parse(path, source)?;
    Ok(attach_pom(document))
}

/// Attach or refresh the [`Pom`] marker from the document's current content.
pub fn attach_pom(document: Arc<Document>) -> Arc<Document> {
    match Pom::from_document(&document) {
        Some(pom) => {
            let markers = document.markers.set(pom);
            document.with_markers(markers)
        }
        None => document,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pom_marker_reads_coordinates() {
        let doc = parse_pom(
            "pom.xml",
            "<project>\n  <parent><groupId>org.p</groupId><artifactId>p</artifactId><version>2</version></parent>\n  <artifactId>app</artifactId>\n</project>",
        )
        .unwrap();
        let pom = doc.markers.find_first::<Pom>().unwrap();
        assert_eq!(pom.coordinates.group_id.as_deref(), Some("org.p"));
        assert_eq!(pom.coordinates.artifact_id.as_deref(), Some("app"));
        assert_eq!(pom.coordinates.version.as_deref(), Some("2"));
        assert_eq!(pom.parent.as_ref().and_then(|p| p.artifact_id.as_deref()), Some("p"));
    }

    #[test]
    fn other_documents_are_not_poms() {
        let doc = parse_pom("settings.xml", "<settings/>").unwrap();
        assert!(doc.markers.find_first::<Pom>().is_none());
    }

    #[test]
    fn refreshing_an_unchanged_pom_keeps_the_document() {
        let doc = parse_pom("pom.xml", "<project><version>1</version></project>").unwrap();
        let again = attach_pom(Arc::clone(&doc));
        assert!(Arc::ptr_eq(&doc, &again));
    }
}
