// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! XML and Maven support for reweave.
//!
//! - [`parse`]: lossless parser attaching position and checksum markers
//! - [`tree`]: node types and the [`Xml`] node sum
//! - [`visitor`]: rewriting and accumulating visitors, [`enclosing_tag`]
//! - [`path`]: tag path matching for recipes
//! - [`recipes`]: `ChangeTagValue`
//! - [`maven`]: the `Pom` marker, [`parse_pom`] and `ChangeParentVersion`

pub mod maven;
pub mod parser;
pub mod path;
pub mod print;
pub mod recipes;
pub mod tree;
pub mod visitor;

pub use maven::{parse_pom, ChangeParentVersion, Pom};
pub use parser::parse;
pub use path::TagPathMatcher;
pub use recipes::ChangeTagValue;
pub use tree::{Attribute, CharData, Comment, Content, Document, Tag, Xml};
pub use visitor::{enclosing_tag, XmlSourceVisitor, XmlTreeVisitor, XmlVisitor};
