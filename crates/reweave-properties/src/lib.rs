// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `.properties` support for reweave.
//!
//! - [`parse`]: lossless parser attaching position and checksum markers
//! - [`tree`]: node types and the [`Properties`] node sum
//! - [`visitor`]: rewriting and accumulating visitors
//! - [`template`]: snippet insertion of new lines
//! - [`recipes`]: `ChangePropertyKey`, `ChangePropertyValue`, `AddProperty`

pub mod parser;
pub mod print;
pub mod recipes;
pub mod template;
pub mod tree;
pub mod visitor;

pub use parser::{parse, parse_fragment};
pub use recipes::{AddProperty, ChangePropertyKey, ChangePropertyValue};
pub use template::PropertiesTemplateLanguage;
pub use tree::{Comment, Content, Delimiter, Entry, File, Properties, Value};
pub use visitor::{PropertiesSourceVisitor, PropertiesTreeVisitor, PropertiesVisitor};
