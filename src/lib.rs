// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! reweave: structural, type-aware, format-preserving source transformation.
//!
//! The engine lives in `reweave-core`; the grammars and their recipes live
//! in `reweave-java`, `reweave-properties` and `reweave-xml`. This crate is
//! the front door: the recipe catalog, `reweave.toml` configuration, file
//! discovery, diff rendering and JSON output behind the `reweave` binary.

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod output;
pub mod registry;

pub use cli::{discover, parse_sources, run, RunRequest, SourceKind};
pub use config::{ReweaveConfig, CONFIG_FILE_NAME};
pub use error::{OutputErrorCode, ReweaveError};
pub use registry::registry;

