// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recipes over XML documents.

mod change_tag_value;

pub use change_tag_value::ChangeTagValue;

use reweave_core::RecipeRegistry;

/// Register every XML and Maven recipe.
pub fn register(registry: &mut RecipeRegistry) {
    registry.register(ChangeTagValue::entry());
    registry.register(crate::maven::ChangeParentVersion::entry());
}
