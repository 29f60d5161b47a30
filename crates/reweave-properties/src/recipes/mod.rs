// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recipes over properties files.

mod add_property;
mod change_property_key;
mod change_property_value;

pub use add_property::AddProperty;
pub use change_property_key::ChangePropertyKey;
pub use change_property_value::ChangePropertyValue;

use reweave_core::RecipeRegistry;

/// Register every properties recipe.
pub fn register(registry: &mut RecipeRegistry) {
    registry.register(ChangePropertyKey::entry());
    registry.register(ChangePropertyValue::entry());
    registry.register(AddProperty::entry());
}
