// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recipes over Java sources.

mod change_non_fluent_setter;

pub use change_non_fluent_setter::ChangeNonFluentSetterToFluentSetter;

use reweave_core::RecipeRegistry;

/// Register every Java recipe.
pub fn register(registry: &mut RecipeRegistry) {
    registry.register(ChangeNonFluentSetterToFluentSetter::entry());
}
