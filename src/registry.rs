// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The recipes the CLI knows by name.

use reweave_core::RecipeRegistry;

/// Every shipped recipe, across all grammars.
pub fn registry() -> RecipeRegistry {
    let mut registry = RecipeRegistry::new();
    reweave_java::recipes::register(&mut registry);
    reweave_properties::recipes::register(&mut registry);
    reweave_xml::recipes::register(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_grammars_are_registered() {
        let names: Vec<&str> = registry().entries().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec![
                "java.ChangeNonFluentSetterToFluentSetter",
                "maven.ChangeParentVersion",
                "properties.AddProperty",
                "properties.ChangePropertyKey",
                "properties.ChangePropertyValue",
                "xml.ChangeTagValue",
            ]
        );
    }
}
