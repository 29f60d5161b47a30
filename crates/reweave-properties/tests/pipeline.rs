// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Properties recipes run through a pipeline.

use std::sync::Arc;

use reweave_core::tree::downcast_source;
use reweave_core::{ExecutionContext, Pipeline, Recipe, RecipeOptions, SourceRef};
use reweave_properties::{parse, AddProperty, ChangePropertyKey, ChangePropertyValue, File};

fn source(path: &str, text: &str) -> SourceRef {
    parse(path, text).unwrap()
}

fn run(recipes: Vec<Arc<dyn Recipe>>, sources: Vec<SourceRef>) -> Vec<SourceRef> {
    let mut ctx = ExecutionContext::new();
    let result = Pipeline::new(recipes).run(sources, &mut ctx).unwrap();
    result.results.into_iter().map(|r| r.after).collect()
}

#[test]
fn rename_keeps_other_entries_by_reference() {
    let before = parse("app.properties", "a.b.c=1\nx.y=2\n").unwrap();
    let recipe: Arc<dyn Recipe> = Arc::new(ChangePropertyKey::new("a.b.c", "a.b.d").unwrap());
    let after = run(vec![recipe], vec![Arc::clone(&before) as SourceRef]);

    assert_eq!(after[0].print(), "a.b.d=1\nx.y=2\n");
    let after = downcast_source::<File>(Arc::clone(&after[0])).unwrap();
    assert!(Arc::ptr_eq(before.entry("x.y").unwrap(), after.entry("x.y").unwrap()));
}

#[test]
fn recipes_are_idempotent() {
    let recipes: Vec<Arc<dyn Recipe>> = vec![
        Arc::new(ChangePropertyKey::new("old", "new").unwrap()),
        Arc::new(ChangePropertyValue::new("new", "2", None).unwrap()),
        Arc::new(AddProperty::new("added", "yes").unwrap()),
    ];
    let once = run(recipes.clone(), vec![source("a.properties", "# c\nold = 1\n")]);
    assert_eq!(once[0].print(), "# c\nnew = 2\nadded=yes\n");

    let twice = run(recipes, once.clone());
    assert!(Arc::ptr_eq(&once[0], &twice[0]));
}

#[test]
fn registry_constructs_from_options() {
    let mut registry = reweave_core::RecipeRegistry::new();
    reweave_properties::recipes::register(&mut registry);
    let recipe = registry
        .build(
            "properties.ChangePropertyKey",
            &RecipeOptions::new()
                .with("oldPropertyKey", "a")
                .with("newPropertyKey", "b"),
        )
        .unwrap();
    assert_eq!(recipe.descriptor().to_string(), "properties.ChangePropertyKey(newPropertyKey=b, oldPropertyKey=a)");
    assert_eq!(registry.entries().count(), 3);
}
