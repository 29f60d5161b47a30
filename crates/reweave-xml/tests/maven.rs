// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Maven recipes run through a pipeline.

use std::sync::Arc;

use reweave_core::tree::downcast_source;
use reweave_core::{ExecutionContext, Pipeline, Recipe, RecipeOptions, SourceRef};
use reweave_xml::maven::Coordinates;
use reweave_xml::{parse, parse_pom, ChangeParentVersion, ChangeTagValue, Document, Pom};

const BEFORE: &str = r#"<project>
  <modelVersion>4.0.0</modelVersion>
  
  <groupId>com.mycompany.app</groupId>
  <artifactId>my-app</artifactId>
  <version>1</version>
  
  <parent>
    <groupId>org.springframework.boot</groupId>
    <artifactId>spring-boot-starter-parent</artifactId>
    <version>1.5.12.RELEASE</version>
    <relativePath/> <!-- lookup parent from repository -->
  </parent>
</project>
"#;

fn run(recipe: Arc<dyn Recipe>, source: SourceRef) -> SourceRef {
    let mut ctx = ExecutionContext::new();
    let mut result = Pipeline::new([recipe]).run(vec![source], &mut ctx).unwrap();
    result.results.remove(0).after
}

#[test]
fn fixed_version() {
    let recipe = Arc::new(
        ChangeParentVersion::new("org.springframework.boot", "spring-boot-starter-parent", "2.3.1.RELEASE").unwrap(),
    );
    let after = run(recipe, parse_pom("pom.xml", BEFORE).unwrap());
    assert_eq!(after.print(), BEFORE.replace("1.5.12.RELEASE", "2.3.1.RELEASE"));

    let document = downcast_source::<Document>(after).unwrap();
    let pom = document.markers.find_first::<Pom>().unwrap();
    assert_eq!(
        pom.parent,
        Some(Coordinates {
            group_id: Some("org.springframework.boot".to_string()),
            artifact_id: Some("spring-boot-starter-parent".to_string()),
            version: Some("2.3.1.RELEASE".to_string()),
        })
    );
}

#[test]
fn other_parents_are_untouched() {
    let recipe = Arc::new(ChangeParentVersion::new("org.other", "spring-boot-starter-parent", "9").unwrap());
    let before: SourceRef = parse_pom("pom.xml", BEFORE).unwrap();
    let after = run(recipe, Arc::clone(&before));
    assert!(reweave_core::tree::same_source(&before, &after));
}

#[test]
fn plain_xml_is_not_a_pom() {
    let recipe = Arc::new(
        ChangeParentVersion::new("org.springframework.boot", "spring-boot-starter-parent", "2.3.1.RELEASE").unwrap(),
    );
    let before: SourceRef = parse("pom.xml", BEFORE).unwrap();
    let after = run(recipe, Arc::clone(&before));
    assert!(reweave_core::tree::same_source(&before, &after));
}

#[test]
fn registry_and_tag_value() {
    let mut registry = reweave_core::RecipeRegistry::new();
    reweave_xml::recipes::register(&mut registry);
    let recipe = registry
        .build(
            "xml.ChangeTagValue",
            &RecipeOptions::new()
                .with("elementPath", "/project/version")
                .with("newValue", "2"),
        )
        .unwrap();
    let after = run(recipe, parse_pom("pom.xml", BEFORE).unwrap());
    assert!(after.print().contains("<artifactId>my-app</artifactId>\n  <version>2</version>"));
    assert!(after.print().contains("<version>1.5.12.RELEASE</version>"));
    assert!(registry.get("maven.ChangeParentVersion").is_some());
}

#[test]
fn change_tag_value_rejects_missing_options() {
    assert!(ChangeTagValue::from_options(&RecipeOptions::new().with("newValue", "x")).is_err());
}
