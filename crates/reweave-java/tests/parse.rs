// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parsing and attribution through the public API.

use std::path::PathBuf;
use std::sync::Arc;

use reweave_core::tree::downcast_source;
use reweave_core::typing::{is_assignable_to, Type};
use reweave_core::{Checksum, SourceRef};
use reweave_java::{CompilationUnit, JavaParser, JavaSourceSet, Statement};

const ANIMAL: &str = "package zoo;\n\npublic abstract class Animal implements Comparable<Animal> {\n    protected String name;\n\n    public abstract int legs();\n}\n";

const DOG: &str = "package zoo.pets;\n\nimport zoo.Animal;\nimport java.util.*;\n\npublic class Dog extends Animal {\n    private List<Dog> friends = new ArrayList<>();\n\n    public int legs() {\n        return 4;\n    }\n\n    public Dog befriend(Dog other) {\n        friends.add(other);\n        String greeting = \"hi \" + other.name;\n        return this;\n    }\n}\n";

fn parse_zoo() -> Vec<Arc<CompilationUnit>> {
    JavaParser::new()
        .parse_all(vec![
            (PathBuf::from("zoo/Animal.java"), ANIMAL.to_string()),
            (PathBuf::from("zoo/pets/Dog.java"), DOG.to_string()),
        ])
        .unwrap()
}

#[test]
fn units_print_back_to_their_source() {
    let units = parse_zoo();
    let sources: Vec<SourceRef> = units.into_iter().map(|u| u as SourceRef).collect();
    assert_eq!(sources[0].print(), ANIMAL);
    assert_eq!(sources[1].print(), DOG);
    assert_eq!(sources[1].language(), "java");
    assert_eq!(sources[1].source_path(), PathBuf::from("zoo/pets/Dog.java").as_path());
    assert!(sources[1].markers().find_first::<Checksum>().is_some());

    let dog = downcast_source::<CompilationUnit>(Arc::clone(&sources[1])).unwrap();
    assert_eq!(dog.package_name().as_deref(), Some("zoo.pets"));
}

#[test]
fn units_parsed_together_share_one_type_table() {
    let units = parse_zoo();
    let a = JavaSourceSet::of(&units[0]).unwrap();
    let b = JavaSourceSet::of(&units[1]).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(a.class("zoo.Animal").is_some());
    assert!(a.class("zoo.pets.Dog").is_some());
}

#[test]
fn declared_hierarchy_is_visible_to_matchers() {
    let units = parse_zoo();
    let dog = units[1].classes[0].ty.clone();
    assert!(is_assignable_to("zoo.Animal", dog.as_ref()));
    assert!(is_assignable_to("java.lang.Comparable", dog.as_ref()));
    assert!(!is_assignable_to("zoo.pets.Cat", dog.as_ref()));
}

#[test]
fn expressions_are_attributed_across_units() {
    let units = parse_zoo();
    let befriend = units[1].classes[0]
        .methods()
        .find(|m| m.name.name == "befriend")
        .unwrap();
    let statements: Vec<&Statement> = befriend.body.as_ref().unwrap().statements().collect();

    let add = statements[0].as_method_invocation().unwrap();
    let receiver = add.select().unwrap().ty().unwrap();
    assert_eq!(receiver.fully_qualified_name(), Some("java.util.List"));

    let Statement::VariableDeclarations(greeting) = statements[1] else {
        panic!("expected a declaration");
    };
    let initializer = &greeting.variables().next().unwrap().initializer.as_ref().unwrap().element;
    assert_eq!(initializer.ty().as_ref().and_then(Type::fully_qualified_name), Some("java.lang.String"));

    let method_type = befriend.method_type.as_ref().unwrap();
    assert_eq!(method_type.return_type.fully_qualified_name(), Some("zoo.pets.Dog"));
}

#[test]
fn dependencies_are_attributed_but_not_returned() {
    let units = JavaParser::new()
        .depends_on([ANIMAL])
        .parse_all(vec![(PathBuf::from("Dog.java"), DOG.to_string())])
        .unwrap();
    assert_eq!(units.len(), 1);
    let dog = units[0].classes[0].ty.as_ref().and_then(Type::as_class).unwrap();
    assert_eq!(
        dog.super_type.as_ref().map(|s| s.fully_qualified_name.as_str()),
        Some("zoo.Animal")
    );
}

#[test]
fn syntax_errors_name_the_file() {
    let err = JavaParser::new().parse("Broken.java", "class Broken {").unwrap_err();
    assert_eq!(err.path, "Broken.java");
    assert_eq!(err.line, 1);
}
