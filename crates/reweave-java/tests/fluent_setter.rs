// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `java.ChangeNonFluentSetterToFluentSetter` end to end.

use std::sync::Arc;

use reweave_core::text::trim_indent;
use reweave_core::{ConstructionError, ExecutionContext, Pipeline, Recipe, RecipeOptions, SourceRef};
use reweave_java::{ChangeNonFluentSetterToFluentSetter, JavaParser};

fn recipe() -> Arc<dyn Recipe> {
    Arc::new(ChangeNonFluentSetterToFluentSetter::new("org.A").unwrap())
}

/// Run the recipe over `before`, with `depends_on` parsed alongside for
/// type attribution.
fn run(depends_on: &[&str], before: &str) -> (SourceRef, String) {
    let parser = JavaParser::new().depends_on(depends_on.iter().map(|s| trim_indent(s)));
    let unit: SourceRef = parser.parse("Test.java", &trim_indent(before)).unwrap();
    let mut ctx = ExecutionContext::new();
    let result = Pipeline::new(vec![recipe()]).run(vec![unit], &mut ctx).unwrap();
    let after = Arc::clone(&result.results[0].after);
    let printed = after.print();
    (after, printed)
}

fn assert_changed(depends_on: &[&str], before: &str, after: &str) {
    let (_, printed) = run(depends_on, before);
    assert_eq!(printed, trim_indent(after));
}

fn assert_unchanged(depends_on: &[&str], before: &str) {
    let (_, printed) = run(depends_on, before);
    assert_eq!(printed, trim_indent(before));
}

#[test]
fn empty_setter_is_unchanged() {
    assert_unchanged(
        &[],
        r#"
            package org;

            public class A {
                private String foo;

                public void setFoo(String value) {
                }
            }
        "#,
    );
}

#[test]
fn setter_with_a_return_type_is_unchanged() {
    assert_unchanged(
        &[],
        r#"
            package org;

            public class A {
                private String foo;

                public String setFoo(String value) {
                    foo = value;
                    return foo;
                }
            }
        "#,
    );
}

#[test]
fn fluent_setter_is_unchanged() {
    assert_unchanged(
        &[],
        r#"
            package org;

            public class A {
                private String foo;

                public A setFoo(String value) {
                    foo = value;
                    return this;
                }
            }
        "#,
    );
}

#[test]
fn non_fluent_setter_becomes_fluent() {
    assert_changed(
        &[],
        r#"
            package org;

            public class A {
                private String foo;
                private String bar;

                public void setFoo(String value) {
                    foo = value;
                }
            }
        "#,
        r#"
            package org;

            public class A {
                private String foo;
                private String bar;

                public A setFoo(String value) {
                    foo = value;
                    return this;
                }
            }
        "#,
    );
}

#[test]
fn fluent_setter_keeps_blank_lines_in_the_body() {
    assert_changed(
        &[],
        r#"
            package org;

            public class A {
                private String foo;
                private String bar;

                public void setFoo(String value) {

                    foo = value;

                }
            }
        "#,
        r#"
            package org;

            public class A {
                private String foo;
                private String bar;

                public A setFoo(String value) {

                    foo = value;
                    return this;

                }
            }
        "#,
    );
}

#[test]
fn field_access_assignments_qualify() {
    assert_changed(
        &[],
        r#"
            package org;

            public class A {
                private String foo;
                private String bar;

                public void setFoo(String foo) {
                    this.foo = foo;
                }
            }
        "#,
        r#"
            package org;

            public class A {
                private String foo;
                private String bar;

                public A setFoo(String foo) {
                    this.foo = foo;
                    return this;
                }
            }
        "#,
    );
}

#[test]
fn two_statement_setter_is_unchanged() {
    assert_unchanged(
        &[],
        r#"
            package org;

            public class A {
                private String foo;
                private int count;

                public void setFoo(String value) {
                    foo = value;
                    count = 1;
                }
            }
        "#,
    );
}

#[test]
fn setters_of_other_classes_are_unchanged() {
    assert_unchanged(
        &[],
        r#"
            package org;

            public class B {
                private String foo;

                public void setFoo(String value) {
                    foo = value;
                }
            }
        "#,
    );
}

const C: &str = r#"
    package org;

    public class C {
        private String foo;
        private String bar;

        public C setFoo(String value) {
            foo = value;
            return this;
        }

        public C setBar(String value) {
            bar = value;
            return this;
        }
    }
"#;

#[test]
fn chains_of_another_class_are_unchanged() {
    assert_unchanged(
        &[C],
        r#"
            package org.packageB;

            import org.C;

            public class B {

                public void testC1() {
                    C c = new C();
                    c.setFoo("foo");
                    c.setBar("bar");
                }
            }
        "#,
    );
}

const A_MIXED: &str = r#"
    package org;

    public class A {
        private String foo;
        private String bar;
        private String baz;
        private String qux;
        private String quuz;

        public A setFoo(String value) {
            foo = value;
            return this;
        }

        public A setBar(String value) {
            bar = value;
            return this;
        }

        public void setBaz(String value) {
            baz = value;
        }

        public A setQux(String value) {
            qux = value;
            return this;
        }

        public A setQuuz(String value) {
            quuz = value;
            return this;
        }
    }
"#;

#[test]
fn only_runs_of_fluent_calls_are_chained() {
    assert_changed(
        &[A_MIXED],
        r#"
            package org.packageB;

            import org.A;

            public class B {

                public A testA1() {
                    A a = new A();
                    a.setFoo("foo");
                    String bar = "bar";
                    a.setBar(bar);

                    a.setBaz("baz");
                    a.setQux("qux");
                    a.setQux("quuz");
                    return a;
                }
            }
        "#,
        r#"
            package org.packageB;

            import org.A;

            public class B {

                public A testA1() {
                    A a = new A();
                    a.setFoo("foo");
                    String bar = "bar";
                    a.setBar(bar);

                    a.setBaz("baz");
                    a.setQux("qux")
                            .setQux("quuz");
                    return a;
                }
            }
        "#,
    );
}

const A_FLUENT: &str = r#"
    package org;

    public class A {
        private String foo;
        private String bar;
        private String buz;

        public A setFoo(String value) {
            foo = value;
            return this;
        }

        public A setBar(String value) {
            bar = value;
            return this;
        }

        public A setBuz(String value) {
            buz = value;
            return this;
        }
    }
"#;

#[test]
fn run_at_the_end_of_a_block_is_chained() {
    assert_changed(
        &[A_FLUENT],
        r#"
            package org.packageB;

            import org.A;

            public class B {

                public void testA1() {
                    A a = new A();
                    a.setFoo("foo");
                    a.setBar("bar");
                    a.setBuz("buz");
                }
            }
        "#,
        r#"
            package org.packageB;

            import org.A;

            public class B {

                public void testA1() {
                    A a = new A();
                    a.setFoo("foo")
                            .setBar("bar")
                            .setBuz("buz");
                }
            }
        "#,
    );
}

#[test]
fn calls_on_different_receivers_are_not_chained() {
    assert_unchanged(
        &[A_FLUENT],
        r#"
            package org.packageB;

            import org.A;

            public class B {

                public void testA1() {
                    A a = new A();
                    A b = new A();
                    a.setFoo("foo");
                    b.setBar("bar");
                }
            }
        "#,
    );
}

#[test]
fn running_twice_changes_nothing_more() {
    let before = r#"
        package org.packageB;

        import org.A;

        public class B {

            public void testA1() {
                A a = new A();
                a.setFoo("foo");
                a.setBar("bar");
                a.setBuz("buz");
            }
        }
    "#;
    let (_, once) = run(&[A_FLUENT], before);
    let (after, twice) = run(&[A_FLUENT], &once);
    assert_eq!(once, twice);

    let mut ctx = ExecutionContext::new();
    let result = Pipeline::new(vec![recipe()]).run(vec![Arc::clone(&after)], &mut ctx).unwrap();
    assert!(!result.results[0].is_changed());
}

#[test]
fn setter_and_caller_in_one_run() {
    let a = trim_indent(
        r#"
            package org;

            public class A {
                private String foo;
                private String bar;

                public void setFoo(String value) {
                    foo = value;
                }

                public void setBar(String value) {
                    bar = value;
                }
            }
        "#,
    );
    let b = trim_indent(
        r#"
            package org;

            public class B {
                void configure(A a) {
                    a.setFoo("foo");
                    a.setBar("bar");
                }
            }
        "#,
    );
    let units = JavaParser::new()
        .parse_all(vec![("A.java".into(), a), ("B.java".into(), b.clone())])
        .unwrap();
    let sources: Vec<SourceRef> = units.into_iter().map(|u| u as SourceRef).collect();
    let mut ctx = ExecutionContext::new();
    let result = Pipeline::new(vec![recipe()]).run(sources, &mut ctx).unwrap();

    assert!(result.results[0].after.print().contains("public A setFoo(String value) {"));
    // The caller was attributed against the void setters.
    assert_eq!(result.results[1].after.print(), b);
}

#[test]
fn target_type_is_required() {
    let err = ChangeNonFluentSetterToFluentSetter::from_options(&RecipeOptions::new()).unwrap_err();
    assert_eq!(
        err,
        ConstructionError::MissingOptions {
            recipe: "java.ChangeNonFluentSetterToFluentSetter".to_string(),
            options: vec!["fullyQualifiedTargetTypeName".to_string()],
        }
    );
    assert!(ChangeNonFluentSetterToFluentSetter::new("  ").is_err());
}

#[test]
fn registry_builds_the_recipe() {
    let mut registry = reweave_core::RecipeRegistry::new();
    reweave_java::recipes::register(&mut registry);
    let built = registry
        .build(
            "java.ChangeNonFluentSetterToFluentSetter",
            &RecipeOptions::new().with("fullyQualifiedTargetTypeName", "org.A"),
        )
        .unwrap();
    assert_eq!(built.descriptor(), recipe().descriptor());
}
