// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `reweave run` over real directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reweave::cli::{run, RunRequest};
use reweave::error::{OutputErrorCode, ReweaveError};
use reweave::registry;
use tempfile::TempDir;

const POM: &str = r#"<project>
  <groupId>com.mycompany.app</groupId>
  <artifactId>my-app</artifactId>
  <version>1</version>

  <parent>
    <groupId>org.springframework.boot</groupId>
    <artifactId>spring-boot-starter-parent</artifactId>
    <version>1.5.12.RELEASE</version>
  </parent>
</project>
"#;

const A: &str = "package org;\n\npublic class A {\n    private String foo;\n    private String bar;\n\n    public void setFoo(String value) {\n        foo = value;\n    }\n\n    public void setBar(String value) {\n        bar = value;\n    }\n}\n";

const B: &str = "package org;\n\npublic class B {\n    void configure(A a) {\n        a.setFoo(\"foo\");\n        a.setBar(\"bar\");\n    }\n}\n";

fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

fn request(dir: &Path, recipe: &str, options: &[(&str, &str)]) -> RunRequest {
    RunRequest {
        paths: vec![dir.to_path_buf()],
        recipe: Some(recipe.to_string()),
        options: options.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        ..RunRequest::default()
    }
}

#[test]
fn preview_reports_a_diff_and_leaves_files_alone() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "conf/app.properties", "a.b.c=1\nx.y=2\n");
    let req = request(
        tmp.path(),
        "properties.ChangePropertyKey",
        &[("oldPropertyKey", "a.b.c"), ("newPropertyKey", "a.b.d")],
    );

    let response = run(&req, tmp.path(), &registry()).unwrap();
    assert_eq!(response.summary.files_scanned, 1);
    assert_eq!(response.summary.files_changed, 1);
    assert!(!response.applied);
    let file = &response.files[0];
    assert_eq!(file.language, "properties");
    assert_eq!(file.changed_by, vec!["properties.ChangePropertyKey"]);
    assert!(file.diff.contains("-a.b.c=1\n+a.b.d=1\n"));
    assert_eq!(fs::read_to_string(path).unwrap(), "a.b.c=1\nx.y=2\n");
}

#[test]
fn apply_writes_changed_files_only() {
    let tmp = TempDir::new().unwrap();
    let pom = write(tmp.path(), "pom.xml", POM);
    let other = write(tmp.path(), "module/settings.xml", "<settings><version>1</version></settings>\n");
    let mut req = request(
        tmp.path(),
        "maven.ChangeParentVersion",
        &[
            ("groupId", "org.springframework.boot"),
            ("artifactId", "spring-boot-starter-parent"),
            ("newVersion", "2.3.1.RELEASE"),
        ],
    );
    req.apply = true;

    let response = run(&req, tmp.path(), &registry()).unwrap();
    assert_eq!(response.summary.files_scanned, 2);
    assert_eq!(response.summary.files_changed, 1);
    assert_eq!(
        fs::read_to_string(pom).unwrap(),
        POM.replace("1.5.12.RELEASE", "2.3.1.RELEASE")
    );
    assert_eq!(
        fs::read_to_string(other).unwrap(),
        "<settings><version>1</version></settings>\n"
    );
}

#[test]
fn java_files_are_attributed_together() {
    let tmp = TempDir::new().unwrap();
    let a = write(tmp.path(), "src/org/A.java", A);
    let b = write(tmp.path(), "src/org/B.java", B);
    let mut req = request(
        tmp.path(),
        "java.ChangeNonFluentSetterToFluentSetter",
        &[("fullyQualifiedTargetTypeName", "org.A")],
    );
    req.apply = true;

    let response = run(&req, tmp.path(), &registry()).unwrap();
    assert_eq!(response.summary.files_changed, 1);
    let after = fs::read_to_string(a).unwrap();
    assert!(after.contains("public A setFoo(String value) {\n        foo = value;\n        return this;\n    }"));
    assert!(after.contains("public A setBar(String value) {"));
    // Calls in B were attributed against the setters as they were parsed.
    assert_eq!(fs::read_to_string(b).unwrap(), B);
}

#[test]
fn configured_pipeline_runs_when_no_recipe_is_given() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "app.properties", "old=1\n");
    write(
        tmp.path(),
        "reweave.toml",
        r#"
[[pipeline]]
recipe = "properties.ChangePropertyKey"
options = { oldPropertyKey = "old", newPropertyKey = "new" }

[[pipeline]]
recipe = "properties.AddProperty"
options = { property = "added", value = "yes" }
"#,
    );
    let req = RunRequest {
        paths: vec![tmp.path().join("app.properties")],
        ..RunRequest::default()
    };

    let response = run(&req, tmp.path(), &registry()).unwrap();
    assert_eq!(response.recipes.len(), 2);
    let file = &response.files[0];
    assert_eq!(file.changed_by, vec!["properties.ChangePropertyKey", "properties.AddProperty"]);
    assert!(file.diff.contains("+new=1\n"));
    assert!(file.diff.contains("+added=yes\n"));
}

#[test]
fn style_from_config_sets_the_chain_continuation() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "A.java",
        "package org;\n\npublic class A {\n  private String foo;\n  private String bar;\n\n  public A setFoo(String value) {\n    foo = value;\n    return this;\n  }\n\n  public A setBar(String value) {\n    bar = value;\n    return this;\n  }\n}\n",
    );
    let b = write(
        tmp.path(),
        "B.java",
        "package org;\n\npublic class B {\n  void configure(A a) {\n    a.setFoo(\"foo\");\n    a.setBar(\"bar\");\n  }\n}\n",
    );
    let config = write(
        tmp.path(),
        "style.toml",
        "[style.tabs_and_indents]\nindent_size = 2\ncontinuation_indent_size = 4\n",
    );
    let mut req = request(
        tmp.path(),
        "java.ChangeNonFluentSetterToFluentSetter",
        &[("fullyQualifiedTargetTypeName", "org.A")],
    );
    req.config = Some(config);
    req.apply = true;

    run(&req, tmp.path(), &registry()).unwrap();
    assert_eq!(
        fs::read_to_string(b).unwrap(),
        "package org;\n\npublic class B {\n  void configure(A a) {\n    a.setFoo(\"foo\")\n        .setBar(\"bar\");\n  }\n}\n"
    );
}

#[test]
fn unknown_recipes_are_invalid_arguments() {
    let tmp = TempDir::new().unwrap();
    let err = run(&request(tmp.path(), "nope.Nothing", &[]), tmp.path(), &registry()).unwrap_err();
    assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InvalidArguments);
    assert_eq!(err.to_string(), "unknown recipe: nope.Nothing");
}

#[test]
fn missing_options_are_listed_before_any_file_is_read() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "Broken.java", "class Broken {");
    let err = run(&request(tmp.path(), "maven.ChangeParentVersion", &[]), tmp.path(), &registry()).unwrap_err();
    assert!(matches!(err, ReweaveError::Construction(_)));
    assert_eq!(
        err.to_string(),
        "recipe maven.ChangeParentVersion is missing required options: artifactId, groupId, newVersion"
    );
}

#[test]
fn broken_config_names_the_file() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "reweave.toml", "[[pipeline]\n");
    let req = RunRequest {
        paths: vec![tmp.path().to_path_buf()],
        ..RunRequest::default()
    };
    let err = run(&req, tmp.path(), &registry()).unwrap_err();
    assert!(err.to_string().contains("reweave.toml"), "{}", err);
    assert_eq!(OutputErrorCode::from(&err).code(), 2);
}

#[test]
fn generous_deadline_completes() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.properties", "k=v\n");
    let mut req = request(
        tmp.path(),
        "properties.ChangePropertyValue",
        &[("propertyKey", "k"), ("newValue", "w")],
    );
    req.deadline = Some(Duration::from_secs(60));

    let response = run(&req, tmp.path(), &registry()).unwrap();
    assert!(!response.cancelled);
    assert_eq!(response.summary.files_changed, 1);
}
