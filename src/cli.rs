// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Command implementations behind the `reweave` binary.
//!
//! The binary parses arguments and renders output; everything between (file
//! discovery, parsing, recipe construction, the pipeline run, writing files
//! back) lives here so it can be driven from tests.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reweave_core::{
    CancellationFlag, ExecutionContext, Pipeline, Recipe, RecipeOptions, RecipeRegistry, Severity, SourceRef,
};
use reweave_java::JavaParser;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ReweaveConfig;
use crate::diff::unified_diff;
use crate::error::ReweaveError;
use crate::output::{FileChange, RecipesResponse, RunResponse, Summary, SCHEMA_VERSION};

// ============================================================================
// Discovery
// ============================================================================

/// Grammar a discovered file is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Java,
    Properties,
    Xml,
    /// An XML file named `pom.xml`, parsed with its Maven model attached.
    Pom,
}

impl SourceKind {
    pub fn of(path: &Path) -> Option<SourceKind> {
        let extension = path.extension()?.to_str()?;
        match extension {
            "java" => Some(SourceKind::Java),
            "properties" => Some(SourceKind::Properties),
            "xml" if path.file_name().is_some_and(|name| name == "pom.xml") => Some(SourceKind::Pom),
            "xml" => Some(SourceKind::Xml),
            _ => None,
        }
    }
}

/// Files under `paths` that some grammar can parse, in path order.
///
/// Hidden directories and `target` directories are skipped. A path that
/// names a file is taken as long as its kind is known.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<(PathBuf, SourceKind)>, ReweaveError> {
    let mut files = Vec::new();
    for root in paths {
        if !root.exists() {
            return Err(ReweaveError::invalid_arguments(format!(
                "path not found: {}",
                root.display()
            )));
        }
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                match e.into_io_error() {
                    Some(io) => ReweaveError::io(path, io),
                    None => ReweaveError::invalid_arguments(format!("cannot walk {}", path.display())),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(kind) = SourceKind::of(entry.path()) {
                files.push((entry.into_path(), kind));
            }
        }
    }
    files.dedup_by(|a, b| a.0 == b.0);
    debug!(count = files.len(), "discovered source files");
    Ok(files)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name == "target")
}

/// Read and parse `files`. Java files are parsed together so each sees the
/// declarations of the others.
pub fn parse_sources(files: &[(PathBuf, SourceKind)]) -> Result<Vec<SourceRef>, ReweaveError> {
    let mut parsed: Vec<Option<SourceRef>> = vec![None; files.len()];
    let mut java_slots = Vec::new();
    let mut java_sources = Vec::new();

    for (slot, (path, kind)) in files.iter().enumerate() {
        let text = fs::read_to_string(path).map_err(|e| ReweaveError::io(path, e))?;
        let source: SourceRef = match kind {
            SourceKind::Java => {
                java_slots.push(slot);
                java_sources.push((path.clone(), text));
                continue;
            }
            SourceKind::Properties => reweave_properties::parse(path.clone(), &text)? as SourceRef,
            SourceKind::Xml => reweave_xml::parse(path.clone(), &text)? as SourceRef,
            SourceKind::Pom => reweave_xml::parse_pom(path.clone(), &text)? as SourceRef,
        };
        parsed[slot] = Some(source);
    }

    if !java_sources.is_empty() {
        let units = JavaParser::new().parse_all(java_sources)?;
        for (slot, unit) in java_slots.into_iter().zip(units) {
            parsed[slot] = Some(unit as SourceRef);
        }
    }

    parsed
        .into_iter()
        .map(|source| source.ok_or_else(|| ReweaveError::internal("a discovered file was not parsed")))
        .collect()
}

// ============================================================================
// Run
// ============================================================================

/// Inputs of `reweave run`.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub paths: Vec<PathBuf>,
    /// Run this recipe instead of the configured pipeline.
    pub recipe: Option<String>,
    pub options: Vec<(String, String)>,
    pub config: Option<PathBuf>,
    /// Write changed files back.
    pub apply: bool,
    pub deadline: Option<Duration>,
}

/// Recipes named on the command line, or else the configured pipeline.
pub fn resolve_recipes(
    request: &RunRequest,
    config: &ReweaveConfig,
    registry: &RecipeRegistry,
) -> Result<Vec<Arc<dyn Recipe>>, ReweaveError> {
    let recipes = match &request.recipe {
        Some(name) => {
            let options: RecipeOptions = request.options.iter().cloned().collect();
            vec![registry.build(name, &options)?]
        }
        None if !request.options.is_empty() => {
            return Err(ReweaveError::invalid_arguments("--option requires --recipe"));
        }
        None => config.recipes(registry)?,
    };
    if recipes.is_empty() {
        return Err(ReweaveError::invalid_arguments(
            "no recipe to run: pass --recipe or list a [[pipeline]] in reweave.toml",
        ));
    }
    Ok(recipes)
}

/// Run the requested recipes over the files under `request.paths`.
///
/// `dir` is where `reweave.toml` is looked up when no config is given.
pub fn run(request: &RunRequest, dir: &Path, registry: &RecipeRegistry) -> Result<RunResponse, ReweaveError> {
    let config = ReweaveConfig::load(request.config.as_deref(), dir)?;
    let recipes = resolve_recipes(request, &config, registry)?;
    if request.paths.is_empty() {
        return Err(ReweaveError::invalid_arguments("no paths given"));
    }

    let files = discover(&request.paths)?;
    let sources = parse_sources(&files)?;
    let pipeline = Pipeline::new(recipes);
    let descriptors: Vec<String> = pipeline.recipes().iter().map(|r| r.descriptor().to_string()).collect();
    info!(files = sources.len(), recipes = ?descriptors, "running pipeline");

    let cancellation = CancellationFlag::new();
    if let Some(deadline) = request.deadline {
        start_deadline(deadline, cancellation.clone());
    }
    let mut ctx = ExecutionContext::new()
        .with_styles(config.style.clone())
        .with_cancellation(cancellation);

    let result = pipeline.run(sources, &mut ctx)?;
    if result.cancelled {
        warn!("deadline reached, reporting partial results");
    }

    let mut changes = Vec::new();
    for source in result.changed() {
        let path = source.after.source_path().to_path_buf();
        let after = source.after.print();
        let diff = unified_diff(&path, &source.before.print(), &after);
        if request.apply {
            fs::write(&path, &after).map_err(|e| ReweaveError::io(&path, e))?;
            debug!(path = %path.display(), "wrote changes");
        }
        changes.push(FileChange {
            path: path.to_string_lossy().into_owned(),
            language: source.after.language().to_string(),
            changed_by: source.changed_by.clone(),
            diff,
        });
    }

    let diagnostics = ctx.take_diagnostics();
    for diagnostic in &diagnostics {
        match diagnostic.severity {
            Severity::Info => debug!(%diagnostic),
            Severity::Warning | Severity::Error => warn!(%diagnostic),
        }
    }

    let summary = Summary {
        files_scanned: result.results.len(),
        files_changed: changes.len(),
        diagnostics: diagnostics.len(),
    };
    Ok(RunResponse {
        status: "ok".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        applied: request.apply,
        cancelled: result.cancelled,
        recipes: descriptors,
        files: changes,
        diagnostics,
        summary,
    })
}

/// Cancel the run once `deadline` has passed.
fn start_deadline(deadline: Duration, cancellation: CancellationFlag) {
    thread::spawn(move || {
        thread::sleep(deadline);
        cancellation.cancel();
    });
}

// ============================================================================
// Text rendering
// ============================================================================

/// Diffs of changed files, then diagnostics and a one-line summary.
pub fn render_run_text(response: &RunResponse) -> String {
    let mut out = String::new();
    for file in &response.files {
        out.push_str(&file.diff);
    }
    for diagnostic in &response.diagnostics {
        let severity = match diagnostic.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        let _ = writeln!(out, "{}: {}", severity, diagnostic);
    }
    let verb = if response.applied { "changed" } else { "would change" };
    let _ = writeln!(
        out,
        "{} {} of {} files{}",
        verb,
        response.summary.files_changed,
        response.summary.files_scanned,
        if response.cancelled { " (stopped at deadline)" } else { "" }
    );
    out
}

pub fn render_recipes_text(response: &RecipesResponse) -> String {
    let mut out = String::new();
    for recipe in &response.recipes {
        let _ = writeln!(out, "{}", recipe.name);
        let _ = writeln!(out, "    {}", recipe.description);
        if !recipe.options.is_empty() {
            let _ = writeln!(out, "    options: {}", recipe.options.join(", "));
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::registry;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn kinds_come_from_the_file_name() {
        assert_eq!(SourceKind::of(Path::new("src/A.java")), Some(SourceKind::Java));
        assert_eq!(SourceKind::of(Path::new("app.properties")), Some(SourceKind::Properties));
        assert_eq!(SourceKind::of(Path::new("module/pom.xml")), Some(SourceKind::Pom));
        assert_eq!(SourceKind::of(Path::new("web.xml")), Some(SourceKind::Xml));
        assert_eq!(SourceKind::of(Path::new("README.md")), None);
        assert_eq!(SourceKind::of(Path::new("Makefile")), None);
    }

    #[test]
    fn discovery_skips_hidden_and_target_directories() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/b.properties", "b=1\n");
        write(tmp.path(), "src/A.java", "class A {}\n");
        write(tmp.path(), ".git/config.xml", "<x/>");
        write(tmp.path(), "target/out.properties", "x=1\n");
        write(tmp.path(), "notes.txt", "hi");

        let files = discover(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|(p, _)| p.strip_prefix(tmp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/A.java", "src/b.properties"]);
    }

    #[test]
    fn missing_paths_are_invalid_arguments() {
        let err = discover(&[PathBuf::from("/definitely/not/here")]).unwrap_err();
        assert!(matches!(err, ReweaveError::InvalidArguments { .. }));
    }

    #[test]
    fn options_without_a_recipe_are_rejected() {
        let request = RunRequest {
            options: vec![("a".into(), "b".into())],
            ..RunRequest::default()
        };
        let err = resolve_recipes(&request, &ReweaveConfig::default(), &registry()).unwrap_err();
        assert_eq!(err.to_string(), "invalid arguments: --option requires --recipe");
    }

    #[test]
    fn no_recipe_at_all_is_rejected() {
        let err = resolve_recipes(&RunRequest::default(), &ReweaveConfig::default(), &registry()).unwrap_err();
        assert!(err.to_string().contains("no recipe to run"));
    }

    #[test]
    fn parse_errors_stop_before_any_recipe_runs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Broken.java", "class Broken {");
        let request = RunRequest {
            paths: vec![tmp.path().to_path_buf()],
            recipe: Some("java.ChangeNonFluentSetterToFluentSetter".into()),
            options: vec![("fullyQualifiedTargetTypeName".into(), "org.A".into())],
            ..RunRequest::default()
        };
        let err = run(&request, tmp.path(), &registry()).unwrap_err();
        assert!(matches!(err, ReweaveError::Parse(_)), "{}", err);
    }

    #[test]
    fn text_output_ends_with_a_summary() {
        let response = RunResponse {
            status: "ok".into(),
            schema_version: SCHEMA_VERSION.into(),
            applied: false,
            cancelled: false,
            recipes: vec![],
            files: vec![FileChange {
                path: "a.properties".into(),
                language: "properties".into(),
                changed_by: vec!["properties.ChangePropertyKey".into()],
                diff: "--- a/a.properties\n+++ b/a.properties\n".into(),
            }],
            diagnostics: vec![],
            summary: Summary {
                files_scanned: 3,
                files_changed: 1,
                diagnostics: 0,
            },
        };
        let text = render_run_text(&response);
        assert!(text.starts_with("--- a/a.properties"));
        assert!(text.ends_with("would change 1 of 3 files\n"));
    }
}
