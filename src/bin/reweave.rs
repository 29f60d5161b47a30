// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Binary entry point for the reweave CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Preview a recipe as a unified diff
//! reweave run --recipe properties.ChangePropertyKey \
//!     --option oldPropertyKey=a.b.c --option newPropertyKey=a.b.d src/
//!
//! # Run the pipeline from reweave.toml and write the changes
//! reweave run --apply .
//!
//! # List recipes and their options
//! reweave recipes
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use reweave::cli::{render_recipes_text, render_run_text, RunRequest};
use reweave::error::{OutputErrorCode, ReweaveError};
use reweave::output::{emit_response, ErrorResponse, RecipesResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Structural, type-aware, format-preserving source transformation.
#[derive(Parser, Debug)]
#[command(name = "reweave", version, about = "Run source transformation recipes")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Unified diff and a summary line.
    #[default]
    Text,
    /// Versioned JSON response.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run recipes over source files (preview unless --apply).
    Run {
        /// Recipe to run; without it the [[pipeline]] in reweave.toml runs.
        #[arg(long)]
        recipe: Option<String>,
        /// Recipe option as `key=value`. Repeatable.
        #[arg(long = "option", value_parser = parse_option)]
        options: Vec<(String, String)>,
        /// Configuration file (default: reweave.toml in the working directory).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write changed files back.
        #[arg(long)]
        apply: bool,
        /// Stop after this many milliseconds and report what was done.
        #[arg(long)]
        deadline_ms: Option<u64>,
        /// Files and directories to transform.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List the available recipes.
    Recipes,
}

/// Parse a recipe option in `key=value` format.
fn parse_option(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("invalid option '{}', expected 'key=value'", s)),
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level, cli.global.log_format);

    let format = cli.global.format;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = OutputErrorCode::from(&err);
            match format {
                OutputFormat::Json => {
                    let _ = emit_response(&ErrorResponse::from_error(&err), &mut io::stdout());
                    let _ = io::stdout().flush();
                }
                OutputFormat::Text => eprintln!("error: {}", err),
            }
            ExitCode::from(code.code())
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over `--log-level`.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn execute(cli: Cli) -> Result<(), ReweaveError> {
    let format = cli.global.format;
    match cli.command {
        Command::Run {
            recipe,
            options,
            config,
            apply,
            deadline_ms,
            paths,
        } => {
            let request = RunRequest {
                paths,
                recipe,
                options,
                config,
                apply,
                deadline: deadline_ms.map(Duration::from_millis),
            };
            let dir = std::env::current_dir().map_err(|e| ReweaveError::io(".", e))?;
            let response = reweave::run(&request, &dir, &reweave::registry())?;
            match format {
                OutputFormat::Json => emit(&response),
                OutputFormat::Text => print_text(&render_run_text(&response)),
            }
        }
        Command::Recipes => {
            let registry = reweave::registry();
            let response = RecipesResponse::new(registry.entries());
            match format {
                OutputFormat::Json => emit(&response),
                OutputFormat::Text => print_text(&render_recipes_text(&response)),
            }
        }
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), ReweaveError> {
    emit_response(response, &mut io::stdout()).map_err(|e| ReweaveError::io("<stdout>", e))?;
    let _ = io::stdout().flush();
    Ok(())
}

fn print_text(text: &str) -> Result<(), ReweaveError> {
    let mut stdout = io::stdout();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| ReweaveError::io("<stdout>", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_split_at_the_first_equals() {
        assert_eq!(
            parse_option("elementPath=/project/version").unwrap(),
            ("elementPath".to_string(), "/project/version".to_string())
        );
        assert_eq!(parse_option("newValue=a=b").unwrap().1, "a=b");
        assert!(parse_option("novalue").is_err());
        assert!(parse_option("=x").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_collects_repeated_options() {
        let cli = Cli::try_parse_from([
            "reweave",
            "run",
            "--recipe",
            "properties.ChangePropertyKey",
            "--option",
            "oldPropertyKey=a",
            "--option",
            "newPropertyKey=b",
            "--deadline-ms",
            "500",
            "conf",
        ])
        .unwrap();
        let Command::Run {
            options, deadline_ms, ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(options.len(), 2);
        assert_eq!(deadline_ms, Some(500));
    }
}
