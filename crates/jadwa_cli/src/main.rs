//! CLI entry point for jadwa.

mod cli;
mod commands;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use jadwa_observability::ObservabilityConfig;
use jadwa_runtime::AnalysisError;

use crate::cli::Cli;

/// Directories walked upwards when looking for project env files.
const MAX_PARENT_DEPTH: usize = 32;

/// First `name` found in the current directory or one of its parents.
fn find_upwards(name: &str) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?.to_path_buf();
    }
    None
}

fn load_env_file(path: &Path) {
    if let Err(e) = dotenvy::from_path(path) {
        eprintln!("warning: could not read {}: {e}", path.display());
    }
}

/// Load env files. dotenvy never overrides a variable that is already set, so
/// the process environment wins, then the project files, then the global one.
/// Order: 1) .env (project root)  2) .jadwa/env (project)  3) ~/.jadwa/env
fn load_jadwa_env() {
    if let Some(path) = find_upwards(".env") {
        load_env_file(&path);
    }
    if let Some(path) = find_upwards(".jadwa/env") {
        load_env_file(&path);
    }
    if let Some(path) = commands::config::global_env_path().filter(|p| p.exists()) {
        load_env_file(&path);
    }
}

fn init_logging(verbose: bool) {
    let mut config = ObservabilityConfig::from_env().with_version(env!("CARGO_PKG_VERSION"));
    if verbose {
        config = config.with_log_level("info,jadwa_runtime=debug,jadwa_llms=debug");
    }
    if let Err(e) = jadwa_observability::init(config) {
        eprintln!("warning: logging disabled: {e}");
    }
}

/// Analysis errors carry a user-facing message; everything else prints as is.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AnalysisError>() {
        Some(analysis) => analysis.user_message(),
        None => format!("{err:#}"),
    }
}

#[tokio::main]
async fn main() {
    load_jadwa_env();
    let cli = Cli::parse();
    output::init(cli.output);
    init_logging(cli.verbose);

    let result = commands::handle(cli).await;
    jadwa_observability::shutdown();

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        output::error(&describe(&e));
        std::process::exit(1);
    }
}
