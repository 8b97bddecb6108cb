// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bp` — the build-mode control-plane CLI.
//!
//! A thin client over [`bp_engine::ControlPlane`]: every subcommand reads a
//! document from disk (or an id), calls exactly one control-plane
//! operation, and prints the result. No policy or lifecycle logic lives
//! here — that belongs to the core, not its callers.

mod color;
mod commands;
mod exit_error;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use exit_error::ExitError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bp", version, about = "Build-mode control-plane CLI")]
struct Cli {
    /// Path to the runtime config YAML (defaults to ./config/runtime.yaml, or $BP_RUNTIME_CONFIG).
    #[arg(long, global = true)]
    runtime_config: Option<PathBuf>,

    /// Path to the limits config YAML (defaults to ./config/limits.yaml, or $BP_LIMITS_CONFIG).
    #[arg(long, global = true)]
    limits_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against its schema without submitting it anywhere.
    Validate { kind: String, file: PathBuf },
    /// Submit a Job Contract.
    SubmitJob { file: PathBuf },
    /// Fetch a stored job by id.
    GetJob { job_id: String },
    /// Run a job (created|waiting -> running, deferred to waiting).
    RunJob { job_id: String },
    /// Stop a running job (running -> waiting).
    StopJob { job_id: String },
    /// Submit an Artifact.
    SubmitArtifact { file: PathBuf },
    /// Fetch a stored artifact by id.
    GetArtifact { artifact_id: String },
    /// Submit an Evaluation and drive the referenced job's transition.
    SubmitEvaluation { file: PathBuf },
}

fn main() {
    let command = Cli::command().styles(color::styles());
    let matches = command.get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(e.code);
    }
}

fn run(cli: Cli) -> Result<(), ExitError> {
    let (default_runtime, default_limits) = bp_engine::config::resolve_config_paths();
    let runtime_config_path = cli.runtime_config.unwrap_or(default_runtime);
    let limits_config_path = cli.limits_config.unwrap_or(default_limits);

    match cli.command {
        Commands::Validate { kind, file } => commands::validate::run(&runtime_config_path, &kind, &file),
        Commands::SubmitJob { file } => commands::job::submit(&runtime_config_path, &limits_config_path, &file),
        Commands::GetJob { job_id } => commands::job::get(&runtime_config_path, &limits_config_path, &job_id),
        Commands::RunJob { job_id } => commands::job::run(&runtime_config_path, &limits_config_path, &job_id),
        Commands::StopJob { job_id } => commands::job::stop(&runtime_config_path, &limits_config_path, &job_id),
        Commands::SubmitArtifact { file } => commands::artifact::submit(&runtime_config_path, &limits_config_path, &file),
        Commands::GetArtifact { artifact_id } => commands::artifact::get(&runtime_config_path, &limits_config_path, &artifact_id),
        Commands::SubmitEvaluation { file } => commands::evaluation::submit(&runtime_config_path, &limits_config_path, &file),
    }
}
