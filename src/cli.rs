// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use crate::types::RunStatus;

/// Command-line arguments for `tracker`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tracker",
    version,
    about = "Track workflows, analyses and analysis runs, and launch runs on a workflow engine.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the settings file (TOML).
    ///
    /// Default: `Tracker.toml` in the current working directory, if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Directory for tracked records; overrides `[store].root`.
    #[arg(long, global = true, value_name = "DIR")]
    pub store_root: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TRACKER_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register a workflow with its default configuration.
    CreateWorkflow(CreateWorkflowArgs),
    /// Create one analysis run per configuration file and trigger each.
    LaunchWorkflow(LaunchWorkflowArgs),
    /// Register an analysis with its base configuration.
    CreateAnalysis(CreateAnalysisArgs),
    /// Point a workflow or analysis at a new configuration.
    UpdateConfig(UpdateConfigArgs),
    /// Count the runs of an analysis, optionally by status.
    GetRunCount(GetRunCountArgs),
    /// Record a status reported by the workflow engine for a run.
    SetRunStatus(SetRunStatusArgs),
}

/// Options shared by every command that ingests configuration files.
#[derive(Debug, Clone, Args)]
pub struct IdArgs {
    /// Derive configuration ids from file names instead of generating them.
    #[arg(short = 'f', long = "id_from_filename")]
    pub id_from_filename: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CreateWorkflowArgs {
    /// Name of the workflow to create.
    #[arg(short = 'n', long = "workflow_name")]
    pub workflow_name: String,

    /// Version of the workflow to create.
    #[arg(short = 'v', long = "workflow_version")]
    pub workflow_version: String,

    /// Path to a config file for this workflow.
    #[arg(short = 'c', long = "config_file_location", value_name = "FILE")]
    pub config_file_location: PathBuf,

    #[command(flatten)]
    pub ids: IdArgs,
}

#[derive(Debug, Clone, Args)]
pub struct LaunchWorkflowArgs {
    /// ID of the workflow to run.
    #[arg(short = 'w', long = "workflow_id")]
    pub workflow_id: String,

    /// ID of the analysis to run.
    #[arg(short = 'a', long = "analysis_id")]
    pub analysis_id: String,

    /// Directory of analysis run configuration files. Each file generates
    /// one analysis run.
    #[arg(short = 'c', long = "config_location", value_name = "DIR")]
    pub config_location: PathBuf,

    #[command(flatten)]
    pub ids: IdArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CreateAnalysisArgs {
    /// Name of the analysis to create.
    #[arg(short = 'n', long = "analysis_name")]
    pub analysis_name: String,

    /// Starting date of the analysis.
    #[arg(short = 'd', long = "analysis_start_date")]
    pub analysis_start_date: Option<String>,

    /// Path to a config file for this analysis.
    #[arg(short = 'c', long = "config_file_location", value_name = "FILE")]
    pub config_file_location: PathBuf,

    #[command(flatten)]
    pub ids: IdArgs,
}

#[derive(Debug, Clone, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["workflow_id", "analysis_id"])))]
pub struct UpdateConfigArgs {
    /// ID of the workflow to update.
    #[arg(short = 'w', long = "workflow_id")]
    pub workflow_id: Option<String>,

    /// ID of the analysis to update.
    #[arg(short = 'a', long = "analysis_id")]
    pub analysis_id: Option<String>,

    /// Path to a config file.
    #[arg(short = 'c', long = "config_file_location", value_name = "FILE")]
    pub config_file_location: PathBuf,

    #[command(flatten)]
    pub ids: IdArgs,
}

#[derive(Debug, Clone, Args)]
pub struct GetRunCountArgs {
    /// ID of the analysis to look up runs for.
    #[arg(short = 'a', long = "analysis_id")]
    pub analysis_id: String,

    /// Status of the analysis runs to look up (any status if omitted).
    #[arg(short = 's', long = "run_status", value_enum)]
    pub run_status: Option<RunStatus>,
}

#[derive(Debug, Clone, Args)]
pub struct SetRunStatusArgs {
    /// ID of the analysis run to update.
    #[arg(short = 'r', long = "run_id")]
    pub run_id: String,

    /// New status; must be reachable from the run's current status.
    #[arg(short = 's', long = "run_status", value_enum)]
    pub run_status: RunStatus,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
