// src/lib.rs

pub mod cli;
pub mod configuration;
pub mod errors;
pub mod fs;
pub mod launch;
pub mod logging;
pub mod registry;
pub mod runs;
pub mod settings;
pub mod store;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::cli::{
    CliArgs, Command, CreateAnalysisArgs, CreateWorkflowArgs, GetRunCountArgs,
    LaunchWorkflowArgs, SetRunStatusArgs, UpdateConfigArgs,
};
use crate::configuration::{ConfigSource, ConfigurationResolver, ConfigurationStore};
use crate::errors::TrackerError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::launch::{BatchLauncher, CommandTrigger, LaunchRequest, Trigger};
use crate::registry::{EntityKind, EntityRegistry};
use crate::runs::{AnalysisRunTracker, is_terminal};
use crate::store::Backends;
use crate::types::{ConfigId, IdPolicy};

/// The tracker components wired onto one set of record stores.
#[derive(Clone)]
pub struct Tracker {
    pub configurations: ConfigurationStore,
    pub registry: EntityRegistry,
    pub runs: AnalysisRunTracker,
    pub resolver: ConfigurationResolver,
}

impl Tracker {
    pub fn new(backends: Backends) -> Self {
        let configurations = ConfigurationStore::new(backends.configurations);
        let registry = EntityRegistry::new(
            backends.workflows,
            backends.analyses,
            configurations.clone(),
        );
        let runs = AnalysisRunTracker::new(backends.runs, registry.clone());
        let resolver =
            ConfigurationResolver::new(configurations.clone(), registry.clone(), runs.clone());

        Self {
            configurations,
            registry,
            runs,
            resolver,
        }
    }

    pub fn launcher(&self, fs: Arc<dyn FileSystem>, trigger: Arc<dyn Trigger>) -> BatchLauncher {
        BatchLauncher::new(
            fs,
            self.configurations.clone(),
            self.registry.clone(),
            self.runs.clone(),
            trigger,
        )
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading
/// - file-backed record stores
/// - the command trigger
/// - the selected subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let settings = settings::load_or_default(fs.as_ref(), args.settings.as_deref())?;

    let store_root = args
        .store_root
        .clone()
        .unwrap_or_else(|| settings.store.root.clone());
    debug!(store_root = %store_root.display(), "opening record stores");

    let tracker = Tracker::new(Backends::on_disk(fs.clone(), &store_root));

    match args.command {
        Command::CreateWorkflow(cmd) => create_workflow_command(&tracker, fs.as_ref(), cmd),
        Command::LaunchWorkflow(cmd) => {
            let trigger = Arc::new(CommandTrigger::from_settings(&settings.trigger));
            launch_workflow_command(&tracker, fs, trigger, cmd).await
        }
        Command::CreateAnalysis(cmd) => create_analysis_command(&tracker, fs.as_ref(), cmd),
        Command::UpdateConfig(cmd) => update_config_command(&tracker, fs.as_ref(), cmd),
        Command::GetRunCount(cmd) => get_run_count_command(&tracker, cmd),
        Command::SetRunStatus(cmd) => set_run_status_command(&tracker, cmd),
    }
}

/// Ingest a single configuration file given on the command line.
fn make_config(
    tracker: &Tracker,
    fs: &dyn FileSystem,
    path: &Path,
    id_from_filename: bool,
) -> Result<ConfigId> {
    if !fs.is_file(path) {
        return Err(TrackerError::InvalidInput(format!(
            "config_file_location must be a path to a file: {}",
            path.display()
        ))
        .into());
    }

    let source = ConfigSource::read(fs, path)?;
    let config = tracker
        .configurations
        .create_from_source(&source, IdPolicy::from_flag(id_from_filename))?;
    Ok(config.config_id)
}

fn create_workflow_command(
    tracker: &Tracker,
    fs: &dyn FileSystem,
    cmd: CreateWorkflowArgs,
) -> Result<()> {
    let config_id = make_config(tracker, fs, &cmd.config_file_location, cmd.ids.id_from_filename)?;
    let workflow = tracker.registry.create_workflow(
        &cmd.workflow_name,
        &cmd.workflow_version,
        &config_id,
    )?;

    println!("Created workflow with ID: {}", workflow.workflow_id);
    Ok(())
}

fn create_analysis_command(
    tracker: &Tracker,
    fs: &dyn FileSystem,
    cmd: CreateAnalysisArgs,
) -> Result<()> {
    let config_id = make_config(tracker, fs, &cmd.config_file_location, cmd.ids.id_from_filename)?;
    let analysis = tracker.registry.create_analysis(
        &cmd.analysis_name,
        cmd.analysis_start_date.as_deref(),
        &config_id,
    )?;

    println!("Created analysis with ID: {}", analysis.analysis_id);
    Ok(())
}

fn update_config_command(
    tracker: &Tracker,
    fs: &dyn FileSystem,
    cmd: UpdateConfigArgs,
) -> Result<()> {
    // clap's arg group guarantees exactly one of the two.
    let (kind, entity_id) = match (&cmd.workflow_id, &cmd.analysis_id) {
        (Some(id), None) => (EntityKind::Workflow, id),
        (None, Some(id)) => (EntityKind::Analysis, id),
        _ => bail!("exactly one of --workflow_id or --analysis_id is required"),
    };

    let config_id = make_config(tracker, fs, &cmd.config_file_location, cmd.ids.id_from_filename)?;
    tracker
        .registry
        .set_configuration(kind, entity_id, &config_id)?;

    println!("Updated {kind} {entity_id} to configuration {config_id}");
    Ok(())
}

async fn launch_workflow_command(
    tracker: &Tracker,
    fs: Arc<dyn FileSystem>,
    trigger: Arc<dyn Trigger>,
    cmd: LaunchWorkflowArgs,
) -> Result<()> {
    if !fs.is_dir(&cmd.config_location) {
        return Err(TrackerError::InvalidInput(format!(
            "config_location must be a path to a directory: {}",
            cmd.config_location.display()
        ))
        .into());
    }

    let request = LaunchRequest {
        workflow_id: cmd.workflow_id,
        analysis_id: cmd.analysis_id,
        config_dir: cmd.config_location,
        id_policy: IdPolicy::from_flag(cmd.ids.id_from_filename),
    };

    let report = tracker.launcher(fs, trigger).launch(&request).await?;

    for outcome in report.outcomes.iter() {
        match (&outcome.result, &outcome.analysis_run_id) {
            (Ok(receipt), _) => println!(
                "{}: triggered analysis run {}",
                outcome.source.display(),
                receipt.analysis_run_id
            ),
            (Err(err), Some(run_id)) => println!(
                "{}: FAILED (analysis run {run_id}): {err}",
                outcome.source.display()
            ),
            (Err(err), None) => println!("{}: FAILED: {err}", outcome.source.display()),
        }
    }
    println!("{} succeeded, {} failed", report.succeeded(), report.failed());

    if report.failed() > 0 {
        bail!(
            "{} of {} configuration files failed to launch",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

fn get_run_count_command(tracker: &Tracker, cmd: GetRunCountArgs) -> Result<()> {
    tracker.registry.get_analysis(&cmd.analysis_id)?;
    let count = tracker
        .runs
        .count_by_status(&cmd.analysis_id, cmd.run_status)?;

    let status = cmd
        .run_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "any".to_string());
    println!(
        "There are {count} analysis runs for analysis {}, with status {status}",
        cmd.analysis_id
    );
    Ok(())
}

fn set_run_status_command(tracker: &Tracker, cmd: SetRunStatusArgs) -> Result<()> {
    let run = tracker.runs.set_status(&cmd.run_id, cmd.run_status)?;
    info!(run_id = %run.analysis_run_id, status = %run.status, "recorded run status");

    if is_terminal(run.status) {
        println!("Analysis run {} is now {} (final)", run.analysis_run_id, run.status);
    } else {
        println!("Analysis run {} is now {}", run.analysis_run_id, run.status);
    }
    Ok(())
}
