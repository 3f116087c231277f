// src/launch/launcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::configuration::{ConfigSource, ConfigurationResolver, ConfigurationStore};
use crate::errors::{Result, TrackerError};
use crate::fs::{FileSystem, walk_files};
use crate::launch::trigger::{Trigger, TriggerReceipt};
use crate::registry::{EntityRegistry, Workflow};
use crate::runs::{AnalysisRun, AnalysisRunTracker};
use crate::types::{AnalysisId, AnalysisRunId, IdPolicy, RunStatus, WorkflowId};

/// Parameters of one `launch-workflow` batch.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub workflow_id: WorkflowId,
    pub analysis_id: AnalysisId,
    /// Directory searched recursively for run configuration files.
    pub config_dir: PathBuf,
    pub id_policy: IdPolicy,
}

/// Result for a single configuration source.
#[derive(Debug)]
pub struct LaunchOutcome {
    pub source: PathBuf,
    /// Set once a run was created for this source, even if a later step failed.
    pub analysis_run_id: Option<AnalysisRunId>,
    pub result: Result<TriggerReceipt>,
}

impl LaunchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-source outcomes of a batch, in source enumeration order.
#[derive(Debug)]
pub struct LaunchReport {
    pub workflow_id: WorkflowId,
    pub analysis_id: AnalysisId,
    pub outcomes: Vec<LaunchOutcome>,
}

impl LaunchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &TrackerError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.source.as_path(), e)))
    }
}

/// Turns a directory of configuration files into triggered analysis runs.
///
/// Every source is handled independently: an error for one file is recorded
/// in that file's [`LaunchOutcome`] and the batch moves on.
pub struct BatchLauncher {
    fs: Arc<dyn FileSystem>,
    configurations: ConfigurationStore,
    registry: EntityRegistry,
    runs: AnalysisRunTracker,
    resolver: ConfigurationResolver,
    trigger: Arc<dyn Trigger>,
}

impl BatchLauncher {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        configurations: ConfigurationStore,
        registry: EntityRegistry,
        runs: AnalysisRunTracker,
        trigger: Arc<dyn Trigger>,
    ) -> Self {
        let resolver =
            ConfigurationResolver::new(configurations.clone(), registry.clone(), runs.clone());
        Self {
            fs,
            configurations,
            registry,
            runs,
            resolver,
            trigger,
        }
    }

    /// Launch one run per configuration file below `request.config_dir`.
    ///
    /// Fails as a whole only when the workflow or analysis does not exist or
    /// the directory cannot be read; per-file problems end up in the report.
    pub async fn launch(&self, request: &LaunchRequest) -> Result<LaunchReport> {
        let workflow = self.registry.get_workflow(&request.workflow_id)?;
        self.registry.get_analysis(&request.analysis_id)?;

        let dir = &request.config_dir;
        if !self.fs.is_dir(dir) {
            return Err(TrackerError::InvalidInput(format!(
                "{} is not a readable directory",
                dir.display()
            )));
        }
        let sources = walk_files(self.fs.as_ref(), dir).map_err(|e| {
            TrackerError::InvalidInput(format!("{}: {e:#}", dir.display()))
        })?;

        info!(
            workflow = %workflow.workflow_name,
            analysis_id = %request.analysis_id,
            sources = sources.len(),
            "launching batch"
        );

        let mut outcomes = Vec::with_capacity(sources.len());
        for source in sources {
            let outcome = self.launch_one(&workflow, request, &source).await;
            if let Err(err) = &outcome.result {
                warn!(source = %source.display(), error = %err, "source failed to launch");
            }
            outcomes.push(outcome);
        }

        let report = LaunchReport {
            workflow_id: workflow.workflow_id,
            analysis_id: request.analysis_id.clone(),
            outcomes,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );
        Ok(report)
    }

    async fn launch_one(
        &self,
        workflow: &Workflow,
        request: &LaunchRequest,
        path: &Path,
    ) -> LaunchOutcome {
        let run = match self.create_run(workflow, request, path) {
            Ok(run) => run,
            Err(err) => {
                return LaunchOutcome {
                    source: path.to_path_buf(),
                    analysis_run_id: None,
                    result: Err(err),
                };
            }
        };

        let result = match self.runs.set_scheduled(&run.analysis_run_id) {
            Ok(scheduled) => {
                let result = self.resolve_and_trigger(workflow, &scheduled).await;
                if result.is_err() {
                    self.mark_failed(&scheduled);
                }
                result
            }
            Err(err) => Err(err),
        };

        LaunchOutcome {
            source: path.to_path_buf(),
            analysis_run_id: Some(run.analysis_run_id),
            result,
        }
    }

    /// Ingest the source as a configuration and create its run.
    fn create_run(
        &self,
        workflow: &Workflow,
        request: &LaunchRequest,
        path: &Path,
    ) -> Result<AnalysisRun> {
        let source = ConfigSource::read(self.fs.as_ref(), path)?;
        let config = self
            .configurations
            .create_from_source(&source, request.id_policy)?;
        self.runs.create_run(
            &request.analysis_id,
            &config.config_id,
            Some(&workflow.workflow_id),
        )
    }

    async fn resolve_and_trigger(
        &self,
        workflow: &Workflow,
        run: &AnalysisRun,
    ) -> Result<TriggerReceipt> {
        let effective = self.resolver.resolve(&run.analysis_run_id)?;
        self.trigger
            .trigger(&workflow.workflow_name, effective.into())
            .await
    }

    /// Record a run that was scheduled but never accepted by the engine.
    fn mark_failed(&self, run: &AnalysisRun) {
        if let Err(err) = self.runs.set_status(&run.analysis_run_id, RunStatus::Failed) {
            warn!(
                run_id = %run.analysis_run_id,
                error = %err,
                "could not record trigger failure on run"
            );
        }
    }
}
