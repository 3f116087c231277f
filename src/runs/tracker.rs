// src/runs/tracker.rs

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{Result, TrackerError};
use crate::registry::EntityRegistry;
use crate::runs::AnalysisRun;
use crate::runs::status::can_transition;
use crate::store::{Record, RecordStore, insert_with_fresh_id};
use crate::types::RunStatus;

/// Persists analysis runs and enforces their status lifecycle.
#[derive(Clone)]
pub struct AnalysisRunTracker {
    runs: Arc<dyn RecordStore<AnalysisRun>>,
    registry: EntityRegistry,
}

impl AnalysisRunTracker {
    pub fn new(runs: Arc<dyn RecordStore<AnalysisRun>>, registry: EntityRegistry) -> Self {
        Self { runs, registry }
    }

    /// Create a run in status `created`.
    ///
    /// `analysis_id` must resolve; `workflow_id`, when given, must resolve
    /// too. The run id is allocated once here and never reused.
    pub fn create_run(
        &self,
        analysis_id: &str,
        config_id: &str,
        workflow_id: Option<&str>,
    ) -> Result<AnalysisRun> {
        self.registry.get_analysis(analysis_id)?;
        if let Some(workflow_id) = workflow_id {
            self.registry.get_workflow(workflow_id)?;
        }

        let run = insert_with_fresh_id(self.runs.as_ref(), |analysis_run_id| AnalysisRun {
            analysis_run_id,
            analysis_id: analysis_id.to_string(),
            workflow_id: workflow_id.map(str::to_string),
            config_id: config_id.to_string(),
            status: RunStatus::Created,
        })?;

        info!(
            run_id = %run.analysis_run_id,
            analysis_id = %run.analysis_id,
            workflow_id = ?run.workflow_id,
            config_id = %run.config_id,
            "created analysis run"
        );
        Ok(run)
    }

    pub fn get_run(&self, run_id: &str) -> Result<AnalysisRun> {
        self.runs
            .load(run_id)?
            .ok_or_else(|| TrackerError::not_found(AnalysisRun::KIND, run_id))
    }

    /// Move a run to `new_status` if the transition table allows it.
    pub fn set_status(&self, run_id: &str, new_status: RunStatus) -> Result<AnalysisRun> {
        let mut run = self.get_run(run_id)?;
        let from = run.status;

        if !can_transition(from, new_status) {
            return Err(TrackerError::InvalidTransition {
                run_id: run_id.to_string(),
                from,
                to: new_status,
            });
        }

        run.status = new_status;
        self.runs.save(&run)?;

        info!(run_id, %from, to = %new_status, "analysis run status changed");
        Ok(run)
    }

    /// `created -> scheduled`, applied right after a run is created for launch.
    pub fn set_scheduled(&self, run_id: &str) -> Result<AnalysisRun> {
        self.set_status(run_id, RunStatus::Scheduled)
    }

    /// All runs of an analysis, ordered by run id.
    pub fn runs_for_analysis(&self, analysis_id: &str) -> Result<Vec<AnalysisRun>> {
        let runs: Vec<AnalysisRun> = self
            .runs
            .list()?
            .into_iter()
            .filter(|run| run.analysis_id == analysis_id)
            .collect();
        debug!(analysis_id, runs = runs.len(), "listed analysis runs");
        Ok(runs)
    }

    /// Count an analysis's runs, optionally only those in `status`.
    pub fn count_by_status(&self, analysis_id: &str, status: Option<RunStatus>) -> Result<usize> {
        let count = self
            .runs_for_analysis(analysis_id)?
            .iter()
            .filter(|run| status.is_none_or(|wanted| run.status == wanted))
            .count();
        Ok(count)
    }
}
