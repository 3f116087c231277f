// src/runs/mod.rs

//! Analysis run records and their lifecycle.
//!
//! - [`status`] holds the forward-only transition table.
//! - [`tracker`] creates runs, applies transitions and answers counts.

use serde::{Deserialize, Serialize};

use crate::store::Record;
use crate::types::{AnalysisId, AnalysisRunId, ConfigId, RunStatus, WorkflowId};

pub mod status;
pub mod tracker;

pub use status::{allowed_next, can_transition, is_terminal};
pub use tracker::AnalysisRunTracker;

/// One tracked execution of an analysis.
///
/// `config_id` is the run's own override configuration, layered over the
/// analysis's base configuration when the run is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub analysis_run_id: AnalysisRunId,
    pub analysis_id: AnalysisId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
    pub config_id: ConfigId,
    pub status: RunStatus,
}

impl Record for AnalysisRun {
    const KIND: &'static str = "analysis_run";

    fn key(&self) -> &str {
        &self.analysis_run_id
    }
}
