// src/types.rs

//! Identifier aliases and small shared enums.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Identifier of a stored configuration document.
pub type ConfigId = String;
pub type WorkflowId = String;
pub type AnalysisId = String;
pub type AnalysisRunId = String;

/// How a new configuration record obtains its `config_id`.
///
/// - `Generated`: a fresh UUID for every ingestion.
/// - `DerivedFromName`: a stable id computed from the source file name, so
///   re-ingesting a file with the same name reuses (and overwrites) the
///   same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    #[default]
    Generated,
    DerivedFromName,
}

impl IdPolicy {
    /// Map the CLI `--id_from_filename` flag onto a policy.
    pub fn from_flag(id_from_filename: bool) -> Self {
        if id_from_filename {
            IdPolicy::DerivedFromName
        } else {
            IdPolicy::Generated
        }
    }
}

/// Lifecycle status of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Created,
    Scheduled,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub const ALL: [RunStatus; 6] = [
        RunStatus::Created,
        RunStatus::Scheduled,
        RunStatus::Running,
        RunStatus::Completed,
        RunStatus::Failed,
        RunStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Created => "created",
            RunStatus::Scheduled => "scheduled",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        RunStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "invalid run status: {wanted} (expected one of created, scheduled, running, completed, failed, cancelled)"
                )
            })
    }
}
