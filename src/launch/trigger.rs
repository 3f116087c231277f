// src/launch/trigger.rs

//! Pluggable trigger abstraction.
//!
//! The launcher talks to a `Trigger` instead of a concrete engine client.
//! Production code uses [`CommandTrigger`](super::CommandTrigger); tests can
//! provide their own implementation that records payloads and accepts or
//! rejects runs on demand.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::configuration::{ConfigContent, EffectiveConfiguration};
use crate::errors::Result;
use crate::types::AnalysisRunId;

/// What the engine receives for one run.
///
/// Serialises as `{"analysis_run_id": "...", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerPayload {
    pub analysis_run_id: AnalysisRunId,
    pub config: ConfigContent,
}

impl TriggerPayload {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<EffectiveConfiguration> for TriggerPayload {
    fn from(effective: EffectiveConfiguration) -> Self {
        Self {
            analysis_run_id: effective.analysis_run_id,
            config: effective.config,
        }
    }
}

/// Acknowledgement that the engine accepted a run.
///
/// Acceptance only; the pipeline itself may still fail later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerReceipt {
    pub analysis_run_id: AnalysisRunId,
    /// Engine-side identifier of what was triggered (the workflow name).
    pub target: String,
    /// Free-form engine response (e.g. command stdout).
    pub detail: String,
}

pub type TriggerFuture<'a> = Pin<Box<dyn Future<Output = Result<TriggerReceipt>> + Send + 'a>>;

/// Trait abstracting how a resolved run is handed to the workflow engine.
pub trait Trigger: Send + Sync {
    /// Hand `payload` to the engine for `target`.
    ///
    /// An `Err` means the engine did not accept the run; it should be a
    /// [`TrackerError::Trigger`](crate::errors::TrackerError::Trigger).
    fn trigger<'a>(&'a self, target: &'a str, payload: TriggerPayload) -> TriggerFuture<'a>;
}
