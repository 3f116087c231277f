// src/registry.rs

//! Workflow and analysis records.
//!
//! Both entities point at a default [`Configuration`](crate::configuration::Configuration)
//! by id. Changing that configuration never edits the old record; the
//! entity is repointed at a newly created one.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::configuration::ConfigurationStore;
use crate::errors::{Result, TrackerError};
use crate::store::{Record, RecordStore, insert_with_fresh_id};
use crate::types::{AnalysisId, ConfigId, WorkflowId};

/// A named, versioned pipeline definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: WorkflowId,
    pub workflow_name: String,
    pub workflow_version: String,
    pub config_id: ConfigId,
}

impl Record for Workflow {
    const KIND: &'static str = "workflow";

    fn key(&self) -> &str {
        &self.workflow_id
    }
}

/// A named study with its own base configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis_id: AnalysisId,
    pub analysis_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_start_date: Option<String>,
    pub config_id: ConfigId,
}

impl Record for Analysis {
    const KIND: &'static str = "analysis";

    fn key(&self) -> &str {
        &self.analysis_id
    }
}

/// Which kind of entity a configuration update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Workflow,
    Analysis,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Workflow => f.write_str(Workflow::KIND),
            EntityKind::Analysis => f.write_str(Analysis::KIND),
        }
    }
}

#[derive(Clone)]
pub struct EntityRegistry {
    workflows: Arc<dyn RecordStore<Workflow>>,
    analyses: Arc<dyn RecordStore<Analysis>>,
    configurations: ConfigurationStore,
}

impl EntityRegistry {
    pub fn new(
        workflows: Arc<dyn RecordStore<Workflow>>,
        analyses: Arc<dyn RecordStore<Analysis>>,
        configurations: ConfigurationStore,
    ) -> Self {
        Self {
            workflows,
            analyses,
            configurations,
        }
    }

    /// Register a workflow. Duplicate name/version pairs are allowed; every
    /// call yields a distinct workflow.
    pub fn create_workflow(
        &self,
        name: &str,
        version: &str,
        config_id: &str,
    ) -> Result<Workflow> {
        self.configurations.ensure_exists(config_id)?;

        let workflow = insert_with_fresh_id(self.workflows.as_ref(), |workflow_id| Workflow {
            workflow_id,
            workflow_name: name.to_string(),
            workflow_version: version.to_string(),
            config_id: config_id.to_string(),
        })?;

        info!(
            workflow_id = %workflow.workflow_id,
            name = %workflow.workflow_name,
            version = %workflow.workflow_version,
            "created workflow"
        );
        Ok(workflow)
    }

    pub fn create_analysis(
        &self,
        name: &str,
        start_date: Option<&str>,
        config_id: &str,
    ) -> Result<Analysis> {
        self.configurations.ensure_exists(config_id)?;

        let analysis = insert_with_fresh_id(self.analyses.as_ref(), |analysis_id| Analysis {
            analysis_id,
            analysis_name: name.to_string(),
            analysis_start_date: start_date.map(str::to_string),
            config_id: config_id.to_string(),
        })?;

        info!(
            analysis_id = %analysis.analysis_id,
            name = %analysis.analysis_name,
            "created analysis"
        );
        Ok(analysis)
    }

    pub fn get_workflow(&self, workflow_id: &str) -> Result<Workflow> {
        self.workflows
            .load(workflow_id)?
            .ok_or_else(|| TrackerError::not_found(Workflow::KIND, workflow_id))
    }

    pub fn get_analysis(&self, analysis_id: &str) -> Result<Analysis> {
        self.analyses
            .load(analysis_id)?
            .ok_or_else(|| TrackerError::not_found(Analysis::KIND, analysis_id))
    }

    /// Repoint an entity at another configuration.
    ///
    /// Both the entity and the new configuration must exist. Returns the
    /// previously referenced config id.
    pub fn set_configuration(
        &self,
        kind: EntityKind,
        entity_id: &str,
        new_config_id: &str,
    ) -> Result<ConfigId> {
        let previous = match kind {
            EntityKind::Workflow => {
                let mut workflow = self.get_workflow(entity_id)?;
                self.configurations.ensure_exists(new_config_id)?;
                let previous = std::mem::replace(&mut workflow.config_id, new_config_id.to_string());
                self.workflows.save(&workflow)?;
                previous
            }
            EntityKind::Analysis => {
                let mut analysis = self.get_analysis(entity_id)?;
                self.configurations.ensure_exists(new_config_id)?;
                let previous = std::mem::replace(&mut analysis.config_id, new_config_id.to_string());
                self.analyses.save(&analysis)?;
                previous
            }
        };

        info!(
            entity = %kind,
            entity_id,
            from = %previous,
            to = new_config_id,
            "repointed configuration"
        );
        Ok(previous)
    }
}
