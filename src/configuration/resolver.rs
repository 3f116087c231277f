// src/configuration/resolver.rs

use serde::Serialize;
use tracing::debug;

use crate::configuration::{ConfigContent, ConfigurationStore};
use crate::errors::Result;
use crate::registry::EntityRegistry;
use crate::runs::AnalysisRunTracker;
use crate::types::AnalysisRunId;

/// Merged configuration for one analysis run.
///
/// Derived on demand and never persisted; `analysis_run_id` lets the engine
/// correlate what it executes with the tracked run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfiguration {
    pub analysis_run_id: AnalysisRunId,
    pub config: ConfigContent,
}

/// Shallow merge of `overrides` over `base`.
///
/// Keys present in both take the override value wholesale (nested tables are
/// not merged recursively); keys present in only one side pass through.
pub fn merge_override(base: &ConfigContent, overrides: &ConfigContent) -> ConfigContent {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Computes [`EffectiveConfiguration`]s from stored runs and configurations.
#[derive(Clone)]
pub struct ConfigurationResolver {
    configurations: ConfigurationStore,
    registry: EntityRegistry,
    runs: AnalysisRunTracker,
}

impl ConfigurationResolver {
    pub fn new(
        configurations: ConfigurationStore,
        registry: EntityRegistry,
        runs: AnalysisRunTracker,
    ) -> Self {
        Self {
            configurations,
            registry,
            runs,
        }
    }

    /// Resolve the effective configuration of `run_id`: the run's analysis
    /// base configuration with the run's own configuration layered on top.
    pub fn resolve(&self, run_id: &str) -> Result<EffectiveConfiguration> {
        let run = self.runs.get_run(run_id)?;
        let analysis = self.registry.get_analysis(&run.analysis_id)?;
        let base = self.configurations.get(&analysis.config_id)?;
        let overrides = self.configurations.get(&run.config_id)?;

        let config = merge_override(&base.content, &overrides.content);
        debug!(
            run_id = %run.analysis_run_id,
            base_config = %base.config_id,
            override_config = %overrides.config_id,
            keys = config.len(),
            "resolved effective configuration"
        );

        Ok(EffectiveConfiguration {
            analysis_run_id: run.analysis_run_id,
            config,
        })
    }
}
