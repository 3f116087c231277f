// src/configuration/store.rs

use std::sync::Arc;

use tracing::info;

use crate::configuration::{ConfigContent, ConfigSource, Configuration};
use crate::errors::{Result, TrackerError};
use crate::store::{Record, RecordStore, insert_with_fresh_id};
use crate::types::{ConfigId, IdPolicy};

/// Creates and looks up immutable [`Configuration`] records.
#[derive(Clone)]
pub struct ConfigurationStore {
    records: Arc<dyn RecordStore<Configuration>>,
}

impl ConfigurationStore {
    pub fn new(records: Arc<dyn RecordStore<Configuration>>) -> Self {
        Self { records }
    }

    /// Parse `source` and persist it as a new configuration.
    ///
    /// With [`IdPolicy::DerivedFromName`] the id comes from the source file
    /// name and an existing record with that id is replaced
    /// (last write wins). With [`IdPolicy::Generated`] a fresh id is
    /// allocated and never collides with an existing record.
    pub fn create_from_source(
        &self,
        source: &ConfigSource,
        policy: IdPolicy,
    ) -> Result<Configuration> {
        let content = source.parse()?;

        let config = match policy {
            IdPolicy::Generated => self.create(content)?,
            IdPolicy::DerivedFromName => self.put_derived(source.derived_id(), content)?,
        };

        info!(
            config_id = %config.config_id,
            source = %source.path.display(),
            ?policy,
            "created configuration"
        );
        Ok(config)
    }

    /// Persist `content` under a freshly generated id.
    pub fn create(&self, content: ConfigContent) -> Result<Configuration> {
        insert_with_fresh_id(self.records.as_ref(), |config_id| Configuration {
            config_id,
            content: content.clone(),
        })
    }

    fn put_derived(&self, config_id: ConfigId, content: ConfigContent) -> Result<Configuration> {
        let replaced = self.records.load(&config_id)?.is_some();
        let config = Configuration { config_id, content };
        self.records.save(&config)?;

        if replaced {
            info!(
                config_id = %config.config_id,
                "replaced existing configuration with the same derived id"
            );
        }
        Ok(config)
    }

    pub fn get(&self, config_id: &str) -> Result<Configuration> {
        self.records
            .load(config_id)?
            .ok_or_else(|| TrackerError::not_found(Configuration::KIND, config_id))
    }

    /// Fail with `NotFound` unless `config_id` resolves.
    pub fn ensure_exists(&self, config_id: &str) -> Result<()> {
        self.get(config_id).map(|_| ())
    }
}
