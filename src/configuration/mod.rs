// src/configuration/mod.rs

//! Tracked configuration documents.
//!
//! - [`source`] reads and parses a configuration file (TOML or JSON).
//! - [`store`] persists immutable [`Configuration`] records and assigns ids.
//! - [`resolver`] merges an analysis's base configuration with a run's
//!   override into the [`EffectiveConfiguration`] handed to the trigger.

use serde::{Deserialize, Serialize};

use crate::store::Record;
use crate::types::ConfigId;

pub mod resolver;
pub mod source;
pub mod store;

pub use resolver::{ConfigurationResolver, EffectiveConfiguration, merge_override};
pub use source::{ConfigSource, derive_config_id};
pub use store::ConfigurationStore;

/// Option mapping of a configuration: string keys to loosely-typed values.
pub type ConfigContent = toml::Table;

/// An immutable configuration document.
///
/// "Updating" a workflow's or analysis's configuration creates a new record
/// and repoints the owner; content is never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub config_id: ConfigId,
    #[serde(default)]
    pub content: ConfigContent,
}

impl Record for Configuration {
    const KIND: &'static str = "configuration";

    fn key(&self) -> &str {
        &self.config_id
    }
}
