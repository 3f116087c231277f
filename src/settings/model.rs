// src/settings/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Settings file as read from TOML, before validation.
///
/// ```toml
/// [store]
/// root = ".tracker"
///
/// [trigger]
/// program = "airflow"
/// args = ["dags", "trigger", "--run-id", "{run_id}", "--conf", "{payload}", "{target}"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub trigger: TriggerSection,
}

/// Validated settings. Only obtainable through `TryFrom<RawSettings>`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreSection,
    pub trigger: TriggerSection,
}

impl Settings {
    pub(crate) fn new_unchecked(store: StoreSection, trigger: TriggerSection) -> Self {
        Self { store, trigger }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Directory holding the durable records.
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
}

fn default_store_root() -> PathBuf {
    PathBuf::from(".tracker")
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

/// `[trigger]` section: how a run is handed to the workflow engine.
///
/// `args` may use the `{target}`, `{run_id}` and `{payload}` placeholders.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerSection {
    #[serde(default = "default_trigger_program")]
    pub program: String,

    #[serde(default = "default_trigger_args")]
    pub args: Vec<String>,
}

fn default_trigger_program() -> String {
    "airflow".to_string()
}

fn default_trigger_args() -> Vec<String> {
    [
        "dags",
        "trigger",
        "--run-id",
        "{run_id}",
        "--conf",
        "{payload}",
        "{target}",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            program: default_trigger_program(),
            args: default_trigger_args(),
        }
    }
}
