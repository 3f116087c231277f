#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tracker::Tracker;
use tracker::configuration::ConfigContent;
use tracker::fs::mock::MockFileSystem;
use tracker::launch::BatchLauncher;
use tracker::registry::{Analysis, Workflow};
use tracker::store::Backends;
use tracker::types::ConfigId;

use crate::fake_trigger::FakeTrigger;

/// Parse a TOML snippet into configuration content.
pub fn content(toml_text: &str) -> ConfigContent {
    toml::from_str(toml_text).expect("test content must be valid TOML")
}

/// Builder for `ConfigContent` to simplify test setup.
#[derive(Default)]
pub struct ContentBuilder {
    content: ConfigContent,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.content.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> ConfigContent {
        self.content
    }
}

/// In-memory tracker plus a mock filesystem and a fake trigger.
pub struct TrackerFixture {
    pub tracker: Tracker,
    pub fs: MockFileSystem,
    pub trigger: Arc<FakeTrigger>,
}

impl TrackerFixture {
    pub fn new() -> Self {
        Self::with_trigger(FakeTrigger::new())
    }

    pub fn with_trigger(trigger: FakeTrigger) -> Self {
        Self {
            tracker: Tracker::new(Backends::in_memory()),
            fs: MockFileSystem::new(),
            trigger: Arc::new(trigger),
        }
    }

    pub fn config(&self, content: ConfigContent) -> ConfigId {
        self.tracker
            .configurations
            .create(content)
            .expect("failed to store test configuration")
            .config_id
    }

    pub fn workflow(&self, name: &str) -> Workflow {
        let config_id = self.config(ConfigContent::new());
        self.tracker
            .registry
            .create_workflow(name, "1.0", &config_id)
            .expect("failed to create test workflow")
    }

    pub fn analysis(&self, name: &str, base: ConfigContent) -> Analysis {
        let config_id = self.config(base);
        self.tracker
            .registry
            .create_analysis(name, None, &config_id)
            .expect("failed to create test analysis")
    }

    pub fn add_source(&self, path: impl AsRef<Path>, text: &str) {
        self.fs.add_file(path, text);
    }

    pub fn launcher(&self) -> BatchLauncher {
        self.tracker
            .launcher(Arc::new(self.fs.clone()), self.trigger.clone())
    }
}

impl Default for TrackerFixture {
    fn default() -> Self {
        Self::new()
    }
}
