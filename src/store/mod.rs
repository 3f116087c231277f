// src/store/mod.rs

//! Durable key-value record storage.
//!
//! - [`RecordStore`] is the storage contract the components are built on.
//! - [`memory`] keeps records in a mutex-guarded map (tests, embedding).
//! - [`file`] keeps one TOML document per record below a root directory.
//!
//! [`Backends`] bundles one store per record kind so the CLI and tests can
//! wire the components together in one place.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::configuration::Configuration;
use crate::errors::{Result, TrackerError};
use crate::fs::FileSystem;
use crate::registry::{Analysis, Workflow};
use crate::runs::AnalysisRun;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A persistable record with a stable primary key.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Record kind, used for error messages and as the on-disk directory name.
    const KIND: &'static str;

    fn key(&self) -> &str;
}

/// Storage contract for one kind of record.
///
/// Implementations must be `Send + Sync` for use behind `Arc<dyn RecordStore<T>>`.
pub trait RecordStore<T: Record>: Send + Sync {
    /// Returns `Ok(None)` when no record with this key exists.
    fn load(&self, key: &str) -> Result<Option<T>>;

    /// Upsert; an existing record with the same key is replaced.
    fn save(&self, record: &T) -> Result<()>;

    /// Insert only if the key is free. Returns `false` (and writes nothing)
    /// when a record with the same key already exists.
    fn insert_new(&self, record: &T) -> Result<bool>;

    /// All records, ordered by key.
    fn list(&self) -> Result<Vec<T>>;
}

/// Upper bound on fresh-id attempts before giving up.
const MAX_ID_ATTEMPTS: usize = 8;

/// Insert a record under a freshly generated UUID key.
///
/// `build` receives the candidate key; the record is only written if no
/// record with that key exists, so two allocations never share a key.
pub fn insert_with_fresh_id<T: Record>(
    store: &dyn RecordStore<T>,
    mut build: impl FnMut(String) -> T,
) -> Result<T> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let record = build(Uuid::new_v4().to_string());
        if store.insert_new(&record)? {
            return Ok(record);
        }
        debug!(kind = T::KIND, key = %record.key(), "generated id already taken; retrying");
    }

    Err(TrackerError::Other(anyhow::anyhow!(
        "could not allocate a unique {} id after {MAX_ID_ATTEMPTS} attempts",
        T::KIND
    )))
}

/// One record store per record kind.
#[derive(Clone)]
pub struct Backends {
    pub configurations: Arc<dyn RecordStore<Configuration>>,
    pub workflows: Arc<dyn RecordStore<Workflow>>,
    pub analyses: Arc<dyn RecordStore<Analysis>>,
    pub runs: Arc<dyn RecordStore<AnalysisRun>>,
}

impl Backends {
    pub fn in_memory() -> Self {
        Self {
            configurations: Arc::new(MemoryStore::<Configuration>::new()),
            workflows: Arc::new(MemoryStore::<Workflow>::new()),
            analyses: Arc::new(MemoryStore::<Analysis>::new()),
            runs: Arc::new(MemoryStore::<AnalysisRun>::new()),
        }
    }

    /// File-backed stores rooted at `root` (e.g. `.tracker/`).
    pub fn on_disk(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            configurations: Arc::new(FileStore::<Configuration>::new(fs.clone(), root.clone())),
            workflows: Arc::new(FileStore::<Workflow>::new(fs.clone(), root.clone())),
            analyses: Arc::new(FileStore::<Analysis>::new(fs.clone(), root.clone())),
            runs: Arc::new(FileStore::<AnalysisRun>::new(fs, root)),
        }
    }
}
