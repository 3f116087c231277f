// src/store/file.rs

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::{Record, RecordStore};
use crate::errors::{Result, TrackerError};
use crate::fs::FileSystem;

const RECORD_EXTENSION: &str = "toml";

/// Stores each record as `<root>/<kind>/<key>.toml`.
///
/// The write lock serialises `save` and `insert_new` within this process so
/// the existence check and the write in `insert_new` cannot interleave with
/// another allocation.
pub struct FileStore<T> {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> FileStore<T> {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl AsRef<Path>) -> Self {
        Self {
            fs,
            dir: root.as_ref().join(T::KIND),
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    fn record_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(TrackerError::InvalidInput(format!(
                "{} key {:?} cannot be used as a file name",
                T::KIND,
                key
            )));
        }
        Ok(self.dir.join(format!("{key}.{RECORD_EXTENSION}")))
    }

    fn read_record(&self, path: &Path) -> Result<T> {
        let text = self.fs.read_to_string(path)?;
        let record: T = toml::from_str(&text)?;
        Ok(record)
    }

    fn write_record(&self, path: &Path, record: &T) -> Result<()> {
        let text = toml::to_string(record)?;
        self.fs.write(path, text.as_bytes())?;
        Ok(())
    }
}

impl<T: Record> RecordStore<T> for FileStore<T> {
    fn load(&self, key: &str) -> Result<Option<T>> {
        let path = self.record_path(key)?;
        if !self.fs.is_file(&path) {
            return Ok(None);
        }
        self.read_record(&path).map(Some)
    }

    fn save(&self, record: &T) -> Result<()> {
        let path = self.record_path(record.key())?;
        let _guard = self.write_lock.lock().map_err(|_| TrackerError::LockPoisoned)?;
        self.write_record(&path, record)?;
        debug!(kind = T::KIND, key = %record.key(), path = ?path, "stored record (file)");
        Ok(())
    }

    fn insert_new(&self, record: &T) -> Result<bool> {
        let path = self.record_path(record.key())?;
        let _guard = self.write_lock.lock().map_err(|_| TrackerError::LockPoisoned)?;
        if self.fs.exists(&path) {
            return Ok(false);
        }
        self.write_record(&path, record)?;
        debug!(kind = T::KIND, key = %record.key(), path = ?path, "inserted record (file)");
        Ok(true)
    }

    fn list(&self) -> Result<Vec<T>> {
        if !self.fs.is_dir(&self.dir) {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = self
            .fs
            .read_dir(&self.dir)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == RECORD_EXTENSION))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            if !self.fs.is_file(&path) {
                warn!(path = ?path, "skipping non-file entry in record directory");
                continue;
            }
            records.push(self.read_record(&path)?);
        }
        records.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(records)
    }
}
