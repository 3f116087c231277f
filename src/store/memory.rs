// src/store/memory.rs

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::debug;

use super::{Record, RecordStore};
use crate::errors::{Result, TrackerError};

/// Stores records in memory only (lost on restart).
pub struct MemoryStore<T> {
    map: Mutex<BTreeMap<String, T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordStore<T> for MemoryStore<T> {
    fn load(&self, key: &str) -> Result<Option<T>> {
        let map = self.map.lock().map_err(|_| TrackerError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn save(&self, record: &T) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| TrackerError::LockPoisoned)?;
        map.insert(record.key().to_string(), record.clone());
        debug!(kind = T::KIND, key = %record.key(), "stored record (memory)");
        Ok(())
    }

    fn insert_new(&self, record: &T) -> Result<bool> {
        let mut map = self.map.lock().map_err(|_| TrackerError::LockPoisoned)?;
        if map.contains_key(record.key()) {
            return Ok(false);
        }
        map.insert(record.key().to_string(), record.clone());
        debug!(kind = T::KIND, key = %record.key(), "inserted record (memory)");
        Ok(true)
    }

    fn list(&self) -> Result<Vec<T>> {
        let map = self.map.lock().map_err(|_| TrackerError::LockPoisoned)?;
        Ok(map.values().cloned().collect())
    }
}
