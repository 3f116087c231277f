// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // child names
    /// Link to another mock path, stored as given.
    Symlink(PathBuf),
}

/// Links followed before a path is treated as dangling.
const MAX_LINK_DEPTH: usize = 8;

/// In-memory filesystem for tests.
///
/// Paths are stored exactly as given; parents are created implicitly when a
/// file is added. Clones share the same underlying tree.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        // A poisoned mock only happens after a panicking test; keep going.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        entries.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_to_parent(&mut entries, &path);
    }

    /// Create an (empty) directory and any missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.lock();
        Self::ensure_dir(&mut entries, path.as_ref());
    }

    /// Add a symlink at `link` pointing to the mock path `target`.
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = link.as_ref().to_path_buf();
        let mut entries = self.lock();
        entries.insert(link.clone(), MockEntry::Symlink(target.as_ref().to_path_buf()));
        Self::link_to_parent(&mut entries, &link);
    }

    /// Number of files currently stored below `prefix`.
    pub fn file_count_under(&self, prefix: impl AsRef<Path>) -> usize {
        let prefix = prefix.as_ref();
        self.lock()
            .iter()
            .filter(|(path, entry)| path.starts_with(prefix) && matches!(entry, MockEntry::File(_)))
            .count()
    }

    /// Follow symlinks from `path` to the entry they end at.
    fn resolve<'a>(
        entries: &'a BTreeMap<PathBuf, MockEntry>,
        path: &Path,
    ) -> Option<&'a MockEntry> {
        let mut entry = entries.get(path)?;
        for _ in 0..MAX_LINK_DEPTH {
            match entry {
                MockEntry::Symlink(target) => entry = entries.get(target)?,
                other => return Some(other),
            }
        }
        None
    }

    fn parent_of(path: &Path) -> Option<&Path> {
        let parent = path.parent()?;
        if parent.as_os_str().is_empty() {
            Some(Path::new("."))
        } else {
            Some(parent)
        }
    }

    fn ensure_dir(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        Self::link_to_parent(entries, path);
    }

    fn link_to_parent(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = Self::parent_of(path) else {
            return;
        };
        if parent == path {
            return;
        }
        Self::ensure_dir(entries, parent);

        if let (Some(MockEntry::Dir(children)), Some(name)) = (
            entries.get_mut(parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.lock();
        match Self::resolve(&entries, path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        Self::resolve(&self.lock(), path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(Self::resolve(&self.lock(), path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(Self::resolve(&self.lock(), path), Some(MockEntry::Dir(_)))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Symlink(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match Self::resolve(&self.lock(), path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
