// src/fs/mod.rs

//! Filesystem access used for configuration sources and durable records.
//!
//! Everything that touches disk goes through [`FileSystem`], so tests can
//! swap in [`mock::MockFileSystem`] and keep the whole batch pipeline in
//! memory.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Write a whole file, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    /// `is_file` and `is_dir` follow symlinks.
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// True if `path` itself is a symlink, whatever it points at.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Full paths of the entries directly inside `path`.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .with_context(|| format!("listing {}", path.display()))?
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .with_context(|| format!("listing {}", path.display()))
            })
            .collect()
    }
}

/// Recursively collect every regular file below `root`.
///
/// Symlinked directories are listed but never descended into, so a link
/// pointing back up the tree cannot yield the same source twice. Symlinks
/// to files are collected like regular files.
///
/// The result is sorted lexicographically by path so batch processing is
/// deterministic regardless of the order the OS returns directory entries.
pub fn walk_files(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in fs.read_dir(&dir)? {
            if fs.is_dir(&entry) {
                if fs.is_symlink(&entry) {
                    debug!(path = %entry.display(), "not following symlinked directory");
                } else {
                    stack.push(entry);
                }
            } else if fs.is_file(&entry) {
                files.push(entry);
            }
        }
    }

    files.sort();
    Ok(files)
}
