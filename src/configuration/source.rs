// src/configuration/source.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::configuration::ConfigContent;
use crate::errors::{Result, TrackerError};
use crate::fs::FileSystem;
use crate::types::ConfigId;

/// Length of a name-derived config id (hex characters of a blake3 digest).
const DERIVED_ID_LEN: usize = 32;

/// Format of a configuration document, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Toml,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Toml,
        }
    }
}

/// Raw configuration document as read from disk.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// File name (last path component); the input for name-derived ids.
    pub name: String,
    pub path: PathBuf,
    pub format: SourceFormat,
    pub text: String,
}

impl ConfigSource {
    /// Read a source document through the given filesystem.
    pub fn read(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.is_file(path) {
            return Err(TrackerError::InvalidSource(format!(
                "{} is not a readable file",
                path.display()
            )));
        }

        let text = fs.read_to_string(path).map_err(|e| {
            TrackerError::InvalidSource(format!("{}: {e:#}", path.display()))
        })?;

        Ok(Self::from_text(path, text))
    }

    /// Build a source from text already in memory.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let format = SourceFormat::from_path(&path);

        Self {
            name,
            path,
            format,
            text: text.into(),
        }
    }

    /// Parse the document into an option mapping.
    ///
    /// The top level must be a table (TOML) or an object (JSON).
    pub fn parse(&self) -> Result<ConfigContent> {
        let parsed = match self.format {
            SourceFormat::Toml => toml::from_str::<ConfigContent>(&self.text)
                .map_err(|e| format!("{}: {e}", self.path.display())),
            SourceFormat::Json => serde_json::from_str::<ConfigContent>(&self.text)
                .map_err(|e| format!("{}: {e}", self.path.display())),
        };

        let content = parsed.map_err(TrackerError::InvalidSource)?;
        debug!(
            source = %self.path.display(),
            keys = content.len(),
            "parsed configuration source"
        );
        Ok(content)
    }

    pub fn derived_id(&self) -> ConfigId {
        derive_config_id(&self.name)
    }
}

/// Deterministic config id for a source file name.
///
/// Same name, same id; the directory the file lives in does not matter.
pub fn derive_config_id(name: &str) -> ConfigId {
    let hash = blake3::hash(name.as_bytes()).to_hex();
    hash.as_str()[..DERIVED_ID_LEN].to_string()
}
