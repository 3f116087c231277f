// src/settings/loader.rs

use std::path::Path;

use tracing::debug;

use crate::errors::{Result, TrackerError};
use crate::fs::FileSystem;
use crate::settings::model::{RawSettings, Settings};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "Tracker.toml";

/// Load a settings file and return the raw, unvalidated `RawSettings`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for
/// the checked form.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawSettings> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;

    let raw: RawSettings = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a settings file from path and run validation.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<Settings> {
    let raw = load_from_path(fs, &path)?;
    Settings::try_from(raw)
}

/// Resolve the settings for a CLI invocation.
///
/// - An explicit path must exist.
/// - Without one, [`DEFAULT_SETTINGS_FILE`] is used if present, otherwise
///   the built-in defaults apply.
pub fn load_or_default(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => {
            if !fs.is_file(path) {
                return Err(TrackerError::InvalidInput(format!(
                    "settings file {} does not exist",
                    path.display()
                )));
            }
            load_and_validate(fs, path)
        }
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if fs.is_file(default_path) {
                load_and_validate(fs, default_path)
            } else {
                debug!("no {DEFAULT_SETTINGS_FILE} found; using built-in settings");
                Settings::try_from(RawSettings::default())
            }
        }
    }
}
