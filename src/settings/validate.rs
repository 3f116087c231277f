// src/settings/validate.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{Result, TrackerError};
use crate::settings::model::{RawSettings, Settings};

/// Placeholders `CommandTrigger` knows how to fill in.
pub const KNOWN_PLACEHOLDERS: [&str; 3] = ["target", "run_id", "payload"];

pub(crate) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    // Infallible: the pattern is a literal.
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap()
});

impl TryFrom<RawSettings> for Settings {
    type Error = TrackerError;

    fn try_from(raw: RawSettings) -> std::result::Result<Self, Self::Error> {
        validate_settings(&raw)?;
        Ok(Settings::new_unchecked(raw.store, raw.trigger))
    }
}

pub fn validate_settings(raw: &RawSettings) -> Result<()> {
    validate_store(raw)?;
    validate_trigger(raw)?;
    Ok(())
}

fn validate_store(raw: &RawSettings) -> Result<()> {
    if raw.store.root.as_os_str().is_empty() {
        return Err(TrackerError::Settings(
            "[store].root must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_trigger(raw: &RawSettings) -> Result<()> {
    if raw.trigger.program.trim().is_empty() {
        return Err(TrackerError::Settings(
            "[trigger].program must not be empty".to_string(),
        ));
    }

    for arg in raw.trigger.args.iter() {
        for caps in PLACEHOLDER.captures_iter(arg) {
            let name = &caps[1];
            if !KNOWN_PLACEHOLDERS.contains(&name) {
                return Err(TrackerError::Settings(format!(
                    "[trigger].args uses unknown placeholder '{{{}}}' in {:?} (expected one of {{target}}, {{run_id}}, {{payload}})",
                    name, arg
                )));
            }
        }
    }
    Ok(())
}
