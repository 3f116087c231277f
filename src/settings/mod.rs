// src/settings/mod.rs

//! Settings for the `tracker` tool itself.
//!
//! Not to be confused with tracked [`Configuration`](crate::configuration::Configuration)
//! documents. Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a settings file from disk (`loader.rs`).
//! - Validate basic invariants like trigger placeholders (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_SETTINGS_FILE, load_and_validate, load_from_path, load_or_default};
pub use model::{RawSettings, Settings, StoreSection, TriggerSection};
