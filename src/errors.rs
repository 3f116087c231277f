// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::RunStatus;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid configuration source: {0}")]
    InvalidSource(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid status transition for run {run_id}: {from} -> {to}")]
    InvalidTransition {
        run_id: String,
        from: RunStatus,
        to: RunStatus,
    },

    #[error("Trigger failed: {0}")]
    Trigger(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrackerError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        TrackerError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
