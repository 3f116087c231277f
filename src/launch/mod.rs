// src/launch/mod.rs

//! Batch launching of analysis runs.
//!
//! - [`trigger`] defines the narrow interface to the external workflow
//!   engine ([`Trigger`]) and the payload handed to it.
//! - [`command`] is the production trigger: it runs an external command
//!   (by default the Airflow CLI) once per run.
//! - [`launcher`] turns a directory of configuration files into one tracked,
//!   scheduled and triggered run per file.

pub mod command;
pub mod launcher;
pub mod trigger;

pub use command::CommandTrigger;
pub use launcher::{BatchLauncher, LaunchOutcome, LaunchReport, LaunchRequest};
pub use trigger::{Trigger, TriggerFuture, TriggerPayload, TriggerReceipt};
