// src/launch/command.rs

//! Trigger that shells out to the workflow engine's CLI.

use std::process::Stdio;

use regex::Captures;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{Result, TrackerError};
use crate::launch::trigger::{Trigger, TriggerFuture, TriggerPayload, TriggerReceipt};
use crate::settings::TriggerSection;
use crate::settings::validate::PLACEHOLDER;

/// Runs `program args...` once per triggered run.
///
/// Each argument may contain `{target}`, `{run_id}` and `{payload}`
/// placeholders, replaced with the workflow name, the analysis run id and
/// the JSON payload respectively. Arguments are passed directly to the
/// process, not through a shell.
#[derive(Debug, Clone)]
pub struct CommandTrigger {
    program: String,
    args: Vec<String>,
}

impl CommandTrigger {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_settings(section: &TriggerSection) -> Self {
        Self::new(section.program.clone(), section.args.clone())
    }

    /// Expand placeholders for one invocation.
    ///
    /// Substitution is a single pass over each argument: text that comes
    /// from a substituted value is never expanded again.
    pub fn render_args(&self, target: &str, run_id: &str, payload_json: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                PLACEHOLDER
                    .replace_all(arg, |caps: &Captures<'_>| match &caps[1] {
                        "target" => target.to_string(),
                        "run_id" => run_id.to_string(),
                        "payload" => payload_json.to_string(),
                        _ => caps[0].to_string(),
                    })
                    .into_owned()
            })
            .collect()
    }

    async fn run(&self, target: &str, payload: TriggerPayload) -> Result<TriggerReceipt> {
        let payload_json = payload.to_json()?;
        let args = self.render_args(target, &payload.analysis_run_id, &payload_json);

        info!(
            program = %self.program,
            workflow = target,
            run_id = %payload.analysis_run_id,
            "triggering workflow"
        );
        debug!(?args, "trigger command arguments");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                TrackerError::Trigger(format!("could not start '{}': {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TrackerError::Trigger(format!(
                "'{}' exited with {}: {}",
                self.program, output.status, stderr
            )));
        }

        Ok(TriggerReceipt {
            analysis_run_id: payload.analysis_run_id,
            target: target.to_string(),
            detail: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        })
    }
}

impl Trigger for CommandTrigger {
    fn trigger<'a>(&'a self, target: &'a str, payload: TriggerPayload) -> TriggerFuture<'a> {
        Box::pin(self.run(target, payload))
    }
}
