use std::sync::Mutex;

use tracker::errors::TrackerError;
use tracker::launch::{Trigger, TriggerFuture, TriggerPayload, TriggerReceipt};

/// A fake trigger that:
/// - records every (target, payload) it is handed
/// - accepts the run, unless the payload's config contains a key it was told
///   to reject.
#[derive(Default)]
pub struct FakeTrigger {
    received: Mutex<Vec<(String, TriggerPayload)>>,
    reject_key: Option<String>,
}

impl FakeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every payload whose effective config has `key`.
    pub fn rejecting_key(key: &str) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            reject_key: Some(key.to_string()),
        }
    }

    /// Everything handed to the trigger so far, accepted or not.
    pub fn received(&self) -> Vec<(String, TriggerPayload)> {
        self.received.lock().unwrap().clone()
    }

    pub fn payload_for(&self, run_id: &str) -> Option<TriggerPayload> {
        self.received()
            .into_iter()
            .map(|(_, payload)| payload)
            .find(|payload| payload.analysis_run_id == run_id)
    }
}

impl Trigger for FakeTrigger {
    fn trigger<'a>(&'a self, target: &'a str, payload: TriggerPayload) -> TriggerFuture<'a> {
        Box::pin(async move {
            self.received
                .lock()
                .unwrap()
                .push((target.to_string(), payload.clone()));

            if let Some(key) = &self.reject_key {
                if payload.config.contains_key(key) {
                    return Err(TrackerError::Trigger(format!(
                        "fake engine rejected run {}",
                        payload.analysis_run_id
                    )));
                }
            }

            Ok(TriggerReceipt {
                analysis_run_id: payload.analysis_run_id,
                target: target.to_string(),
                detail: "accepted".to_string(),
            })
        })
    }
}
