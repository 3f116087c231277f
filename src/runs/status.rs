// src/runs/status.rs

//! Forward-only transition table for [`RunStatus`].
//!
//! ```text
//! created ──► scheduled ──► running ──► completed
//!    │            │            └──────► failed
//!    │            ├───────────────────► failed     (trigger rejected)
//!    └────────────┴───────────────────► cancelled
//! ```
//!
//! `completed`, `failed` and `cancelled` are terminal. Anything not listed,
//! including skipping `scheduled` and re-entering the current status, is
//! rejected.

use crate::types::RunStatus;

/// Statuses reachable in one step from `from`.
pub fn allowed_next(from: RunStatus) -> &'static [RunStatus] {
    match from {
        RunStatus::Created => &[RunStatus::Scheduled, RunStatus::Cancelled],
        RunStatus::Scheduled => &[RunStatus::Running, RunStatus::Cancelled, RunStatus::Failed],
        RunStatus::Running => &[RunStatus::Completed, RunStatus::Failed],
        RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled => &[],
    }
}

pub fn can_transition(from: RunStatus, to: RunStatus) -> bool {
    allowed_next(from).contains(&to)
}

pub fn is_terminal(status: RunStatus) -> bool {
    allowed_next(status).is_empty()
}
