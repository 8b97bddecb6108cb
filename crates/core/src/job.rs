// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and lifecycle state machine (C4).
//!
//! `apply_transition` is a pure function from `(job document, transition
//! request)` to a new job document: it clones the input, rewrites only the
//! `spec.status` subtree, and leaves every other key byte-identical. It knows
//! nothing about storage, policy, or the registry.

use crate::error::CoreError;
use crate::pointer::deep_get_str;
use crate::time::format_rfc3339;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;

/// A job's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Running,
    Waiting,
    Completed,
    Failed,
    Expired,
}

crate::simple_display! {
    JobState {
        Created => "created",
        Running => "running",
        Waiting => "waiting",
        Completed => "completed",
        Failed => "failed",
        Expired => "expired",
    }
}

impl FromStr for JobState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "running" => Ok(Self::Running),
            "waiting" => Ok(Self::Waiting),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "expired" => Ok(Self::Expired),
            other => Err(CoreError::contract_violation(
                "INVALID_JOB_STATE",
                format!("unknown JobContract.spec.status.state: {other}"),
            )),
        }
    }
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Expired)
    }

    /// Non-expiry transitions allowed out of this state. `expired` is
    /// reachable from any non-terminal state and is handled separately by
    /// `apply_transition` rather than appearing in this table.
    fn allowed_targets(self) -> &'static [JobState] {
        match self {
            Self::Created => &[Self::Running, Self::Waiting, Self::Completed, Self::Failed],
            Self::Running => &[Self::Waiting, Self::Completed, Self::Failed],
            Self::Waiting => &[Self::Running, Self::Completed, Self::Failed],
            Self::Completed | Self::Failed | Self::Expired => &[],
        }
    }
}

/// Read `job.spec.status.state`.
pub fn current_state(job: &Value) -> Result<JobState, CoreError> {
    JobState::from_str(&deep_get_str(job, &["spec", "status", "state"])?)
}

/// A requested lifecycle transition and the fields it carries.
///
/// Built with `new` plus chained setters, mirroring the dataclass-with-
/// optional-fields shape of the original `TransitionRequest`.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub new_state: JobState,
    pub now: DateTime<Utc>,
    pub final_evaluation_ref: Option<String>,
    pub failure_mode: Option<String>,
    pub failure_details: Option<String>,
    pub expiry_reason: Option<String>,
    pub last_stop_condition: Option<String>,
}

impl TransitionRequest {
    pub fn new(new_state: JobState, now: DateTime<Utc>) -> Self {
        Self {
            new_state,
            now,
            final_evaluation_ref: None,
            failure_mode: None,
            failure_details: None,
            expiry_reason: None,
            last_stop_condition: None,
        }
    }

    crate::setters! {
        option {
            final_evaluation_ref: String,
            failure_mode: String,
            failure_details: String,
            expiry_reason: String,
            last_stop_condition: String,
        }
    }
}

/// Apply a lifecycle transition, returning a new document with only
/// `spec.status` rewritten.
///
/// Same-state transitions are a no-op (returns `job` unchanged, not even a
/// `status_updated_at` bump — invariant 3 requires every *admitted*
/// transition to be audited exactly once, and a no-op transition produces no
/// reachable document change an auditor could distinguish from replay).
pub fn apply_transition(job: &Value, req: &TransitionRequest) -> Result<Value, CoreError> {
    let current = current_state(job)?;

    if req.new_state == current {
        return Ok(job.clone());
    }

    if current.is_terminal() {
        return Err(CoreError::conflict(format!(
            "job is terminal; cannot transition from {current} to {}",
            req.new_state
        )));
    }

    if req.new_state != JobState::Expired && !current.allowed_targets().contains(&req.new_state) {
        return Err(CoreError::conflict(format!("invalid job state transition: {current} -> {}", req.new_state)));
    }

    let mut updated = job.clone();
    let status = updated
        .pointer_mut("/spec/status")
        .and_then(|v| v.as_object_mut())
        .ok_or_else(|| CoreError::contract_violation("INVALID_JOB_STATUS", "invalid JobContract.spec.status shape"))?;

    status.insert("state".into(), Value::String(req.new_state.to_string()));
    status.insert("status_updated_at".into(), Value::String(format_rfc3339(req.now)));

    if req.new_state == JobState::Running && !status.contains_key("started_at") {
        status.insert("started_at".into(), Value::String(format_rfc3339(req.now)));
    }

    if matches!(req.new_state, JobState::Completed | JobState::Failed) {
        let final_ref = req
            .final_evaluation_ref
            .as_deref()
            .ok_or_else(|| CoreError::contract_violation("MISSING_FINAL_EVALUATION_REF", "final_evaluation_ref is required for completed/failed jobs"))?;
        status.insert("final_evaluation_ref".into(), Value::String(final_ref.to_string()));
        status.insert("terminal_at".into(), Value::String(format_rfc3339(req.now)));
    }

    if req.new_state == JobState::Failed {
        let mode = req
            .failure_mode
            .as_deref()
            .ok_or_else(|| CoreError::contract_violation("MISSING_FAILURE_MODE", "failure_mode is required for failed jobs"))?;
        status.insert("failure_mode".into(), Value::String(mode.to_string()));
        if let Some(details) = &req.failure_details {
            status.insert("failure_details".into(), Value::String(details.clone()));
        }
    }

    if req.new_state == JobState::Expired {
        let reason = req
            .expiry_reason
            .as_deref()
            .ok_or_else(|| CoreError::contract_violation("MISSING_EXPIRY_REASON", "expiry_reason is required for expired jobs"))?;
        status.insert("expiry_reason".into(), Value::String(reason.to_string()));
        status.insert("terminal_at".into(), Value::String(format_rfc3339(req.now)));
    }

    if let Some(cond) = &req.last_stop_condition {
        status.insert("last_stop_condition".into(), Value::String(cond.clone()));
    }

    Ok(updated)
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
