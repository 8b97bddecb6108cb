// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission-time checks that run before a JobContract is ever persisted
//! (§4.3.1, §4.3.2). Neither function touches storage or the registry.

use crate::limits::LimitsConfig;
use bp_core::pointer::{deep_get, deep_get_f64, deep_get_i64, deep_get_str};
use bp_core::time::parse_rfc3339;
use bp_core::{CoreError, CoreResult};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

const FORBIDDEN_AT_SUBMISSION: &[&str] =
    &["started_at", "terminal_at", "final_evaluation_ref", "failure_mode", "expiry_reason"];

/// §4.3.1: extra rules beyond schema shape to prevent ambiguous or
/// misleading created jobs.
pub fn enforce_job_contract_submission_shape(job: &Value) -> CoreResult<()> {
    let status = deep_get(job, &["spec", "status"])?;
    let state = status.get("state").and_then(Value::as_str).unwrap_or("");
    if state != "created" {
        return Err(CoreError::policy("JobContract.spec.status.state must be 'created' at submission time"));
    }
    for forbidden in FORBIDDEN_AT_SUBMISSION {
        if status.get(*forbidden).is_some() {
            return Err(CoreError::policy(format!(
                "JobContract.spec.status must not include '{forbidden}' when state=created"
            )));
        }
    }
    Ok(())
}

/// §4.3.2: global hard limits and basic timestamp sanity, enforced
/// regardless of org policy.
pub fn enforce_job_contract_limits(job: &Value, limits: &LimitsConfig, now: DateTime<Utc>) -> CoreResult<()> {
    let created_at = parse_rfc3339(&deep_get_str(job, &["spec", "timestamps", "created_at"])?)?;
    let expires_at = parse_rfc3339(&deep_get_str(job, &["spec", "timestamps", "expires_at"])?)?;

    if expires_at <= created_at {
        return Err(CoreError::policy("JobContract.spec.timestamps.expires_at must be after created_at"));
    }
    if expires_at <= now {
        return Err(CoreError::policy("JobContract is already expired (expires_at is in the past)"));
    }

    let max_expires = Duration::seconds(limits.max_expires_in_seconds_upper_bound);
    if expires_at - created_at > max_expires {
        return Err(CoreError::policy(format!(
            "JobContract expires_at exceeds global upper bound ({}s)",
            limits.max_expires_in_seconds_upper_bound
        )));
    }

    let max_iterations = deep_get_i64(job, &["spec", "execution_limits", "max_iterations"])?;
    let max_runtime_seconds = deep_get_i64(job, &["spec", "execution_limits", "max_runtime_seconds"])?;
    let currency = deep_get_str(job, &["spec", "execution_limits", "cost_cap", "currency"])?;
    let max_cost = deep_get_f64(job, &["spec", "execution_limits", "cost_cap", "max_cost"])?;

    if max_iterations > limits.max_iterations_upper_bound {
        return Err(CoreError::policy(format!(
            "JobContract.max_iterations exceeds global upper bound ({})",
            limits.max_iterations_upper_bound
        )));
    }
    if max_runtime_seconds > limits.max_runtime_seconds_upper_bound {
        return Err(CoreError::policy(format!(
            "JobContract.max_runtime_seconds exceeds global upper bound ({})",
            limits.max_runtime_seconds_upper_bound
        )));
    }
    if currency != limits.max_cost_upper_bound_currency {
        return Err(CoreError::policy(format!(
            "JobContract.cost_cap.currency must be {} (got {currency})",
            limits.max_cost_upper_bound_currency
        )));
    }
    if max_cost > limits.max_cost_upper_bound {
        return Err(CoreError::policy(format!(
            "JobContract.cost_cap.max_cost exceeds global upper bound ({})",
            limits.max_cost_upper_bound
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
