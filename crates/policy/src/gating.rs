// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run gating (§4.3.4): concurrency and rate limits checked against live
//! counters in C5 at run-request time. Only called when the job's `org_id`
//! is registered; callers skip gating entirely for unknown orgs.

use bp_core::job::JobState;
use bp_core::pointer::deep_get_i64;
use bp_core::{CoreError, CoreResult};
use bp_storage::JobStore;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// §4.3.4: reject a run request that would exceed the org's concurrency or
/// start-rate limits. `current_state` is the job's state at the moment of
/// the run request (caller has already established it is `created` or
/// `waiting`).
pub fn enforce_run_gating(org: &Value, org_id: &str, current_state: JobState, jobs: &JobStore<'_>, now: DateTime<Utc>) -> CoreResult<()> {
    let max_active_jobs = deep_get_i64(org, &["spec", "execution_limits", "concurrency", "max_active_jobs"])?;
    if max_active_jobs <= 0 {
        return Err(CoreError::policy(format!("Org execution is disabled (max_active_jobs={max_active_jobs})")));
    }

    let active = jobs.count_active_by_org(org_id)?;
    match current_state {
        JobState::Created if active >= max_active_jobs => {
            return Err(CoreError::policy("Org max_active_jobs limit reached"));
        }
        JobState::Waiting if active > max_active_jobs => {
            return Err(CoreError::policy("Org max_active_jobs limit reached"));
        }
        _ => {}
    }

    let max_starts = deep_get_i64(org, &["spec", "execution_limits", "rate_limits", "max_job_starts_per_minute"])?;
    if max_starts <= 0 {
        return Err(CoreError::policy(format!("Org job starts are disabled (max_job_starts_per_minute={max_starts})")));
    }

    let since = now - Duration::seconds(60);
    let starts = jobs.count_events_since(org_id, "job_started", since)?;
    if starts >= max_starts {
        return Err(CoreError::policy("Org rate limit exceeded (max_job_starts_per_minute)"));
    }

    Ok(())
}

#[cfg(test)]
#[path = "gating_tests.rs"]
mod tests;
