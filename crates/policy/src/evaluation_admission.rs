// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluation admission (§4.3.6): the one place a policy check has a side
//! effect. An evaluation arriving after a job's `expires_at` has passed
//! forces the job to `expired`, records `job_expired`, and only then
//! rejects the evaluation — the core never silently drops the expiry.

use bp_core::job::{apply_transition, current_state, JobState, TransitionRequest};
use bp_core::pointer::{deep_get, deep_get_array_or_empty, deep_get_str};
use bp_core::time::parse_rfc3339;
use bp_core::{CoreError, CoreResult};
use bp_registry::Registry;
use bp_schema::{Kind, SchemaValidator};
use bp_storage::JobStore;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// §4.3.6. Returns the fetched job document on success (unchanged — this
/// function never mutates a job that survives admission).
pub fn enforce_evaluation_admission(
    evaluation: &Value,
    registry: &Registry,
    jobs: &JobStore<'_>,
    schemas: &SchemaValidator,
    now: DateTime<Utc>,
) -> CoreResult<Value> {
    let org_id = deep_get_str(evaluation, &["metadata", "org_id"])?;
    let job_id = deep_get_str(evaluation, &["spec", "job_ref", "job_id"])?;

    let job = jobs.get(&job_id)?;
    let job_org_id = deep_get_str(&job, &["metadata", "org_id"])?;
    if job_org_id != org_id {
        return Err(CoreError::policy("Evaluation.metadata.org_id must match JobContract.metadata.org_id"));
    }

    let current = current_state(&job)?;
    if current.is_terminal() {
        return Err(CoreError::conflict(format!("Cannot apply evaluation to terminal job (state={current})")));
    }

    let expires_at = parse_rfc3339(&deep_get_str(&job, &["spec", "timestamps", "expires_at"])?)?;
    if expires_at <= now {
        let expired = apply_transition(&job, &TransitionRequest::new(JobState::Expired, now).expiry_reason("expires_at_reached"))?;
        schemas.validate(Kind::JobContract, &expired)?;
        jobs.update(&expired)?;
        jobs.record_event(&org_id, &job_id, "job_expired", &serde_json::json!({"reason": "expires_at_reached"}), now)?;
        return Err(CoreError::conflict("Job is expired; evaluation cannot be applied"));
    }

    let evaluator = deep_get(evaluation, &["spec", "evaluator"])?;
    let actor_type = evaluator.get("actor_type").and_then(Value::as_str).unwrap_or("");
    let actor_id = evaluator.get("actor_id").and_then(Value::as_str).unwrap_or("");
    let declared_authority = evaluator.get("authority_level").and_then(Value::as_str).unwrap_or("");

    if actor_type == "agent" {
        let agent = registry.get_agent(actor_id).ok_or_else(|| CoreError::not_found("AgentDefinition", actor_id))?;
        let agent_authority = deep_get_str(agent, &["spec", "authority", "level"])?;
        if agent_authority != declared_authority {
            return Err(CoreError::policy("Evaluation evaluator authority_level does not match AgentDefinition authority level"));
        }

        if !registry.has_org(&org_id) {
            return Err(CoreError::policy("Cannot validate evaluator membership: org_id not found in registry"));
        }
        let included = registry.included_agent_ids_for_org(&org_id)?;
        if !included.contains(actor_id) {
            return Err(CoreError::policy("Evaluator agent is not included in OrganizationManifest.spec.agent_roles"));
        }

        for decision in deep_get_array_or_empty(evaluation, &["spec", "artifact_decisions"]) {
            let producing = decision.get("producing_agent_id").and_then(Value::as_str).unwrap_or("");
            if !producing.is_empty() && producing == actor_id {
                return Err(CoreError::policy("Self-evaluation is prohibited (evaluator matches producing_agent_id)"));
            }
        }
    }

    Ok(job)
}

#[cfg(test)]
#[path = "evaluation_admission_tests.rs"]
mod tests;
