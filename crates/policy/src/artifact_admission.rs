// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact admission (§4.3.5): an artifact may only be attached to a known,
//! non-terminal job in the same org, of a type the org allows, produced by
//! an agent the org includes.

use bp_core::job::JobState;
use bp_core::pointer::{deep_get_array_or_empty, deep_get_str, deep_get_str_opt};
use bp_core::{CoreError, CoreResult};
use bp_registry::Registry;
use bp_storage::JobStore;
use serde_json::Value;
use std::str::FromStr;

/// §4.3.5: fetches the referenced job itself (C3 depends on C5's job
/// store), so callers need only the artifact document and the registry.
pub fn enforce_artifact_admission(artifact: &Value, registry: &Registry, jobs: &JobStore<'_>) -> CoreResult<()> {
    let job_id = deep_get_str(artifact, &["spec", "job_ref", "job_id"])?;
    let org_id = deep_get_str(artifact, &["metadata", "org_id"])?;
    let artifact_type = deep_get_str(artifact, &["metadata", "artifact_type"])?;
    let producing_agent_id = deep_get_str_opt(artifact, &["spec", "produced_by", "agent_id"]);

    let job = jobs.get(&job_id)?;
    let job_org_id = deep_get_str(&job, &["metadata", "org_id"])?;
    if job_org_id != org_id {
        return Err(CoreError::policy("Artifact.metadata.org_id must match JobContract.metadata.org_id"));
    }

    let state = JobState::from_str(&deep_get_str(&job, &["spec", "status", "state"])?)?;
    if state.is_terminal() {
        return Err(CoreError::conflict(format!("Cannot submit artifact for terminal job (state={state})")));
    }

    let org = registry.get_org(&org_id).ok_or_else(|| CoreError::policy(format!("Unknown org_id: {org_id}")))?;
    let allowed = deep_get_array_or_empty(org, &["spec", "artifact_policy", "allowed_types"]);
    let allowed = allowed.iter().filter_map(|v| v.get("type_id")).filter_map(Value::as_str).collect::<Vec<_>>();
    if !allowed.contains(&artifact_type.as_str()) {
        return Err(CoreError::policy(format!("Artifact type {artifact_type} is not allowed by org policy")));
    }

    if let Some(producing_agent_id) = producing_agent_id.filter(|s| !s.is_empty()) {
        let included = registry.included_agent_ids_for_org(&org_id)?;
        if !included.contains(&producing_agent_id) {
            return Err(CoreError::policy(format!("Producing agent {producing_agent_id} is not included in org {org_id}")));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "artifact_admission_tests.rs"]
mod tests;
