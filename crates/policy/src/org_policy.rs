// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projects a job's requested artifacts, permissions snapshot, and
//! execution limits onto the owning org's policy (§4.3.3). Assumes the job's
//! `org_id` is present in the registry — callers check that first.

use bp_core::pointer::{deep_get_array_or_empty, deep_get_opt, deep_get_str};
use bp_core::{CoreError, CoreResult};
use serde_json::Value;
use std::collections::HashSet;

/// §4.3.3: run every org-policy projection against `job`.
pub fn enforce_job_within_org_policy(job: &Value, org: &Value) -> CoreResult<()> {
    enforce_required_artifacts_allowed(job, org)?;
    enforce_permissions_snapshot(job, org)?;
    enforce_execution_limits_vs_org(job, org)?;
    Ok(())
}

fn string_set<'a>(items: &'a [Value]) -> HashSet<&'a str> {
    items.iter().filter_map(Value::as_str).collect()
}

fn type_id_set(items: &[Value]) -> HashSet<&str> {
    items.iter().filter_map(|v| v.get("type_id")).filter_map(Value::as_str).collect()
}

fn enforce_required_artifacts_allowed(job: &Value, org: &Value) -> CoreResult<()> {
    let required = deep_get_array_or_empty(job, &["spec", "required_artifacts"]);
    let allowed_types = deep_get_array_or_empty(org, &["spec", "artifact_policy", "allowed_types"]);
    let denied_types = deep_get_array_or_empty(org, &["spec", "artifact_policy", "denied_types"]);

    let allowed_ids = type_id_set(allowed_types);
    let denied_ids = type_id_set(denied_types);

    for ra in required {
        let artifact_type = ra.get("artifact_type").and_then(Value::as_str).unwrap_or("");
        if denied_ids.contains(artifact_type) {
            return Err(CoreError::policy(format!("Artifact type is explicitly denied by org policy: {artifact_type}")));
        }
        if !allowed_ids.contains(artifact_type) {
            return Err(CoreError::policy(format!("Artifact type is not allowed by org policy: {artifact_type}")));
        }
    }
    Ok(())
}

fn enforce_permissions_snapshot(job: &Value, org: &Value) -> CoreResult<()> {
    enforce_skill_permissions(job, org)?;
    enforce_mcp_permissions(job, org)?;
    enforce_direct_network_permissions(job, org)?;
    Ok(())
}

fn enforce_skill_permissions(job: &Value, org: &Value) -> CoreResult<()> {
    let default_rule = deep_get_opt(org, &["spec", "skill_policy", "default_rule"]).and_then(Value::as_str).unwrap_or("deny");
    let allow_ids = string_set(deep_get_array_or_empty(org, &["spec", "skill_policy", "allow", "skill_ids"]));
    let allow_cats = string_set(deep_get_array_or_empty(org, &["spec", "skill_policy", "allow", "skill_categories"]));
    let deny_ids = string_set(deep_get_array_or_empty(org, &["spec", "skill_policy", "deny", "skill_ids"]));
    let deny_cats = string_set(deep_get_array_or_empty(org, &["spec", "skill_policy", "deny", "skill_categories"]));

    let job_skill_ids = deep_get_array_or_empty(job, &["spec", "permissions_snapshot", "skills", "allowed_skill_ids"]);
    let job_skill_cats = deep_get_array_or_empty(job, &["spec", "permissions_snapshot", "skills", "allowed_skill_categories"]);

    for sid in job_skill_ids.iter().filter_map(Value::as_str) {
        if deny_ids.contains(sid) {
            return Err(CoreError::policy(format!("Job permissions_snapshot includes denied skill_id: {sid}")));
        }
        if allow_ids.contains(sid) {
            continue;
        }
        if default_rule == "allow" {
            continue;
        }
        return Err(CoreError::policy(format!("Job permissions_snapshot skill_id not allowed by org policy: {sid}")));
    }

    for cat in job_skill_cats.iter().filter_map(Value::as_str) {
        if deny_cats.contains(cat) {
            return Err(CoreError::policy(format!("Job permissions_snapshot includes denied skill_category: {cat}")));
        }
        if allow_cats.contains(cat) {
            continue;
        }
        if default_rule == "allow" {
            continue;
        }
        return Err(CoreError::policy(format!("Job permissions_snapshot skill_category not allowed by org policy: {cat}")));
    }

    Ok(())
}

fn enforce_mcp_permissions(job: &Value, org: &Value) -> CoreResult<()> {
    let org_allowed = deep_get_array_or_empty(org, &["spec", "external_access", "mcp", "allowed"]);
    let job_allowed = deep_get_array_or_empty(job, &["spec", "permissions_snapshot", "mcp", "allowed"]);

    for item in job_allowed {
        let mcp_id = item.get("mcp_id").and_then(Value::as_str).unwrap_or("");
        let org_entry = org_allowed
            .iter()
            .find(|o| o.get("mcp_id").and_then(Value::as_str) == Some(mcp_id))
            .ok_or_else(|| CoreError::policy(format!("Job permissions_snapshot includes MCP not allowed by org: {mcp_id}")))?;

        let job_ref = item.get("ref").and_then(Value::as_str).unwrap_or("");
        let org_ref = org_entry.get("ref").and_then(Value::as_str).unwrap_or("");
        if job_ref != org_ref {
            return Err(CoreError::policy(format!("Job MCP ref does not match org registry for {mcp_id}")));
        }

        let org_scopes = string_set(deep_get_array_or_empty(org_entry, &["allowed_scopes"]));
        let job_scopes_raw = deep_get_array_or_empty(item, &["allowed_scopes"]);
        if !org_scopes.is_empty() {
            if job_scopes_raw.is_empty() {
                return Err(CoreError::policy(format!(
                    "Job must declare allowed_scopes for MCP {mcp_id} (org requires scoped access)"
                )));
            }
            let job_scopes = string_set(job_scopes_raw);
            if !job_scopes.is_subset(&org_scopes) {
                return Err(CoreError::policy(format!("Job allowed_scopes for MCP {mcp_id} exceed org allowed_scopes")));
            }
        }
    }
    Ok(())
}

fn enforce_direct_network_permissions(job: &Value, org: &Value) -> CoreResult<()> {
    let org_policy = deep_get_str(org, &["spec", "external_access", "direct_network", "policy"]).unwrap_or_else(|_| "deny_all".to_string());
    let job_policy =
        deep_get_opt(job, &["spec", "permissions_snapshot", "direct_external_network", "policy"]).and_then(Value::as_str).unwrap_or("deny_all");

    if org_policy == "deny_all" && job_policy != "deny_all" {
        return Err(CoreError::policy("Org policy denies all direct network; job must set direct_external_network.policy=deny_all"));
    }

    if org_policy == "allowlist" && job_policy == "allowlist" {
        let subset_check = |label: &str| -> CoreResult<()> {
            let job_list = string_set(deep_get_array_or_empty(
                job,
                &["spec", "permissions_snapshot", "direct_external_network", "allowlist", label],
            ));
            let org_allow = string_set(deep_get_array_or_empty(org, &["spec", "external_access", "direct_network", "allowlist", label]));
            if !job_list.is_subset(&org_allow) {
                return Err(CoreError::policy(format!("Job direct network allowlist '{label}' exceeds org allowlist")));
            }
            let org_deny = string_set(deep_get_array_or_empty(org, &["spec", "external_access", "direct_network", "denylist", label]));
            if !job_list.is_disjoint(&org_deny) {
                return Err(CoreError::policy(format!("Job direct network allowlist '{label}' includes org-denied entries")));
            }
            Ok(())
        };
        subset_check("domains")?;
        subset_check("urls")?;
        subset_check("ip_cidrs")?;
    }

    Ok(())
}

fn enforce_execution_limits_vs_org(job: &Value, org: &Value) -> CoreResult<()> {
    let org_currency = deep_get_str(org, &["spec", "execution_limits", "cost_caps", "currency"])?;
    let org_max_cost_per_job = org
        .pointer("/spec/execution_limits/cost_caps/max_cost_per_job")
        .and_then(Value::as_f64)
        .ok_or_else(|| CoreError::contract_violation("MISSING_FIELD", "org missing execution_limits.cost_caps.max_cost_per_job"))?;

    let job_currency = deep_get_str(job, &["spec", "execution_limits", "cost_cap", "currency"])?;
    let job_max_cost = job
        .pointer("/spec/execution_limits/cost_cap/max_cost")
        .and_then(Value::as_f64)
        .ok_or_else(|| CoreError::contract_violation("MISSING_FIELD", "job missing execution_limits.cost_cap.max_cost"))?;

    if job_currency != org_currency {
        return Err(CoreError::policy(format!("Job cost_cap currency {job_currency} must match org currency {org_currency}")));
    }
    if job_max_cost > org_max_cost_per_job {
        return Err(CoreError::policy("Job cost_cap.max_cost exceeds org max_cost_per_job"));
    }

    let org_max_runtime = org
        .pointer("/spec/execution_limits/timeouts/max_job_runtime_seconds")
        .and_then(Value::as_i64)
        .ok_or_else(|| CoreError::contract_violation("MISSING_FIELD", "org missing execution_limits.timeouts.max_job_runtime_seconds"))?;
    let job_max_runtime = job
        .pointer("/spec/execution_limits/max_runtime_seconds")
        .and_then(Value::as_i64)
        .ok_or_else(|| CoreError::contract_violation("MISSING_FIELD", "job missing execution_limits.max_runtime_seconds"))?;
    if job_max_runtime > org_max_runtime {
        return Err(CoreError::policy("Job max_runtime_seconds exceeds org max_job_runtime_seconds"));
    }

    Ok(())
}

#[cfg(test)]
#[path = "org_policy_tests.rs"]
mod tests;
