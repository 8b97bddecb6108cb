use super::*;
use serde_json::json;

fn org_fixture() -> Value {
    json!({
        "spec": {
            "artifact_policy": {
                "allowed_types": [{"type_id": "report"}, {"type_id": "dataset"}],
                "denied_types": [{"type_id": "binary"}],
            },
            "skill_policy": {
                "default_rule": "deny",
                "allow": {"skill_ids": ["search"], "skill_categories": ["research"]},
                "deny": {"skill_ids": ["shell"], "skill_categories": ["dangerous"]},
            },
            "external_access": {
                "mcp": {"allowed": [{"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read", "write"]}]},
                "direct_network": {
                    "policy": "allowlist",
                    "allowlist": {"domains": ["example.com", "evil.example.com"], "urls": [], "ip_cidrs": []},
                    "denylist": {"domains": ["evil.example.com"], "urls": [], "ip_cidrs": []},
                },
            },
            "execution_limits": {
                "cost_caps": {"currency": "USD", "max_cost_per_job": 10.0},
                "timeouts": {"max_job_runtime_seconds": 3600},
            },
        }
    })
}

fn job_with(required_type: &str, skill_ids: &[&str], skill_cats: &[&str], mcp: Value, net_policy: &str, net_allow_domains: &[&str]) -> Value {
    json!({
        "spec": {
            "required_artifacts": [{"artifact_type": required_type}],
            "permissions_snapshot": {
                "skills": {"allowed_skill_ids": skill_ids, "allowed_skill_categories": skill_cats},
                "mcp": {"allowed": [mcp]},
                "direct_external_network": {"policy": net_policy, "allowlist": {"domains": net_allow_domains, "urls": [], "ip_cidrs": []}},
            },
            "execution_limits": {"max_runtime_seconds": 1800, "cost_cap": {"currency": "USD", "max_cost": 5.0}},
        }
    })
}

#[test]
fn accepts_a_fully_compliant_job() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("report", &["search"], &["research"], mcp, "allowlist", &["example.com"]);
    enforce_job_within_org_policy(&job, &org).unwrap();
}

#[test]
fn rejects_denied_artifact_type() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("binary", &[], &[], mcp, "deny_all", &[]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_artifact_type_not_on_allow_list() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("unknown_type", &[], &[], mcp, "deny_all", &[]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_denied_skill_id() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("report", &["shell"], &[], mcp, "deny_all", &[]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_skill_not_allowed_when_default_rule_is_deny() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("report", &["unlisted_skill"], &[], mcp, "deny_all", &[]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_mcp_id_not_in_org_allow_list() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "unknown_mcp", "ref": "mcp://x@1", "allowed_scopes": []});
    let job = job_with("report", &[], &[], mcp, "deny_all", &[]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_mcp_ref_mismatch() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@2", "allowed_scopes": ["read"]});
    let job = job_with("report", &[], &[], mcp, "deny_all", &[]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_mcp_scopes_exceeding_org_scopes() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read", "admin"]});
    let job = job_with("report", &[], &[], mcp, "deny_all", &[]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_job_network_policy_looser_than_deny_all_org() {
    let mut org = org_fixture();
    org["spec"]["external_access"]["direct_network"]["policy"] = json!("deny_all");
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("report", &[], &[], mcp, "allowlist", &["example.com"]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_network_allowlist_exceeding_org_allowlist() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("report", &[], &[], mcp, "allowlist", &["not-allowed.example.com"]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_network_allowlist_intersecting_org_denylist() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let job = job_with("report", &[], &[], mcp, "allowlist", &["evil.example.com"]);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_execution_limits_exceeding_org_cost_cap() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let mut job = job_with("report", &[], &[], mcp, "deny_all", &[]);
    job["spec"]["execution_limits"]["cost_cap"]["max_cost"] = json!(9999.0);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rejects_execution_limits_exceeding_org_runtime() {
    let org = org_fixture();
    let mcp = json!({"mcp_id": "fs", "ref": "mcp://fs@1", "allowed_scopes": ["read"]});
    let mut job = job_with("report", &[], &[], mcp, "deny_all", &[]);
    job["spec"]["execution_limits"]["max_runtime_seconds"] = json!(99999);
    let err = enforce_job_within_org_policy(&job, &org).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}
