use super::*;
use bp_core::time::parse_rfc3339;
use bp_storage::Stores;
use serde_json::json;

fn org_with_limits(max_active_jobs: i64, max_job_starts_per_minute: i64) -> Value {
    json!({
        "spec": {
            "execution_limits": {
                "concurrency": {"max_active_jobs": max_active_jobs},
                "rate_limits": {"max_job_starts_per_minute": max_job_starts_per_minute},
            }
        }
    })
}

fn job(job_id: &str, org_id: &str, state: &str) -> Value {
    json!({
        "metadata": {"job_id": job_id, "org_id": org_id},
        "spec": {
            "status": {"state": state, "status_updated_at": "2026-01-01T00:00:00.000Z"},
            "timestamps": {"created_at": "2026-01-01T00:00:00.000Z", "expires_at": "2026-01-02T00:00:00.000Z"},
        }
    })
}

#[test]
fn disabled_concurrency_rejects_outright() {
    let stores = Stores::open_in_memory().unwrap();
    let org = org_with_limits(0, 10);
    let now = parse_rfc3339("2026-01-01T00:00:00Z").unwrap();
    let err = enforce_run_gating(&org, "org-1", JobState::Created, &stores.jobs(), now).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn created_job_rejected_when_active_at_capacity() {
    let stores = Stores::open_in_memory().unwrap();
    stores.jobs().create(&job("job-1", "org-1", "running")).unwrap();
    let org = org_with_limits(1, 10);
    let now = parse_rfc3339("2026-01-01T00:00:00Z").unwrap();
    let err = enforce_run_gating(&org, "org-1", JobState::Created, &stores.jobs(), now).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn waiting_job_permitted_at_capacity_but_not_over() {
    let stores = Stores::open_in_memory().unwrap();
    stores.jobs().create(&job("job-1", "org-1", "waiting")).unwrap();
    let org = org_with_limits(1, 10);
    let now = parse_rfc3339("2026-01-01T00:00:00Z").unwrap();
    // active == max_active_jobs (1) and state is waiting: allowed (only '>' rejects).
    enforce_run_gating(&org, "org-1", JobState::Waiting, &stores.jobs(), now).unwrap();
}

#[test]
fn rate_limit_disabled_rejects_outright() {
    let stores = Stores::open_in_memory().unwrap();
    let org = org_with_limits(5, 0);
    let now = parse_rfc3339("2026-01-01T00:00:00Z").unwrap();
    let err = enforce_run_gating(&org, "org-1", JobState::Created, &stores.jobs(), now).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rate_limit_rejects_once_recent_starts_reach_the_cap() {
    let stores = Stores::open_in_memory().unwrap();
    let now = parse_rfc3339("2026-01-01T00:10:00Z").unwrap();
    stores.jobs().record_event("org-1", "job-1", "job_started", &json!({}), now).unwrap();
    let org = org_with_limits(5, 1);
    let err = enforce_run_gating(&org, "org-1", JobState::Created, &stores.jobs(), now).unwrap_err();
    assert!(matches!(err, CoreError::PolicyViolation(_)));
}

#[test]
fn rate_limit_ignores_starts_older_than_sixty_seconds() {
    let stores = Stores::open_in_memory().unwrap();
    let old = parse_rfc3339("2026-01-01T00:00:00Z").unwrap();
    stores.jobs().record_event("org-1", "job-1", "job_started", &json!({}), old).unwrap();
    let now = parse_rfc3339("2026-01-01T00:10:00Z").unwrap();
    let org = org_with_limits(5, 1);
    enforce_run_gating(&org, "org-1", JobState::Created, &stores.jobs(), now).unwrap();
}
