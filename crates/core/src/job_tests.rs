use super::*;
use serde_json::json;

fn job_with_state(state: &str) -> Value {
    json!({
        "metadata": {"job_id": "job-1", "org_id": "org-1"},
        "spec": {
            "status": {"state": state, "status_updated_at": "2026-01-01T00:00:00.000Z"}
        }
    })
}

fn now() -> DateTime<Utc> {
    "2026-01-01T00:05:00.000Z".parse::<DateTime<Utc>>().unwrap()
}

#[test]
fn created_to_running_sets_started_at() {
    let job = job_with_state("created");
    let updated = apply_transition(&job, &TransitionRequest::new(JobState::Running, now())).unwrap();
    assert_eq!(updated["spec"]["status"]["state"], "running");
    assert_eq!(updated["spec"]["status"]["started_at"], "2026-01-01T00:05:00.000Z");
}

#[test]
fn running_to_running_is_idempotent_on_started_at() {
    let mut job = job_with_state("running");
    job["spec"]["status"]["started_at"] = json!("2026-01-01T00:00:00.000Z");
    let updated = apply_transition(&job, &TransitionRequest::new(JobState::Running, now())).unwrap();
    assert_eq!(updated, job, "same-state transition is a no-op");
}

#[test]
fn completed_requires_final_evaluation_ref() {
    let job = job_with_state("running");
    let err = apply_transition(&job, &TransitionRequest::new(JobState::Completed, now())).unwrap_err();
    assert!(matches!(err, CoreError::ContractViolation { .. }));
}

#[test]
fn completed_with_evaluation_ref_sets_terminal_at() {
    let job = job_with_state("running");
    let req = TransitionRequest::new(JobState::Completed, now())
        .final_evaluation_ref("evaluations/eval-1")
        .last_stop_condition("evaluation_passed");
    let updated = apply_transition(&job, &req).unwrap();
    assert_eq!(updated["spec"]["status"]["state"], "completed");
    assert_eq!(updated["spec"]["status"]["final_evaluation_ref"], "evaluations/eval-1");
    assert_eq!(updated["spec"]["status"]["last_stop_condition"], "evaluation_passed");
    assert!(updated["spec"]["status"]["terminal_at"].is_string());
}

#[test]
fn failed_requires_failure_mode() {
    let job = job_with_state("running");
    let req = TransitionRequest::new(JobState::Failed, now()).final_evaluation_ref("evaluations/eval-1");
    let err = apply_transition(&job, &req).unwrap_err();
    assert!(matches!(err, CoreError::ContractViolation { .. }));
}

#[test]
fn expired_reachable_from_any_nonterminal_state() {
    for state in ["created", "running", "waiting"] {
        let job = job_with_state(state);
        let req = TransitionRequest::new(JobState::Expired, now()).expiry_reason("expires_at_reached");
        let updated = apply_transition(&job, &req).unwrap();
        assert_eq!(updated["spec"]["status"]["state"], "expired");
    }
}

#[test]
fn terminal_states_are_absorbing() {
    for state in ["completed", "failed", "expired"] {
        let job = job_with_state(state);
        let err = apply_transition(&job, &TransitionRequest::new(JobState::Running, now())).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}

#[test]
fn running_cannot_go_back_to_created() {
    let job = job_with_state("running");
    // "created" isn't a valid target from any state in the matrix.
    let err = apply_transition(&job, &TransitionRequest::new(JobState::Created, now())).unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[test]
fn waiting_to_running_allowed() {
    let job = job_with_state("waiting");
    let updated = apply_transition(&job, &TransitionRequest::new(JobState::Running, now())).unwrap();
    assert_eq!(updated["spec"]["status"]["state"], "running");
}

#[test]
fn status_isolation_other_keys_untouched() {
    let mut job = job_with_state("created");
    job["spec"]["required_artifacts"] = json!([{"artifact_type": "report"}]);
    job["metadata"]["job_id"] = json!("job-42");
    let updated = apply_transition(&job, &TransitionRequest::new(JobState::Running, now())).unwrap();
    assert_eq!(updated["metadata"], job["metadata"]);
    assert_eq!(updated["spec"]["required_artifacts"], job["spec"]["required_artifacts"]);
}

#[test]
fn last_stop_condition_set_when_supplied_on_any_transition() {
    let job = job_with_state("running");
    let req = TransitionRequest::new(JobState::Waiting, now()).last_stop_condition("manual_stop");
    let updated = apply_transition(&job, &req).unwrap();
    assert_eq!(updated["spec"]["status"]["last_stop_condition"], "manual_stop");
}
