// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull the indexed columns out of a document before it is stored.
//!
//! Every table keeps the canonical document verbatim in `doc_json` and
//! duplicates a handful of fields into real columns purely so the store's
//! query methods (`count_active_by_org`, `list_for_job`, ...) don't have to
//! parse JSON per row.

use bp_core::pointer::{deep_get_opt, deep_get_str};
use bp_core::CoreResult;
use serde_json::Value;

pub(crate) struct JobColumns {
    pub job_id: String,
    pub org_id: String,
    pub state: String,
    pub created_at: String,
    pub expires_at: String,
    pub status_updated_at: String,
    pub started_at: Option<String>,
    pub terminal_at: Option<String>,
    pub final_evaluation_ref: Option<String>,
    pub failure_mode: Option<String>,
    pub expiry_reason: Option<String>,
    pub doc_json: String,
}

pub(crate) fn extract_job_columns(job: &Value) -> CoreResult<JobColumns> {
    let status = deep_get_opt(job, &["spec", "status"]);
    let opt_str = |key: &str| status.and_then(|s| s.get(key)).and_then(|v| v.as_str()).map(str::to_string);

    Ok(JobColumns {
        job_id: deep_get_str(job, &["metadata", "job_id"])?,
        org_id: deep_get_str(job, &["metadata", "org_id"])?,
        state: deep_get_str(job, &["spec", "status", "state"])?,
        created_at: deep_get_str(job, &["spec", "timestamps", "created_at"])?,
        expires_at: deep_get_str(job, &["spec", "timestamps", "expires_at"])?,
        status_updated_at: deep_get_str(job, &["spec", "status", "status_updated_at"])?,
        started_at: opt_str("started_at"),
        terminal_at: opt_str("terminal_at"),
        final_evaluation_ref: opt_str("final_evaluation_ref"),
        failure_mode: opt_str("failure_mode"),
        expiry_reason: opt_str("expiry_reason"),
        doc_json: serde_json::to_string(job).unwrap_or_else(|_| "null".to_string()),
    })
}

pub(crate) struct ArtifactColumns {
    pub artifact_id: String,
    pub org_id: String,
    pub job_id: String,
    pub artifact_type: String,
    pub created_at: String,
    pub produced_by_agent_id: String,
    pub doc_json: String,
}

pub(crate) fn extract_artifact_columns(artifact: &Value) -> CoreResult<ArtifactColumns> {
    Ok(ArtifactColumns {
        artifact_id: deep_get_str(artifact, &["metadata", "artifact_id"])?,
        org_id: deep_get_str(artifact, &["metadata", "org_id"])?,
        job_id: deep_get_str(artifact, &["spec", "job_ref", "job_id"])?,
        artifact_type: deep_get_str(artifact, &["metadata", "artifact_type"])?,
        created_at: deep_get_str(artifact, &["spec", "created_at"])?,
        produced_by_agent_id: deep_get_str(artifact, &["spec", "produced_by", "agent_id"])?,
        doc_json: serde_json::to_string(artifact).unwrap_or_else(|_| "null".to_string()),
    })
}

pub(crate) struct EvaluationColumns {
    pub evaluation_id: String,
    pub org_id: String,
    pub job_id: String,
    pub created_at: String,
    pub outcome_status: String,
    pub next_job_state: String,
    pub evaluator_actor_type: String,
    pub evaluator_actor_id: String,
    pub doc_json: String,
}

pub(crate) fn extract_evaluation_columns(evaluation: &Value) -> CoreResult<EvaluationColumns> {
    let evaluator = deep_get_opt(evaluation, &["spec", "evaluator"]);
    let evaluator_field = |key: &str| evaluator.and_then(|e| e.get(key)).and_then(|v| v.as_str()).unwrap_or("").to_string();

    Ok(EvaluationColumns {
        evaluation_id: deep_get_str(evaluation, &["metadata", "evaluation_id"])?,
        org_id: deep_get_str(evaluation, &["metadata", "org_id"])?,
        job_id: deep_get_str(evaluation, &["spec", "job_ref", "job_id"])?,
        created_at: deep_get_str(evaluation, &["spec", "created_at"])?,
        outcome_status: deep_get_str(evaluation, &["spec", "outcome", "status"])?,
        next_job_state: deep_get_str(evaluation, &["spec", "outcome", "next_job_state"])?,
        evaluator_actor_type: evaluator_field("actor_type"),
        evaluator_actor_id: evaluator_field("actor_id"),
        doc_json: serde_json::to_string(evaluation).unwrap_or_else(|_| "null".to_string()),
    })
}
