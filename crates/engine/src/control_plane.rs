// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestration facade (§6): wires C1 (schema) → C3 (policy) → C4
//! (state machine) → C5 (storage) in the exact sequencing the external
//! interfaces table prescribes. This is the only place in the workspace
//! that calls all four in one request.

use bp_core::clock::{Clock, SystemClock};
use bp_core::job::{apply_transition, current_state, JobState, TransitionRequest};
use bp_core::pointer::deep_get_str;
use bp_core::time::parse_rfc3339;
use bp_core::{CoreError, CoreResult};
use bp_policy::{
    enforce_artifact_admission, enforce_evaluation_admission, enforce_job_contract_limits, enforce_job_contract_submission_shape,
    enforce_job_within_org_policy, enforce_run_gating, LimitsConfig,
};
use bp_registry::{Registry, RegistryDirs};
use bp_schema::{Kind, SchemaValidator};
use bp_storage::Stores;
use serde_json::{json, Value};
use std::path::Path;

/// The seven operations §6 prescribes, backed by real schema validation,
/// registry lookups, policy checks, lifecycle transitions, and persistence.
///
/// Generic over [`Clock`] so tests can freeze `now`; production code uses
/// [`SystemClock`] via [`ControlPlane::open`].
pub struct ControlPlane<C: Clock = SystemClock> {
    schemas: SchemaValidator,
    registry: Registry,
    stores: Stores,
    limits: LimitsConfig,
    execution_deferred: bool,
    clock: C,
}

impl ControlPlane<SystemClock> {
    /// Load schemas and the registry, open (or create) the sqlite store,
    /// and assemble a control plane running against the real clock.
    ///
    /// Fails closed: any schema, registry, or storage initialization error
    /// propagates rather than starting in a partial state.
    pub fn open(schemas_dir: impl AsRef<Path>, registry_dirs: RegistryDirs<'_>, sqlite_path: impl AsRef<Path>, limits: LimitsConfig) -> CoreResult<Self> {
        Self::with_clock(schemas_dir, registry_dirs, sqlite_path, limits, SystemClock)
    }
}

impl<C: Clock> ControlPlane<C> {
    pub fn with_clock(
        schemas_dir: impl AsRef<Path>,
        registry_dirs: RegistryDirs<'_>,
        sqlite_path: impl AsRef<Path>,
        limits: LimitsConfig,
        clock: C,
    ) -> CoreResult<Self> {
        let schemas = SchemaValidator::load_from_dir(schemas_dir)?;
        let registry = Registry::load(registry_dirs, &schemas)?;
        let stores = Stores::open(sqlite_path)?;
        Ok(Self::from_parts(schemas, registry, stores, limits, clock))
    }

    /// Assemble a control plane from already-constructed parts. Mainly for
    /// tests, which want an in-memory store and a fake clock.
    pub fn from_parts(schemas: SchemaValidator, registry: Registry, stores: Stores, limits: LimitsConfig, clock: C) -> Self {
        Self { schemas, registry, stores, limits, execution_deferred: true, clock }
    }

    /// Disable the execution-deferred double transition (`running ->
    /// waiting`), leaving a successful `run_job` in `running`. Build mode
    /// always wants the deferred behavior, but tests exercising gating in
    /// isolation may prefer to inspect the `running` state directly.
    pub fn with_execution_deferred(mut self, execution_deferred: bool) -> Self {
        self.execution_deferred = execution_deferred;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[cfg(test)]
    pub(crate) fn stores_for_test(&self) -> &Stores {
        &self.stores
    }

    /// Validate, apply submission-time and org policy checks, then persist
    /// a newly created JobContract and record `job_submitted`.
    pub fn submit_job(&self, job: &Value) -> CoreResult<Value> {
        let now = self.clock.now();
        self.schemas.validate(Kind::JobContract, job)?;
        enforce_job_contract_submission_shape(job)?;
        enforce_job_contract_limits(job, &self.limits, now)?;

        let org_id = deep_get_str(job, &["metadata", "org_id"])?;
        if self.limits.require_known_org && !self.registry.has_org(&org_id) {
            return Err(CoreError::policy(format!("Unknown org_id (registry.require_known_org=true): {org_id}")));
        }
        if let Some(org) = self.registry.get_org(&org_id) {
            enforce_job_within_org_policy(job, org)?;
        }

        self.stores.jobs().create(job)?;
        let job_id = deep_get_str(job, &["metadata", "job_id"])?;
        self.stores.jobs().record_event(&org_id, &job_id, "job_submitted", &json!({"state": "created"}), now)?;
        tracing::info!(event = "job_submitted", job_id = %job_id, org_id = %org_id, "job admitted");
        Ok(job.clone())
    }

    pub fn get_job(&self, job_id: &str) -> CoreResult<Value> {
        self.stores.jobs().get(job_id)
    }

    /// Force-expire an overdue job, reject a job outside `created|waiting`,
    /// enforce run gating when the org is known, then transition to
    /// `running` and (execution being out of scope) immediately to
    /// `waiting` with an `execution_deferred` event.
    pub fn run_job(&self, job_id: &str) -> CoreResult<Value> {
        let job = self.stores.jobs().get(job_id)?;
        let now = self.clock.now();
        let org_id = deep_get_str(&job, &["metadata", "org_id"])?;
        let expires_at = parse_rfc3339(&deep_get_str(&job, &["spec", "timestamps", "expires_at"])?)?;

        if expires_at <= now {
            let expired = apply_transition(&job, &TransitionRequest::new(JobState::Expired, now).expiry_reason("expires_at_reached"))?;
            self.schemas.validate(Kind::JobContract, &expired)?;
            self.stores.jobs().update(&expired)?;
            self.stores.jobs().record_event(&org_id, job_id, "job_expired", &json!({"reason": "expires_at_reached"}), now)?;
            tracing::warn!(event = "job_expired", job_id = %job_id, org_id = %org_id, code = "expires_at_reached", "job force-expired on run");
            return Ok(expired);
        }

        let state = current_state(&job)?;
        if !matches!(state, JobState::Created | JobState::Waiting) {
            return Err(CoreError::conflict(format!("Job must be in created|waiting to run (current={state})")));
        }

        if let Some(org) = self.registry.get_org(&org_id) {
            enforce_run_gating(org, &org_id, state, &self.stores.jobs(), now)?;
        }

        let running = apply_transition(&job, &TransitionRequest::new(JobState::Running, now))?;
        self.schemas.validate(Kind::JobContract, &running)?;
        self.stores.jobs().update(&running)?;
        self.stores.jobs().record_event(&org_id, job_id, "job_started", &json!({"previous_state": state.to_string()}), now)?;
        tracing::info!(event = "job_started", job_id = %job_id, org_id = %org_id, "job transitioned to running");

        if self.execution_deferred {
            let now = self.clock.now();
            let waiting = apply_transition(&running, &TransitionRequest::new(JobState::Waiting, now))?;
            self.schemas.validate(Kind::JobContract, &waiting)?;
            self.stores.jobs().update(&waiting)?;
            self.stores.jobs().record_event(
                &org_id,
                job_id,
                "execution_deferred",
                &json!({"reason": "agent_execution_not_implemented", "build_mode": true}),
                now,
            )?;
            tracing::info!(event = "execution_deferred", job_id = %job_id, org_id = %org_id, "execution deferred; job returned to waiting");
            return Ok(waiting);
        }

        Ok(running)
    }

    /// `running -> waiting`; a no-op on an already-waiting job; a conflict
    /// on any other state, terminal or not.
    pub fn stop_job(&self, job_id: &str) -> CoreResult<Value> {
        let job = self.stores.jobs().get(job_id)?;
        let now = self.clock.now();
        let org_id = deep_get_str(&job, &["metadata", "org_id"])?;
        let state = current_state(&job)?;

        if state.is_terminal() {
            return Err(CoreError::conflict(format!("Cannot stop a terminal job (state={state})")));
        }
        if state == JobState::Waiting {
            return Ok(job);
        }
        if state != JobState::Running {
            return Err(CoreError::conflict(format!("Job must be running to stop (current={state})")));
        }

        let waiting = apply_transition(&job, &TransitionRequest::new(JobState::Waiting, now).last_stop_condition("manual_stop"))?;
        self.schemas.validate(Kind::JobContract, &waiting)?;
        self.stores.jobs().update(&waiting)?;
        self.stores.jobs().record_event(&org_id, job_id, "job_stopped", &json!({"to_state": "waiting"}), now)?;
        tracing::info!(event = "job_stopped", job_id = %job_id, org_id = %org_id, "job stopped by request");
        Ok(waiting)
    }

    pub fn submit_artifact(&self, artifact: &Value) -> CoreResult<Value> {
        self.schemas.validate(Kind::Artifact, artifact)?;
        enforce_artifact_admission(artifact, &self.registry, &self.stores.jobs())?;
        self.stores.artifacts().append(artifact)?;
        let artifact_id = deep_get_str(artifact, &["metadata", "artifact_id"]).unwrap_or_default();
        tracing::info!(event = "artifact_submitted", artifact_id = %artifact_id, "artifact admitted");
        Ok(artifact.clone())
    }

    pub fn get_artifact(&self, artifact_id: &str) -> CoreResult<Value> {
        self.stores.artifacts().get(artifact_id)
    }

    /// Admit the evaluation, map its `outcome.next_job_state` to a lifecycle
    /// transition, then persist the evaluation (append-only) before the
    /// updated job, recording `evaluation_submitted` and
    /// `job_state_changed` in that order.
    pub fn submit_evaluation(&self, evaluation: &Value) -> CoreResult<(Value, Value)> {
        let now = self.clock.now();
        self.schemas.validate(Kind::Evaluation, evaluation)?;

        let job = enforce_evaluation_admission(evaluation, &self.registry, &self.stores.jobs(), &self.schemas, now)?;

        let evaluation_id = deep_get_str(evaluation, &["metadata", "evaluation_id"])?;
        let org_id = deep_get_str(evaluation, &["metadata", "org_id"])?;
        let job_id = deep_get_str(evaluation, &["spec", "job_ref", "job_id"])?;
        let current = current_state(&job)?;
        let desired = deep_get_str(evaluation, &["spec", "outcome", "next_job_state"])?;
        let final_ref = format!("evaluations/{evaluation_id}");

        let updated = match desired.as_str() {
            "completed" => apply_transition(
                &job,
                &TransitionRequest::new(JobState::Completed, now).final_evaluation_ref(final_ref).last_stop_condition("evaluation_passed"),
            )?,
            "failed" => apply_transition(
                &job,
                &TransitionRequest::new(JobState::Failed, now)
                    .final_evaluation_ref(final_ref)
                    .failure_mode("evaluation_failure")
                    .last_stop_condition("evaluation_failed"),
            )?,
            "running" => apply_transition(&job, &TransitionRequest::new(JobState::Running, now))?,
            "waiting" => apply_transition(&job, &TransitionRequest::new(JobState::Waiting, now))?,
            other => return Err(CoreError::policy(format!("Invalid evaluation next_job_state: {other}"))),
        };
        self.schemas.validate(Kind::JobContract, &updated)?;

        self.stores.evaluations().append(evaluation)?;
        self.stores.jobs().record_event(&org_id, &job_id, "evaluation_submitted", &json!({"evaluation_id": evaluation_id}), now)?;

        self.stores.jobs().update(&updated)?;
        self.stores.jobs().record_event(&org_id, &job_id, "job_state_changed", &json!({"from": current.to_string(), "to": desired}), now)?;
        tracing::info!(
            event = "evaluation_submitted",
            evaluation_id = %evaluation_id,
            job_id = %job_id,
            org_id = %org_id,
            from = %current,
            to = %desired,
            "evaluation admitted and job transitioned"
        );

        Ok((evaluation.clone(), updated))
    }
}

#[cfg(test)]
#[path = "control_plane_tests.rs"]
mod tests;
