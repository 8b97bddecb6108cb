// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job table: mutable only in `spec.status`, plus its append-only audit
//! log (C5).

use crate::columns::extract_job_columns;
use crate::db::Database;
use crate::error::map_insert_err;
use bp_core::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde_json::Value;

/// JobContract storage plus the per-job audit trail (`job_events`).
pub struct JobStore<'a> {
    db: &'a Database,
}

impl<'a> JobStore<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new JobContract. Fails with `Conflict` if `job_id` exists.
    pub fn create(&self, job: &Value) -> CoreResult<()> {
        let cols = extract_job_columns(job)?;
        self.db
            .with_conn_raw(|conn| {
                conn.execute(
                    "INSERT INTO jobs (
                        job_id, org_id, state, created_at, expires_at, status_updated_at,
                        started_at, terminal_at, final_evaluation_ref, failure_mode, expiry_reason, doc_json
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    rusqlite::params![
                        cols.job_id,
                        cols.org_id,
                        cols.state,
                        cols.created_at,
                        cols.expires_at,
                        cols.status_updated_at,
                        cols.started_at,
                        cols.terminal_at,
                        cols.final_evaluation_ref,
                        cols.failure_mode,
                        cols.expiry_reason,
                        cols.doc_json,
                    ],
                )
            })
            .map(|_| ())
            .map_err(|e| map_insert_err(e, "JobContract", &cols.job_id))
    }

    /// Fetch a JobContract by id.
    pub fn get(&self, job_id: &str) -> CoreResult<Value> {
        let doc_json: Option<String> = self
            .db
            .with_conn("reading job", |conn| {
                conn.query_row("SELECT doc_json FROM jobs WHERE job_id = ?1", [job_id], |row| row.get(0)).optional()
            })?;
        let doc_json = doc_json.ok_or_else(|| CoreError::not_found("JobContract", job_id))?;
        serde_json::from_str(&doc_json).map_err(|e| CoreError::internal(format!("corrupt stored JobContract {job_id}: {e}")))
    }

    /// Replace the stored document (`job_id` is the key). Fails with
    /// `NotFound` if the row does not exist.
    pub fn update(&self, job: &Value) -> CoreResult<()> {
        let cols = extract_job_columns(job)?;
        let rows = self.db.with_conn("updating job", |conn| {
            conn.execute(
                "UPDATE jobs SET
                    org_id = ?1, state = ?2, created_at = ?3, expires_at = ?4, status_updated_at = ?5,
                    started_at = ?6, terminal_at = ?7, final_evaluation_ref = ?8, failure_mode = ?9,
                    expiry_reason = ?10, doc_json = ?11
                WHERE job_id = ?12",
                rusqlite::params![
                    cols.org_id,
                    cols.state,
                    cols.created_at,
                    cols.expires_at,
                    cols.status_updated_at,
                    cols.started_at,
                    cols.terminal_at,
                    cols.final_evaluation_ref,
                    cols.failure_mode,
                    cols.expiry_reason,
                    cols.doc_json,
                    cols.job_id,
                ],
            )
        })?;
        if rows != 1 {
            return Err(CoreError::not_found("JobContract", &cols.job_id));
        }
        Ok(())
    }

    /// Count non-terminal (`running`/`waiting`) jobs for an org.
    pub fn count_active_by_org(&self, org_id: &str) -> CoreResult<i64> {
        self.db.with_conn("counting active jobs", |conn| {
            conn.query_row(
                "SELECT COUNT(1) FROM jobs WHERE org_id = ?1 AND state IN ('running', 'waiting')",
                [org_id],
                |row| row.get(0),
            )
        })
    }

    /// Append an audit event. The event log records every admitted
    /// transition exactly once (invariant 3); it is never pruned and never
    /// rewritten.
    pub fn record_event(&self, org_id: &str, job_id: &str, event_type: &str, details: &Value, ts: DateTime<Utc>) -> CoreResult<()> {
        let details_json = serde_json::to_string(details).unwrap_or_else(|_| "null".to_string());
        self.db
            .with_conn("recording job event", |conn| {
                conn.execute(
                    "INSERT INTO job_events (ts, org_id, job_id, event_type, details_json) VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![bp_core::time::format_rfc3339(ts), org_id, job_id, event_type, details_json],
                )
            })
            .map(|_| ())
    }

    /// Count events of `event_type` for an org at or after `since`.
    pub fn count_events_since(&self, org_id: &str, event_type: &str, since: DateTime<Utc>) -> CoreResult<i64> {
        self.db.with_conn("counting job events", |conn| {
            conn.query_row(
                "SELECT COUNT(1) FROM job_events WHERE org_id = ?1 AND event_type = ?2 AND ts >= ?3",
                rusqlite::params![org_id, event_type, bp_core::time::format_rfc3339(since)],
                |row| row.get(0),
            )
        })
    }
}
