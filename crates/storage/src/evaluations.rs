// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The evaluation table: append-only, immutable once written.

use crate::columns::extract_evaluation_columns;
use crate::db::Database;
use crate::error::map_insert_err;
use bp_core::{CoreError, CoreResult};
use rusqlite::OptionalExtension;
use serde_json::Value;

pub struct EvaluationStore<'a> {
    db: &'a Database,
}

impl<'a> EvaluationStore<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append an immutable Evaluation. Fails with `Conflict` if the id exists.
    pub fn append(&self, evaluation: &Value) -> CoreResult<()> {
        let cols = extract_evaluation_columns(evaluation)?;
        self.db
            .with_conn_raw(|conn| {
                conn.execute(
                    "INSERT INTO evaluations (
                        evaluation_id, org_id, job_id, created_at,
                        outcome_status, next_job_state, evaluator_actor_type, evaluator_actor_id, doc_json
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    rusqlite::params![
                        cols.evaluation_id,
                        cols.org_id,
                        cols.job_id,
                        cols.created_at,
                        cols.outcome_status,
                        cols.next_job_state,
                        cols.evaluator_actor_type,
                        cols.evaluator_actor_id,
                        cols.doc_json,
                    ],
                )
            })
            .map(|_| ())
            .map_err(|e| map_insert_err(e, "Evaluation", &cols.evaluation_id))
    }

    /// Fetch an Evaluation by id.
    pub fn get(&self, evaluation_id: &str) -> CoreResult<Value> {
        let doc_json: Option<String> = self.db.with_conn("reading evaluation", |conn| {
            conn.query_row("SELECT doc_json FROM evaluations WHERE evaluation_id = ?1", [evaluation_id], |row| row.get(0)).optional()
        })?;
        let doc_json = doc_json.ok_or_else(|| CoreError::not_found("Evaluation", evaluation_id))?;
        serde_json::from_str(&doc_json).map_err(|e| CoreError::internal(format!("corrupt stored Evaluation {evaluation_id}: {e}")))
    }

    /// List evaluations for a job, oldest first.
    pub fn list_for_job(&self, job_id: &str) -> CoreResult<Vec<Value>> {
        self.db.with_conn("listing evaluations for job", |conn| {
            let mut stmt = conn.prepare("SELECT doc_json FROM evaluations WHERE job_id = ?1 ORDER BY created_at ASC")?;
            let rows = stmt.query_map([job_id], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })?
        .into_iter()
        .map(|doc_json| {
            serde_json::from_str(&doc_json).map_err(|e| CoreError::internal(format!("corrupt stored Evaluation for job {job_id}: {e}")))
        })
        .collect()
    }
}
