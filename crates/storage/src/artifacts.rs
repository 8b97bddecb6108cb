// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The artifact table: append-only, immutable once written.

use crate::columns::extract_artifact_columns;
use crate::db::Database;
use crate::error::map_insert_err;
use bp_core::{CoreError, CoreResult};
use rusqlite::OptionalExtension;
use serde_json::Value;

pub struct ArtifactStore<'a> {
    db: &'a Database,
}

impl<'a> ArtifactStore<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append an immutable Artifact. Fails with `Conflict` if the id exists.
    pub fn append(&self, artifact: &Value) -> CoreResult<()> {
        let cols = extract_artifact_columns(artifact)?;
        self.db
            .with_conn_raw(|conn| {
                conn.execute(
                    "INSERT INTO artifacts (
                        artifact_id, org_id, job_id, artifact_type, created_at, produced_by_agent_id, doc_json
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        cols.artifact_id,
                        cols.org_id,
                        cols.job_id,
                        cols.artifact_type,
                        cols.created_at,
                        cols.produced_by_agent_id,
                        cols.doc_json,
                    ],
                )
            })
            .map(|_| ())
            .map_err(|e| map_insert_err(e, "Artifact", &cols.artifact_id))
    }

    /// Fetch an Artifact by id.
    pub fn get(&self, artifact_id: &str) -> CoreResult<Value> {
        let doc_json: Option<String> = self.db.with_conn("reading artifact", |conn| {
            conn.query_row("SELECT doc_json FROM artifacts WHERE artifact_id = ?1", [artifact_id], |row| row.get(0)).optional()
        })?;
        let doc_json = doc_json.ok_or_else(|| CoreError::not_found("Artifact", artifact_id))?;
        serde_json::from_str(&doc_json).map_err(|e| CoreError::internal(format!("corrupt stored Artifact {artifact_id}: {e}")))
    }

    /// List artifacts for a job, oldest first.
    pub fn list_for_job(&self, job_id: &str) -> CoreResult<Vec<Value>> {
        self.db.with_conn("listing artifacts for job", |conn| {
            let mut stmt = conn.prepare("SELECT doc_json FROM artifacts WHERE job_id = ?1 ORDER BY created_at ASC")?;
            let rows = stmt.query_map([job_id], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })?
        .into_iter()
        .map(|doc_json| serde_json::from_str(&doc_json).map_err(|e| CoreError::internal(format!("corrupt stored Artifact for job {job_id}: {e}"))))
        .collect()
    }
}
