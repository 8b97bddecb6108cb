// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single SQLite connection and its migration.
//!
//! The control plane is synchronous and request-scoped (§5): there is no
//! connection pool, only one `rusqlite::Connection` behind a mutex. The only
//! blocking point in a request is the brief hold of that lock for one
//! statement or transaction.

use crate::error::map_query_err;
use bp_core::{CoreError, CoreResult};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

const SCHEMA_VERSION: i64 = 1;

/// Owns the one SQLite connection backing a control-plane instance.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if absent) the database at `path` and run migrations.
    ///
    /// Fails closed if an existing database reports a `schema_version` this
    /// build does not know how to read.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CoreError::internal(format!("creating database directory {}: {e}", parent.display())))?;
            }
        }
        let conn = Connection::open(path).map_err(|e| CoreError::internal(format!("opening sqlite database {}: {e}", path.display())))?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
            .map_err(|e| map_query_err(e, "applying pragmas"))?;
        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database, for tests.
    pub fn open_in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| CoreError::internal(format!("opening in-memory sqlite database: {e}")))?;
        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    /// Run a statement against the one connection, mapping any failure to a
    /// generic `Internal` error. Use [`Database::with_conn_raw`] instead when
    /// the caller needs to distinguish a unique-constraint violation.
    pub(crate) fn with_conn<T>(&self, context: &str, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> CoreResult<T> {
        self.with_conn_raw(f).map_err(|e| map_query_err(e, context))
    }

    /// Run a statement, returning the raw `rusqlite::Result` for the caller
    /// to map itself.
    pub(crate) fn with_conn_raw<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> rusqlite::Result<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    fn migrate(&self) -> CoreResult<()> {
        let conn = self.conn.lock();
        conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")
            .map_err(|e| map_query_err(e, "creating schema_version table"))?;

        let existing: Option<i64> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1;", [], |row| row.get(0))
            .optional()
            .map_err(|e| map_query_err(e, "reading schema_version"))?;

        let version = match existing {
            Some(v) => v,
            None => {
                conn.execute("INSERT INTO schema_version(version) VALUES (?1);", [SCHEMA_VERSION])
                    .map_err(|e| map_query_err(e, "inserting schema_version"))?;
                SCHEMA_VERSION
            }
        };

        if version != SCHEMA_VERSION {
            return Err(CoreError::internal(format!(
                "unsupported sqlite schema_version: {version} (this build understands {SCHEMA_VERSION})"
            )));
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS jobs (
                job_id TEXT PRIMARY KEY,
                org_id TEXT NOT NULL,
                state TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                status_updated_at TEXT NOT NULL,
                started_at TEXT,
                terminal_at TEXT,
                final_evaluation_ref TEXT,
                failure_mode TEXT,
                expiry_reason TEXT,
                doc_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_jobs_org_state ON jobs(org_id, state);
            CREATE INDEX IF NOT EXISTS idx_jobs_org_created_at ON jobs(org_id, created_at);

            CREATE TABLE IF NOT EXISTS artifacts (
                artifact_id TEXT PRIMARY KEY,
                org_id TEXT NOT NULL,
                job_id TEXT NOT NULL,
                artifact_type TEXT NOT NULL,
                created_at TEXT NOT NULL,
                produced_by_agent_id TEXT NOT NULL,
                doc_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_artifacts_job_id ON artifacts(job_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_artifacts_org_id ON artifacts(org_id, created_at);

            CREATE TABLE IF NOT EXISTS evaluations (
                evaluation_id TEXT PRIMARY KEY,
                org_id TEXT NOT NULL,
                job_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                outcome_status TEXT NOT NULL,
                next_job_state TEXT NOT NULL,
                evaluator_actor_type TEXT NOT NULL,
                evaluator_actor_id TEXT NOT NULL,
                doc_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_evaluations_job_id ON evaluations(job_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_evaluations_org_id ON evaluations(org_id, created_at);

            CREATE TABLE IF NOT EXISTS job_events (
                event_id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts TEXT NOT NULL,
                org_id TEXT NOT NULL,
                job_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                details_json TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_job_events_org_ts ON job_events(org_id, ts);
            CREATE INDEX IF NOT EXISTS idx_job_events_job_ts ON job_events(job_id, ts);",
        )
        .map_err(|e| map_query_err(e, "creating tables"))?;

        Ok(())
    }
}
