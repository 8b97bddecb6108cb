// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translate `rusqlite` failures into the shared [`CoreError`] taxonomy.
//!
//! Storage never invents new error kinds: a unique-constraint violation is a
//! `Conflict`, everything else unexpected is `Internal`. Callers never see a
//! `rusqlite::Error`.

use bp_core::CoreError;
use rusqlite::ErrorCode;

pub(crate) fn map_insert_err(err: rusqlite::Error, what: &str, id: &str) -> CoreError {
    if is_unique_violation(&err) {
        CoreError::conflict(format!("{what} already exists: {id}"))
    } else {
        CoreError::internal(format!("sqlite error inserting {what} {id}: {err}"))
    }
}

pub(crate) fn map_query_err(err: rusqlite::Error, context: &str) -> CoreError {
    CoreError::internal(format!("sqlite error ({context}): {err}"))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}
