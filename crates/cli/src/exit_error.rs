// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Maps the core's closed error taxonomy to process exit codes, the same
/// kind-to-transport-code scheme an HTTP surface would use for status codes
/// (422/400/403/409/404/500).
impl From<bp_core::CoreError> for ExitError {
    fn from(err: bp_core::CoreError) -> Self {
        use bp_core::CoreError::*;
        let code = match &err {
            SchemaValidation { .. } => 22,
            ContractViolation { .. } => 40,
            PolicyViolation(_) => 43,
            Conflict(_) => 49,
            NotFound { .. } => 44,
            Internal(_) => 50,
        };
        ExitError::new(code, err.to_string())
    }
}
