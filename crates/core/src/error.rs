// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed failure taxonomy shared by every core component.
//!
//! The core never recovers from its own errors; it surfaces the first
//! applicable kind and stops. Composition layers (an HTTP surface, a CLI) map
//! these kinds to transport-specific codes.

use std::fmt;

/// A single schema validation failure, addressable by RFC 6901 JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

/// The closed set of ways a core request can fail.
///
/// Every crate in this workspace returns `CoreError` at its boundary so that
/// a single taxonomy propagates unmodified from validator to storage.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A document failed schema validation (C1). Carries the complete,
    /// deterministically sorted set of violations.
    #[error("{kind} failed schema validation ({} violation(s))", .violations.len())]
    SchemaValidation { kind: String, violations: Vec<Violation> },

    /// A document passed its schema but violates a structural invariant the
    /// schema cannot express.
    #[error("contract violation: {message}")]
    ContractViolation { code: String, message: String },

    /// Org or global limits forbid the action.
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// A lifecycle invariant or uniqueness constraint prevents the action.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The identified resource does not exist.
    #[error("{resource_type} not found: {resource_id}")]
    NotFound { resource_type: String, resource_id: String },

    /// Unexpected or programmer error. Never constructed from recoverable
    /// conditions; reserved for bugs and I/O failures the core cannot
    /// attribute to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn schema_validation(kind: impl Into<String>, mut violations: Vec<Violation>) -> Self {
        violations.sort();
        Self::SchemaValidation { kind: kind.into(), violations }
    }

    pub fn contract_violation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContractViolation { code: code.into(), message: message.into() }
    }

    pub fn policy(message: impl Into<String>) -> Self {
        Self::PolicyViolation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::NotFound { resource_type: resource_type.into(), resource_id: resource_id.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The closed taxonomy kind name, stable across serialization boundaries.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            Self::ContractViolation { .. } => ErrorKind::ContractViolation,
            Self::PolicyViolation(_) => ErrorKind::PolicyViolation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Tag-only variant of [`CoreError`] for transport mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaValidation,
    ContractViolation,
    PolicyViolation,
    Conflict,
    NotFound,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SchemaValidation => "schema_validation",
            Self::ContractViolation => "contract_violation",
            Self::PolicyViolation => "policy_violation",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
