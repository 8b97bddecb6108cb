// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON Pointer (RFC 6901) helpers over untyped documents.
//!
//! Design notes call for a two-layer document model: a parsed, untyped tree
//! (`serde_json::Value`) that is validated and stored byte-for-byte, plus
//! typed views that project fields out of it without owning or reshaping the
//! tree. These helpers are how the views read the tree.

use crate::error::CoreError;
use serde_json::Value;

/// Walk a dotted field path (`["spec", "status", "state"]`) through a
/// document. Fails closed: a missing key or a non-object intermediate node
/// is a contract violation, never `None`.
pub fn deep_get<'a>(doc: &'a Value, path: &[&str]) -> Result<&'a Value, CoreError> {
    let mut cur = doc;
    for (i, key) in path.iter().enumerate() {
        cur = cur.get(key).ok_or_else(|| {
            CoreError::contract_violation(
                "MISSING_FIELD",
                format!("missing field at {}", escape_pointer(&path[..=i])),
            )
        })?;
    }
    Ok(cur)
}

/// Like [`deep_get`] but returns `None` instead of erroring when any segment
/// of the path is absent. Use for genuinely optional fields.
pub fn deep_get_opt<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = doc;
    for key in path {
        cur = cur.get(key)?;
    }
    Some(cur)
}

pub fn deep_get_str(doc: &Value, path: &[&str]) -> Result<String, CoreError> {
    let v = deep_get(doc, path)?;
    v.as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| field_type_error(path, "string"))
}

pub fn deep_get_str_opt(doc: &Value, path: &[&str]) -> Option<String> {
    deep_get_opt(doc, path).and_then(|v| v.as_str()).map(|s| s.to_string())
}

pub fn deep_get_i64(doc: &Value, path: &[&str]) -> Result<i64, CoreError> {
    let v = deep_get(doc, path)?;
    v.as_i64().ok_or_else(|| field_type_error(path, "integer"))
}

pub fn deep_get_f64(doc: &Value, path: &[&str]) -> Result<f64, CoreError> {
    let v = deep_get(doc, path)?;
    v.as_f64().ok_or_else(|| field_type_error(path, "number"))
}

pub fn deep_get_array<'a>(doc: &'a Value, path: &[&str]) -> Result<&'a Vec<Value>, CoreError> {
    let v = deep_get(doc, path)?;
    v.as_array().ok_or_else(|| field_type_error(path, "array"))
}

/// Same as [`deep_get_array`] but defaults missing fields to an empty slice,
/// matching the schema's `default: []` intent for optional list fields.
pub fn deep_get_array_or_empty<'a>(doc: &'a Value, path: &[&str]) -> &'a [Value] {
    static EMPTY: Vec<Value> = Vec::new();
    deep_get_opt(doc, path).and_then(|v| v.as_array()).map(|v| v.as_slice()).unwrap_or(&EMPTY)
}

fn field_type_error(path: &[&str], expected: &str) -> CoreError {
    CoreError::contract_violation(
        "INVALID_FIELD_TYPE",
        format!("field at {} must be a {expected}", escape_pointer(path)),
    )
}

fn escape_pointer(path: &[&str]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for p in path {
        out.push('/');
        out.push_str(&p.replace('~', "~0").replace('/', "~1"));
    }
    out
}
