// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML document loading and repo-relative ref resolution.
//!
//! The registry is loaded once from a repo tree at startup and treated as
//! configuration, never as state — state lives in `bp-storage`.

use bp_core::CoreError;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A document loaded from disk, with its source path retained for error
/// messages and duplicate-detection diagnostics.
pub struct LoadedDocument {
    pub path: PathBuf,
    pub data: Value,
}

impl LoadedDocument {
    pub fn kind(&self) -> Option<&str> {
        self.data.get("kind").and_then(Value::as_str)
    }
}

/// Parse a single YAML document into an untyped JSON tree.
pub fn load_yaml_document(path: &Path) -> Result<LoadedDocument, CoreError> {
    let raw = std::fs::read_to_string(path).map_err(|e| CoreError::internal(format!("failed to read {}: {e}", path.display())))?;
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|e| CoreError::internal(format!("failed to parse YAML {}: {e}", path.display())))?;
    let data: Value =
        serde_json::to_value(yaml_value).map_err(|e| CoreError::internal(format!("failed to convert {} to JSON: {e}", path.display())))?;
    if !data.is_object() {
        return Err(CoreError::internal(format!("expected a YAML object at the document root: {}", path.display())));
    }
    Ok(LoadedDocument { path: path.to_path_buf(), data })
}

/// Recursively walk `root` for `.yaml`/`.yml` files. Returns an empty list,
/// not an error, when `root` does not exist — optional directories (skill
/// contracts) are allowed to be absent.
pub fn iter_yaml_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml")))
        .collect()
}

/// Resolve an `agent_roles[*].ref` to an absolute path inside `repo_root`.
///
/// Rejects `file:`/external URIs and absolute paths, and fails closed if the
/// resolved path would escape `repo_root` via `..`.
pub fn resolve_repo_ref(repo_root: &Path, ref_str: &str) -> Result<PathBuf, CoreError> {
    if ref_str.is_empty() {
        return Err(CoreError::policy("agent role ref must be a non-empty string"));
    }
    if is_external_uri_reference(ref_str) {
        return Err(CoreError::policy(format!("external URI refs are not allowed in registry: {ref_str}")));
    }
    if ref_str.to_ascii_lowercase().starts_with("file:") {
        return Err(CoreError::policy(format!("file: URI refs are not allowed in registry (use repo-relative paths): {ref_str}")));
    }
    let candidate = Path::new(ref_str);
    if candidate.is_absolute() {
        return Err(CoreError::policy(format!("absolute refs are not allowed in registry: {ref_str}")));
    }

    let repo_root = dunce_canonicalize(repo_root)?;
    let joined = repo_root.join(candidate);
    let resolved = normalize_lexically(&joined);

    if !resolved.starts_with(&repo_root) {
        return Err(CoreError::policy(format!("ref escapes repo root: {ref_str}")));
    }
    Ok(resolved)
}

fn is_external_uri_reference(ref_str: &str) -> bool {
    match ref_str.split_once(':') {
        Some((scheme, rest)) => {
            // A Windows drive letter ("C:\...") is not a URI scheme.
            !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()) && scheme.len() > 1 && rest.starts_with("//")
        }
        None => false,
    }
}

/// Canonicalize `path`, falling back to the path as-given if it does not yet
/// exist (the repo root always exists by construction, but this keeps the
/// helper total for tests that build paths manually).
fn dunce_canonicalize(path: &Path) -> Result<PathBuf, CoreError> {
    match path.canonicalize() {
        Ok(p) => Ok(p),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Collapse `.` and `..` components without touching the filesystem (the
/// target file may not exist yet relative to a non-canonicalized root).
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
