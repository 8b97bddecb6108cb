// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads a document file (YAML or JSON by extension) into a `serde_json::Value`.

use crate::exit_error::ExitError;
use serde_json::Value;
use std::path::Path;

pub fn read(path: &Path) -> Result<Value, ExitError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ExitError::new(2, format!("reading {}: {e}", path.display())))?;

    let is_json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&raw).map_err(|e| ExitError::new(2, format!("parsing {} as JSON: {e}", path.display())))
    } else {
        serde_yaml::from_str(&raw).map_err(|e| ExitError::new(2, format!("parsing {} as YAML: {e}", path.display())))
    }
}

pub fn print(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}
